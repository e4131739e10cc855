mod cli;
mod infra;
mod routes;
mod server;

use bto_engine::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
