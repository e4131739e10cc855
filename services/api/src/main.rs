//! Entrypoint for the BTO portal binary: parses the CLI and either serves
//! the HTTP API or writes a starter data set.

use bto_api::run;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("bto-api: {err}");
        std::process::exit(1);
    }
}
