use std::path::PathBuf;

use crate::infra::write_seed_data;
use crate::server;
use bto_engine::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "BTO Portal",
    about = "Run the BTO application and officer-registration service",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Write a starter data set of CSV files for local exercising
    Seed(SeedArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the configured data directory holding the CSV files
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct SeedArgs {
    /// Directory to write the starter CSV files into
    #[arg(long, default_value = "data")]
    pub(crate) data_dir: PathBuf,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Seed(args) => write_seed_data(&args.data_dir),
    }
}
