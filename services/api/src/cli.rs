use crate::jobs::{run_airport_search, run_price_check, AirportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use fare_watch::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "fare-watch",
    about = "Flight price alerts: HTTP API, scheduled price checks, and airport lookup",
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
    /// Re-price every stored alert once and email users whose fare changed
    CheckPrices,
    /// Look up Brazilian airports matching a city keyword
    Airports(AirportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::CheckPrices => run_price_check().await,
        Command::Airports(args) => run_airport_search(args).await,
    }
}
