mod cli;
mod infra;
mod jobs;
mod routes;
mod server;

use fare_watch::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
