pub mod config;
pub mod dashboard;
pub mod datasets;
pub mod error;
pub mod query;
pub mod telemetry;

mod cli;
mod infra;
mod routes;
mod server;

use error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
