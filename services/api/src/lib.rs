mod cli;
mod demo;
mod infra;
mod listen;
mod routes;
mod server;

use hris::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
