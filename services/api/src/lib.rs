mod cli;
mod infra;
mod records;
mod routes;
mod server;
mod walkthrough;

use job_intake::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
