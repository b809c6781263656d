use std::process;

use log::error;

use url_shortener_jobs::{app, errors::AppError};

#[tokio::main]
async fn main() {
    if let Err(err) = app::run().await {
        match &err {
            // Logging is not up yet when these happen
            AppError::Config(e) => eprintln!("Critical configuration error: {}", e),
            AppError::Logger(e) => eprintln!("Critical logger error: {}", e),
            AppError::Database(e) => error!("Critical database error: {}", e),
            AppError::Job(e) => error!("Job failed: {}", e),
        }
        process::exit(err.exit_code());
    }
}
