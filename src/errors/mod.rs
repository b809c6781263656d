use thiserror::Error;

pub mod config;
pub mod job;
pub mod repository;

pub use config::ConfigError;
pub use job::{BulkInsertPhase, JobError};
pub use repository::RepositoryError;

use crate::db::DatabaseError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Logger error: {0}")]
    Logger(String),
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("Job error: {0}")]
    Job(#[from] JobError),
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Job(JobError::Repository(err))
    }
}

impl AppError {
    /// Process exit code reported for this failure
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Job(_) => 1,
            AppError::Config(_) => 2,
            AppError::Logger(_) => 3,
            AppError::Database(_) => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(AppError::Config("bad".into()).exit_code(), 2);
        assert_eq!(AppError::Logger("bad".into()).exit_code(), 3);
        assert_eq!(AppError::from(JobError::InvalidBatchSize).exit_code(), 1);
        assert_eq!(
            AppError::from(RepositoryError::InvalidData("negative id".into())).exit_code(),
            1
        );
    }

    #[test]
    fn test_config_error_message_is_kept() {
        let err = AppError::from(ConfigError::ParseError("Could not parse JOB_END_ID".into()));
        assert_eq!(
            err.to_string(),
            "Configuration error: Parse error: Could not parse JOB_END_ID"
        );
    }

    #[test]
    fn test_batch_failure_message() {
        let err = JobError::BatchFailed {
            batch: 2,
            total_batches: 3,
            committed_batches: 1,
            source: RepositoryError::InvalidData("boom".into()),
        };
        assert_eq!(
            err.to_string(),
            "Batch 2/3 failed after 1 committed batches: Invalid data: boom"
        );
    }
}
