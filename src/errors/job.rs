use std::fmt;

use thiserror::Error;

use super::RepositoryError;

/// Phase of a bulk insert in which a failure happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkInsertPhase {
    Begin,
    Insert,
    ShortCodes,
    Commit,
}

impl fmt::Display for BulkInsertPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BulkInsertPhase::Begin => "begin",
            BulkInsertPhase::Insert => "insert",
            BulkInsertPhase::ShortCodes => "short code update",
            BulkInsertPhase::Commit => "commit",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum JobError {
    #[error("Batch size must be greater than zero")]
    InvalidBatchSize,

    /// Each insert page binds one parameter per row
    #[error("Page size must be between 1 and {max}, got {size}")]
    InvalidPageSize { size: usize, max: usize },

    #[error("Invalid id range: {0}")]
    InvalidRange(String),

    /// The whole bulk insert was rolled back; no rows were durably inserted
    #[error("Bulk insert aborted during {phase} phase: {source}")]
    BulkInsertAborted {
        phase: BulkInsertPhase,
        #[source]
        source: RepositoryError,
    },

    /// A range batch failed; the `committed_batches` before it stay applied
    #[error("Batch {batch}/{total_batches} failed after {committed_batches} committed batches: {source}")]
    BatchFailed {
        batch: u64,
        total_batches: u64,
        committed_batches: u64,
        #[source]
        source: RepositoryError,
    },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
