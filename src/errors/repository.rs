use thiserror::Error;
use sqlx::Error as SqlxError;

#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Database connection or query errors
    #[error("Database error: {0}")]
    Database(SqlxError),

    /// Unique constraint violation
    #[error("Conflict error: {0}")]
    Conflict(String),

    /// Invalid input data, or a value storage should never have produced
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<SqlxError> for RepositoryError {
    fn from(err: SqlxError) -> Self {
        let SqlxError::Database(db_err) = err else {
            return Self::Database(err);
        };

        // SQLSTATE classes 23xxx are integrity violations raised by the table itself
        match db_err.code().as_deref() {
            Some("23505") => Self::Conflict(db_err.message().to_string()),
            Some("23503") | Some("23514") => Self::InvalidData(format!(
                "rejected by table constraint: {}",
                db_err.message()
            )),
            _ => Self::Database(SqlxError::Database(db_err)),
        }
    }
}
