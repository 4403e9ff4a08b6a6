//! Database-specific error types and conversions.

use guess_core::error::GuessError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Malformed record: {0}")]
    Decode(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Unique constraint violated on {entity}")]
    Duplicate { entity: String },

    /// Another transaction committed a write to the same keys first.
    #[error("Write conflict: {0}")]
    Conflict(String),
}

fn is_write_conflict(message: &str) -> bool {
    message.contains("Transaction conflict") || message.contains("can be retried")
}

impl DbError {
    /// Classify a statement error returned by `Response::check`.
    ///
    /// Unique index violations become [`DbError::Duplicate`] and retryable
    /// write conflicts become [`DbError::Conflict`]; anything else is a
    /// generic query failure.
    pub(crate) fn from_statement(err: surrealdb::Error, entity: &str) -> Self {
        let message = err.to_string();
        if message.contains("already contains") {
            DbError::Duplicate {
                entity: entity.to_string(),
            }
        } else if is_write_conflict(&message) {
            DbError::Conflict(message)
        } else {
            DbError::Query(message)
        }
    }

    /// Classify an error returned while sending a query.
    pub(crate) fn from_query(err: surrealdb::Error) -> Self {
        let message = err.to_string();
        if is_write_conflict(&message) {
            DbError::Conflict(message)
        } else {
            DbError::Surreal(err)
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, DbError::Conflict(_))
    }
}

impl From<DbError> for GuessError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => GuessError::NotFound { entity, id },
            DbError::Duplicate { entity } => GuessError::AlreadyExists { entity },
            other => GuessError::Database(other.to_string()),
        }
    }
}
