//! Error types for database operations

use thiserror::Error;

/// Database error types
#[derive(Error, Debug)]
pub enum DbError {
    /// SQLx database error
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored row no longer satisfies the domain model
    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

/// Result type alias for database operations
pub type Result<T> = std::result::Result<T, DbError>;

impl DbError {
    /// Whether this is a UNIQUE or PRIMARY KEY violation
    pub fn is_unique_violation(&self) -> bool {
        match self {
            DbError::Sqlx(sqlx::Error::Database(e)) => e.is_unique_violation(),
            _ => false,
        }
    }
}

impl From<DbError> for roster_core::Error {
    fn from(e: DbError) -> Self {
        roster_core::Error::Infrastructure(e.to_string())
    }
}

impl From<roster_core::Error> for DbError {
    fn from(e: roster_core::Error) -> Self {
        DbError::Corrupt(e.to_string())
    }
}
