//! Unified error type for data layer operations

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataError {
    /// PostgreSQL database error
    #[error("PostgreSQL error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed
    #[error("Migration {version} ({name}) failed: {error}")]
    MigrationFailed {
        version: i32,
        name: String,
        error: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Conflict error (e.g., referential inconsistency, duplicate entry)
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl DataError {
    /// Check if this is a connection-related error that might be transient
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Database(e) => matches!(
                e,
                sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
            ),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_failed_error_display() {
        let err = DataError::MigrationFailed {
            version: 2,
            name: "add_span_links".to_string(),
            error: "syntax error".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Migration 2 (add_span_links) failed: syntax error"
        );
    }

    #[test]
    fn test_conflict_error_display() {
        let err = DataError::Conflict("duplicate ingest token".to_string());
        assert_eq!(err.to_string(), "Conflict: duplicate ingest token");
    }

    #[test]
    fn test_is_transient() {
        assert!(DataError::Database(sqlx::Error::PoolTimedOut).is_transient());
        assert!(!DataError::Config("bad url".into()).is_transient());
        assert!(!DataError::Conflict("dup".into()).is_transient());
    }
}
