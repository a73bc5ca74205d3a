//! Error types for sqlfrag

use thiserror::Error;

/// Result type alias for sqlfrag operations
pub type FragResult<T> = Result<T, FragError>;

/// Error types for query assembly and execution
#[derive(Debug, Error)]
pub enum FragError {
    /// A statement was assembled without its target table
    #[error("Missing table reference: {0}")]
    MissingTableReference(String),

    /// A value could not be coerced to the requested scalar type
    #[error("Could not convert {from} to {to}")]
    Conversion {
        from: &'static str,
        to: &'static str,
    },

    /// The driver reported a deadlock; the statement may be retried
    #[error("Deadlock detected: {0}")]
    Deadlock(String),

    /// Query execution error reported by the driver
    #[error("Execution error: {0}")]
    Execution(String),

    /// The driver did not answer within the configured timeout
    #[error("Query timeout after {0:?}")]
    Timeout(std::time::Duration),

    /// A query hook refused to run the statement
    #[error("Query aborted: {0}")]
    Aborted(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl FragError {
    /// Create a missing table reference error
    pub fn missing_table(message: impl Into<String>) -> Self {
        Self::MissingTableReference(message.into())
    }

    /// Create a conversion error
    pub fn conversion(from: &'static str, to: &'static str) -> Self {
        Self::Conversion { from, to }
    }

    /// Create a deadlock error
    pub fn deadlock(message: impl Into<String>) -> Self {
        Self::Deadlock(message.into())
    }

    /// Create an execution error
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Check if this is a deadlock error
    pub fn is_deadlock(&self) -> bool {
        matches!(self, Self::Deadlock(_))
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Check if this is a missing table reference error
    pub fn is_missing_table(&self) -> bool {
        matches!(self, Self::MissingTableReference(_))
    }

    /// Classify a driver error message.
    ///
    /// MySQL reports deadlocks as error 1213, Postgres as SQLSTATE 40P01;
    /// anything mentioning a deadlock is treated the same.
    pub fn from_driver_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_ascii_lowercase();
        if lower.contains("deadlock") || lower.contains("1213") || lower.contains("40p01") {
            Self::Deadlock(message)
        } else {
            Self::Execution(message)
        }
    }
}
