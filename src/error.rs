//! Error types for relq.

use thiserror::Error;

use crate::driver::DriverError;

#[derive(Debug, Error)]
pub enum RelqError {
    /// Malformed query IR discovered while rendering. No partial SQL is
    /// produced when this is returned.
    #[error("Render error: {0}")]
    Render(String),

    /// A value could not be bound under its declared type mapper.
    #[error("Bind error at parameter {index}: {message}")]
    Bind { index: usize, message: String },

    /// An error reported by the underlying connection, with the failed
    /// statement attached.
    #[error("Driver error while executing `{sql}` ({params} parameters): {source}")]
    Driver {
        #[source]
        source: DriverError,
        sql: String,
        params: usize,
    },

    /// The result set did not match the projection shape.
    #[error("Decode error at column `{path}`: {message}")]
    Decode { path: String, message: String },

    /// An error escaped a transaction block and the rollback itself failed.
    #[error("Transaction error: {source}; rollback also failed: {rollback}")]
    Transaction {
        #[source]
        source: Box<RelqError>,
        rollback: DriverError,
    },
}

impl RelqError {
    /// Create a render error.
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render(message.into())
    }

    /// Create a decode error for the given column path.
    pub fn decode(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for relq operations.
pub type Result<T> = std::result::Result<T, RelqError>;
