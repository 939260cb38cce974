//! The consumed driver contract.
//!
//! relq does not ship a database driver. Execution goes through these
//! narrow, synchronous, object-safe traits; any connection that can
//! prepare a statement, bind positional parameters, and step a cursor can
//! back a [`DbClient`](crate::client::DbClient). Indices are 1-based,
//! matching the usual wire conventions.

use thiserror::Error;

use crate::types::{SqlValue, TypeCode};

/// An error reported by the underlying connection, propagated verbatim.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct DriverError {
    pub message: String,
    /// Driver-specific error code (SQLSTATE or similar), when available.
    pub code: Option<String>,
}

impl DriverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: Some(code.into()),
        }
    }
}

pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// A forward-only result cursor.
pub trait Cursor {
    /// Advance to the next row; `false` when exhausted.
    fn next(&mut self) -> DriverResult<bool>;

    /// Read column `index` (1-based) of the current row as `code`.
    fn get(&mut self, index: usize, code: TypeCode) -> DriverResult<SqlValue>;
}

/// A prepared statement with positional parameters.
pub trait Statement {
    /// Bind parameter `index` (1-based).
    fn bind(&mut self, index: usize, code: TypeCode, value: &SqlValue) -> DriverResult<()>;

    fn execute_query(&mut self) -> DriverResult<Box<dyn Cursor + '_>>;

    /// Execute a statement that returns no rows; yields the affected-row
    /// count.
    fn execute_update(&mut self) -> DriverResult<u64>;
}

/// A database connection. Thread confinement and concurrency are the
/// driver's contract; relq adds no locking of its own.
pub trait Connection {
    fn prepare(&mut self, sql: &str) -> DriverResult<Box<dyn Statement + '_>>;

    fn set_auto_commit(&mut self, enabled: bool) -> DriverResult<()>;
    fn commit(&mut self) -> DriverResult<()>;
    fn rollback(&mut self) -> DriverResult<()>;

    fn set_savepoint(&mut self, name: &str) -> DriverResult<()>;
    fn rollback_to_savepoint(&mut self, name: &str) -> DriverResult<()>;
    fn release_savepoint(&mut self, name: &str) -> DriverResult<()>;
}
