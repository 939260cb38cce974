//! One generator per supported dialect, overriding the ANSI defaults of
//! [`SqlDialect`](crate::renderer::traits::SqlDialect) only where the
//! database diverges.

pub mod h2;
pub mod hsqldb;
pub mod mysql;
pub mod postgres;
pub mod sqlite;
