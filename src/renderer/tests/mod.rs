//! Renderer test suite: exact-SQL assertions over the composition algebra,
//! dialect divergences, the expression surface, and DML statements.

mod fixtures;

mod core;
mod dml;
mod features;
