//! Execution: binding rendered statements to a driver connection, decoding
//! result rows, and scoping transactions and savepoints.

use tracing::{debug, warn};

use crate::driver::Connection;
use crate::error::{RelqError, Result};
use crate::query::delete::{Delete, DeleteReturning};
use crate::query::insert::{Insert, InsertReturning};
use crate::query::select::Select;
use crate::query::update::{Update, UpdateReturning};
use crate::queryable::Queryable;
use crate::renderer::{Dialect, RenderedSql, ToSql};
use crate::schema::{NameMapper, Table};
use crate::types::{SqlValue, TypeCode};

/// Client configuration, injected at construction and threaded through
/// every render.
#[derive(Debug, Clone, Copy, Default)]
pub struct Config {
    pub dialect: Dialect,
    pub table_names: NameMapper,
    pub column_names: NameMapper,
}

impl Config {
    pub fn new(dialect: Dialect) -> Self {
        Config {
            dialect,
            ..Config::default()
        }
    }
}

/// A query that produces rows of a known shape.
pub trait RowQuery {
    type Row;

    fn render(&self, config: &Config) -> Result<RenderedSql>;
    fn column_codes(&self) -> Vec<TypeCode>;
    fn decode_row(&self, row: &[SqlValue]) -> Result<Self::Row>;
}

impl<Q: Queryable> RowQuery for Select<Q> {
    type Row = Q::Output;

    fn render(&self, config: &Config) -> Result<RenderedSql> {
        self.to_sql_in(config.dialect, config.table_names, config.column_names)
    }

    fn column_codes(&self) -> Vec<TypeCode> {
        let mut codes = Vec::new();
        self.projection().type_codes(&mut codes);
        codes
    }

    fn decode_row(&self, row: &[SqlValue]) -> Result<Self::Row> {
        let mut index = 0;
        let mut path = Vec::new();
        self.projection().decode(row, &mut index, &mut path)
    }
}

macro_rules! impl_row_query_returning {
    ($ty:ident) => {
        impl<T: Table, R: Queryable> RowQuery for $ty<T, R> {
            type Row = R::Output;

            fn render(&self, config: &Config) -> Result<RenderedSql> {
                self.to_sql_in(config.dialect, config.table_names, config.column_names)
            }

            fn column_codes(&self) -> Vec<TypeCode> {
                let mut codes = Vec::new();
                self.projection().type_codes(&mut codes);
                codes
            }

            fn decode_row(&self, row: &[SqlValue]) -> Result<Self::Row> {
                let mut index = 0;
                let mut path = Vec::new();
                self.projection().decode(row, &mut index, &mut path)
            }
        }
    };
}

impl_row_query_returning!(InsertReturning);
impl_row_query_returning!(UpdateReturning);
impl_row_query_returning!(DeleteReturning);

/// A statement executed for its affected-row count.
pub trait DmlQuery {
    fn render(&self, config: &Config) -> Result<RenderedSql>;
}

macro_rules! impl_dml_query {
    ($ty:ident) => {
        impl<T: Table> DmlQuery for $ty<T> {
            fn render(&self, config: &Config) -> Result<RenderedSql> {
                self.to_sql_in(config.dialect, config.table_names, config.column_names)
            }
        }
    };
}

impl_dml_query!(Insert);
impl_dml_query!(Update);
impl_dml_query!(Delete);

fn driver_err(source: crate::driver::DriverError, rendered: &RenderedSql) -> RelqError {
    RelqError::Driver {
        source,
        sql: rendered.sql.clone(),
        params: rendered.params.len(),
    }
}

fn scope_err(source: crate::driver::DriverError, op: &str) -> RelqError {
    RelqError::Driver {
        source,
        sql: op.to_string(),
        params: 0,
    }
}

fn run_rows<C: Connection, Q: RowQuery>(
    conn: &mut C,
    config: &Config,
    query: &Q,
) -> Result<Vec<Q::Row>> {
    let rendered = query.render(config)?;
    debug!(sql = %rendered.sql, params = rendered.params.len(), "executing query");
    let codes = query.column_codes();
    let mut raw_rows = Vec::new();
    {
        let mut stmt = conn
            .prepare(&rendered.sql)
            .map_err(|e| driver_err(e, &rendered))?;
        for (i, slot) in rendered.params.iter().enumerate() {
            stmt.bind(i + 1, slot.code, &slot.value)
                .map_err(|e| RelqError::Bind {
                    index: i + 1,
                    message: e.message,
                })?;
        }
        let mut cursor = stmt
            .execute_query()
            .map_err(|e| driver_err(e, &rendered))?;
        while cursor.next().map_err(|e| driver_err(e, &rendered))? {
            let mut row = Vec::with_capacity(codes.len());
            for (i, code) in codes.iter().enumerate() {
                row.push(
                    cursor
                        .get(i + 1, *code)
                        .map_err(|e| driver_err(e, &rendered))?,
                );
            }
            raw_rows.push(row);
        }
    }
    raw_rows.iter().map(|row| query.decode_row(row)).collect()
}

fn run_update<C: Connection, D: DmlQuery>(
    conn: &mut C,
    config: &Config,
    statement: &D,
) -> Result<u64> {
    let rendered = statement.render(config)?;
    debug!(sql = %rendered.sql, params = rendered.params.len(), "executing statement");
    let mut stmt = conn
        .prepare(&rendered.sql)
        .map_err(|e| driver_err(e, &rendered))?;
    for (i, slot) in rendered.params.iter().enumerate() {
        stmt.bind(i + 1, slot.code, &slot.value)
            .map_err(|e| RelqError::Bind {
                index: i + 1,
                message: e.message,
            })?;
    }
    stmt.execute_update().map_err(|e| driver_err(e, &rendered))
}

/// A database client: a driver connection plus the render configuration.
pub struct DbClient<C: Connection> {
    conn: C,
    config: Config,
}

impl<C: Connection> DbClient<C> {
    pub fn new(conn: C, config: Config) -> Self {
        DbClient { conn, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Escape hatch to the underlying connection.
    pub fn connection(&mut self) -> &mut C {
        &mut self.conn
    }

    /// Run a row-producing query and decode every row.
    pub fn fetch_all<Q: RowQuery>(&mut self, query: &Q) -> Result<Vec<Q::Row>> {
        run_rows(&mut self.conn, &self.config, query)
    }

    /// Run a query expected to produce at most one row.
    pub fn fetch_optional<Q: RowQuery>(&mut self, query: &Q) -> Result<Option<Q::Row>> {
        Ok(self.fetch_all(query)?.into_iter().next())
    }

    /// Run a query expected to produce exactly one row.
    pub fn fetch_one<Q: RowQuery>(&mut self, query: &Q) -> Result<Q::Row> {
        self.fetch_optional(query)?
            .ok_or_else(|| RelqError::decode("res", "query returned no rows"))
    }

    /// Execute a mutation and return the affected-row count.
    pub fn execute<D: DmlQuery>(&mut self, statement: &D) -> Result<u64> {
        run_update(&mut self.conn, &self.config, statement)
    }

    /// Run `f` inside a transaction: autocommit off on entry; commit on
    /// normal exit, rollback on error or explicit rollback; autocommit
    /// restored on every path. A failed statement inside the block does
    /// not roll back on its own until the block exits by error.
    pub fn transaction<R>(
        &mut self,
        f: impl FnOnce(&mut Transaction<'_, C>) -> Result<R>,
    ) -> Result<R> {
        self.conn
            .set_auto_commit(false)
            .map_err(|e| scope_err(e, "set_auto_commit(false)"))?;
        let mut txn = Transaction {
            conn: &mut self.conn,
            config: &self.config,
            scopes: vec![Scope {
                savepoint: None,
                rolled_back: false,
            }],
            savepoint_seq: 0,
        };
        let result = f(&mut txn);
        let rolled_back = txn.scopes.first().map(|s| s.rolled_back).unwrap_or(false);

        match result {
            Ok(value) => {
                if !rolled_back {
                    self.conn.commit().map_err(|e| scope_err(e, "commit"))?;
                }
                self.conn
                    .set_auto_commit(true)
                    .map_err(|e| scope_err(e, "set_auto_commit(true)"))?;
                Ok(value)
            }
            Err(err) => {
                warn!(error = %err, "transaction failed, rolling back");
                if !rolled_back {
                    if let Err(rollback) = self.conn.rollback() {
                        let _ = self.conn.set_auto_commit(true);
                        return Err(RelqError::Transaction {
                            source: Box::new(err),
                            rollback,
                        });
                    }
                }
                let _ = self.conn.set_auto_commit(true);
                Err(err)
            }
        }
    }
}

struct Scope {
    savepoint: Option<String>,
    rolled_back: bool,
}

/// A thread-confined transaction handle. Queries run through it execute on
/// the client's connection inside the transaction scope.
pub struct Transaction<'a, C: Connection> {
    conn: &'a mut C,
    config: &'a Config,
    scopes: Vec<Scope>,
    savepoint_seq: u32,
}

impl<'a, C: Connection> Transaction<'a, C> {
    pub fn fetch_all<Q: RowQuery>(&mut self, query: &Q) -> Result<Vec<Q::Row>> {
        run_rows(self.conn, self.config, query)
    }

    pub fn fetch_optional<Q: RowQuery>(&mut self, query: &Q) -> Result<Option<Q::Row>> {
        Ok(self.fetch_all(query)?.into_iter().next())
    }

    pub fn fetch_one<Q: RowQuery>(&mut self, query: &Q) -> Result<Q::Row> {
        self.fetch_optional(query)?
            .ok_or_else(|| RelqError::decode("res", "query returned no rows"))
    }

    pub fn execute<D: DmlQuery>(&mut self, statement: &D) -> Result<u64> {
        run_update(self.conn, self.config, statement)
    }

    /// Roll back the innermost scope: the current savepoint if one is
    /// active, otherwise the whole transaction. The block still runs to
    /// its end; its result value is kept.
    pub fn rollback(&mut self) -> Result<()> {
        let target = match self.scopes.last() {
            Some(scope) => scope.savepoint.clone(),
            None => None,
        };
        match &target {
            Some(name) => self
                .conn
                .rollback_to_savepoint(name)
                .map_err(|e| scope_err(e, "rollback_to_savepoint"))?,
            None => self
                .conn
                .rollback()
                .map_err(|e| scope_err(e, "rollback"))?,
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.rolled_back = true;
        }
        Ok(())
    }

    /// Run `f` inside a nested savepoint scope: released on normal exit,
    /// rolled back to on error or explicit rollback.
    pub fn savepoint<R>(&mut self, f: impl FnOnce(&mut Self) -> Result<R>) -> Result<R> {
        self.savepoint_seq += 1;
        let name = format!("sp{}", self.savepoint_seq);
        self.conn
            .set_savepoint(&name)
            .map_err(|e| scope_err(e, "set_savepoint"))?;
        self.scopes.push(Scope {
            savepoint: Some(name.clone()),
            rolled_back: false,
        });
        let result = f(self);
        let rolled_back = self.scopes.pop().map(|s| s.rolled_back).unwrap_or(false);

        match result {
            Ok(value) => {
                if !rolled_back {
                    self.conn
                        .release_savepoint(&name)
                        .map_err(|e| scope_err(e, "release_savepoint"))?;
                }
                Ok(value)
            }
            Err(err) => {
                if !rolled_back {
                    if let Err(rollback) = self.conn.rollback_to_savepoint(&name) {
                        return Err(RelqError::Transaction {
                            source: Box::new(err),
                            rollback,
                        });
                    }
                }
                Err(err)
            }
        }
    }
}
