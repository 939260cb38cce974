//! SQL renderer: walks the query IR top-down through a [`RenderContext`]
//! and produces parameterized SQL.

pub mod context;
pub mod dialect;
pub mod dml;
pub mod expr;
pub mod sql;
pub mod traits;

#[cfg(test)]
mod tests;

use crate::error::Result;
use crate::fragment::{Fragment, ParamSlot};
use crate::query::delete::{Delete, DeleteReturning};
use crate::query::insert::{Insert, InsertReturning};
use crate::query::select::Select;
use crate::query::update::{Update, UpdateReturning};
use crate::queryable::Queryable;
use crate::schema::{NameMapper, Table};

pub use context::{LiveColumns, RenderContext};
pub use dialect::Dialect;
pub use traits::{ConflictStyle, SqlDialect, UpdateJoinStyle};

/// Final SQL text plus its positional parameter vector.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedSql {
    pub sql: String,
    pub params: Vec<ParamSlot>,
}

fn finish(fragment: Fragment, ctx: &RenderContext) -> RenderedSql {
    let (sql, params) = fragment.emit(|index| ctx.dialect().placeholder(index));
    RenderedSql { sql, params }
}

/// Render a query to dialect-specific SQL.
pub trait ToSql {
    /// Render with explicit name mappers.
    fn to_sql_in(
        &self,
        dialect: Dialect,
        table_names: NameMapper,
        column_names: NameMapper,
    ) -> Result<RenderedSql>;

    /// Render with identity name mappers.
    fn to_sql(&self, dialect: Dialect) -> Result<RenderedSql> {
        self.to_sql_in(dialect, NameMapper::Identity, NameMapper::Identity)
    }
}

impl<Q: Queryable> ToSql for Select<Q> {
    fn to_sql_in(
        &self,
        dialect: Dialect,
        table_names: NameMapper,
        column_names: NameMapper,
    ) -> Result<RenderedSql> {
        let ir = self.erase();
        let mut ctx = RenderContext::new(dialect, table_names, column_names);
        let fragment = dml::select::render_select(&ir, &mut ctx, &LiveColumns::All, false)?;
        Ok(finish(fragment, &ctx))
    }
}

macro_rules! impl_to_sql_dml {
    ($ty:ident, $render:path) => {
        impl<T: Table> ToSql for $ty<T> {
            fn to_sql_in(
                &self,
                dialect: Dialect,
                table_names: NameMapper,
                column_names: NameMapper,
            ) -> Result<RenderedSql> {
                let ir = self.erase();
                let mut ctx = RenderContext::new(dialect, table_names, column_names);
                let fragment = $render(&ir, &mut ctx)?;
                Ok(finish(fragment, &ctx))
            }
        }
    };
}

macro_rules! impl_to_sql_returning {
    ($ty:ident, $render:path) => {
        impl<T: Table, R: Queryable> ToSql for $ty<T, R> {
            fn to_sql_in(
                &self,
                dialect: Dialect,
                table_names: NameMapper,
                column_names: NameMapper,
            ) -> Result<RenderedSql> {
                let ir = self.erase();
                let mut ctx = RenderContext::new(dialect, table_names, column_names);
                let fragment = $render(&ir, &mut ctx)?;
                Ok(finish(fragment, &ctx))
            }
        }
    };
}

impl_to_sql_dml!(Insert, dml::insert::render_insert);
impl_to_sql_dml!(Update, dml::update::render_update);
impl_to_sql_dml!(Delete, dml::delete::render_delete);
impl_to_sql_returning!(InsertReturning, dml::insert::render_insert);
impl_to_sql_returning!(UpdateReturning, dml::update::render_update);
impl_to_sql_returning!(DeleteReturning, dml::delete::render_delete);
