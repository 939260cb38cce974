//! relq: a typed relational query builder and SQL renderer.
//!
//! Queries are composed as collection-pipeline-like values over table row
//! shapes generated by [`table!`]; composition normalizes the query IR,
//! the renderer turns it into dialect-specific parameterized SQL, and the
//! execution layer runs it over a narrow synchronous driver contract and
//! decodes rows back into the projection's result shape.
//!
//! ```ignore
//! use relq::prelude::*;
//!
//! table! {
//!     pub struct Product in "product" {
//!         id: i64 [primary_key, auto_increment],
//!         name: String,
//!         price: f64,
//!     }
//! }
//!
//! let query = Product::select()
//!     .sort_by(|p| p.price.clone())
//!     .map(|p| p.name.clone())
//!     .take(2);
//! let rendered = query.to_sql(Dialect::Sqlite)?;
//! ```

pub mod client;
pub mod driver;
pub mod error;
pub mod expr;
pub mod fragment;
pub mod query;
pub mod queryable;
pub mod renderer;
pub mod schema;
pub mod types;

// Re-exported for the `table!` macro expansion.
pub use paste;

pub mod prelude {
    pub use crate::client::{Config, DbClient, Transaction};
    pub use crate::error::{RelqError, Result};
    pub use crate::expr::ops::{
        avg, avg_opt, case_when, coalesce, count, count_distinct, count_expr, max, max_opt, min,
        min_opt, null_if, string_agg, sum, sum_opt,
    };
    pub use crate::expr::Expr;
    pub use crate::query::select::{values_of, Select};
    pub use crate::queryable::{Nullable, Queryable};
    pub use crate::renderer::{Dialect, ToSql};
    pub use crate::schema::{NameMapper, Table};
    pub use crate::table;
}
