//! Operations over typed expressions.
//!
//! Each category mirrors the scalar surface the renderer understands:
//!
//! - `cmp` - comparisons, null-safe equality, IN, BETWEEN, CAST
//! - `boolean` - AND / OR / NOT
//! - `numeric` - arithmetic, bitwise, numeric functions
//! - `string` - concatenation, LIKE family, string functions
//! - `option` - IS NULL family, COALESCE, null-propagating map/filter
//! - `aggregate` - SUM / MIN / MAX / AVG / COUNT / string aggregation
//! - `case_when` - CASE WHEN builder

pub mod aggregate;
pub mod boolean;
pub mod case_when;
pub mod cmp;
pub mod numeric;
pub mod option;
pub mod string;

pub use aggregate::{avg, avg_opt, count, count_distinct, count_expr, max, max_opt, min, min_opt,
    string_agg, sum, sum_opt};
pub use case_when::{case_when, CaseBuilder};
pub use cmp::coalesce;
pub use cmp::null_if;
