//! Shared tables and helpers for the renderer tests.

#![allow(dead_code)]

use crate::error::Result;
use crate::renderer::{Dialect, RenderedSql, ToSql};
use crate::table;
use crate::types::SqlValue;

table! {
    /// Products available for sale.
    pub struct Product in "product" {
        id: i64 [primary_key, auto_increment],
        kebab_case_name: String,
        name: String,
        price: f64,
    }
}

table! {
    pub struct Buyer in "buyer" {
        id: i64 [primary_key, auto_increment],
        name: String,
        date_of_birth: chrono::NaiveDate,
    }
}

table! {
    pub struct ShippingInfo in "shipping_info" {
        id: i64 [primary_key],
        buyer_id: i64,
        shipping_date: chrono::NaiveDate,
    }
}

table! {
    pub struct Purchase in "purchase" {
        id: i64 [primary_key],
        shipping_info_id: i64,
        product_id: i64,
        count: i32,
        total: f64,
    }
}

table! {
    pub struct OptCols in "opt_cols" {
        my_int: Option<i32>,
        my_str: Option<String>,
    }
}

/// Render on H2, whose generated SQL is the closest to the ANSI defaults.
pub fn rendered(query: &impl ToSql) -> RenderedSql {
    query.to_sql(Dialect::H2).expect("query should render")
}

pub fn sql_of(query: &impl ToSql) -> String {
    rendered(query).sql
}

pub fn params_of(query: &impl ToSql) -> Vec<SqlValue> {
    rendered(query)
        .params
        .into_iter()
        .map(|slot| slot.value)
        .collect()
}

pub fn render_on(query: &impl ToSql, dialect: Dialect) -> Result<RenderedSql> {
    query.to_sql(dialect)
}

pub fn sql_on(query: &impl ToSql, dialect: Dialect) -> String {
    query.to_sql(dialect).expect("query should render").sql
}
