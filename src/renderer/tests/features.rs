//! Expression surface tests.

use super::fixtures::*;
use crate::expr::ops::{case_when, coalesce, count_distinct, null_if};
use crate::schema::Table;
use crate::types::SqlValue;

#[test]
fn test_arithmetic_precedence_parens() {
    let q = Product::select().map(|p| p.price.clone() * 2.0 + 1.0);
    assert_eq!(
        sql_of(&q),
        "SELECT ((product0.price * ?) + ?) AS res FROM product product0"
    );
}

#[test]
fn test_negation() {
    let q = Product::select().map(|p| -p.price.clone());
    assert_eq!(sql_of(&q), "SELECT -product0.price AS res FROM product product0");
}

#[test]
fn test_boolean_connectives() {
    let q = Product::select()
        .filter(|p| p.price.gt(1.0).and(p.name.ne("Socks")).or(p.id.eq(1i64)))
        .map(|p| p.id.clone());
    assert_eq!(
        sql_of(&q),
        "SELECT product0.id AS res FROM product product0 \
         WHERE ((product0.price > ? AND product0.name <> ?) OR product0.id = ?)"
    );
}

#[test]
fn test_not() {
    let q = Product::select()
        .filter(|p| p.name.eq("Socks").not())
        .map(|p| p.id.clone());
    assert!(sql_of(&q).contains("WHERE NOT (product0.name = ?)"));
}

#[test]
fn test_between() {
    let q = Product::select()
        .filter(|p| p.price.between(1.0, 100.0))
        .map(|p| p.id.clone());
    assert!(sql_of(&q).contains("WHERE product0.price BETWEEN ? AND ?"));
}

#[test]
fn test_in_values() {
    let q = Product::select()
        .filter(|p| p.name.in_values(["a", "b"]))
        .map(|p| p.id.clone());
    let r = rendered(&q);
    assert!(r.sql.contains("WHERE product0.name IN (?, ?)"));
    assert_eq!(r.params.len(), 2);
}

#[test]
fn test_empty_in_list_is_constant_false() {
    let q = Product::select()
        .filter(|p| p.name.in_values(Vec::<String>::new()))
        .map(|p| p.id.clone());
    let r = rendered(&q);
    assert!(r.sql.contains("WHERE FALSE"));
    assert!(r.params.is_empty());
}

#[test]
fn test_like_family_wraps_parameter() {
    let q = Product::select()
        .filter(|p| p.name.contains_str("gui"))
        .map(|p| p.id.clone());
    let r = rendered(&q);
    assert!(r.sql.contains("WHERE product0.name LIKE ?"));
    assert_eq!(r.params[0].value, SqlValue::Text("%gui%".to_string()));

    let q = Product::select()
        .filter(|p| p.name.starts_with("Gui"))
        .map(|p| p.id.clone());
    assert_eq!(params_of(&q)[0], SqlValue::Text("Gui%".to_string()));

    let q = Product::select()
        .filter(|p| p.name.ends_with("tar"))
        .map(|p| p.id.clone());
    assert_eq!(params_of(&q)[0], SqlValue::Text("%tar".to_string()));
}

#[test]
fn test_string_functions() {
    let q = Product::select().map(|p| p.name.to_uppercase());
    assert!(sql_of(&q).contains("UPPER(product0.name)"));

    let q = Product::select().map(|p| p.name.length());
    assert!(sql_of(&q).contains("CHAR_LENGTH(product0.name)"));

    let q = Product::select().map(|p| p.name.trim());
    assert!(sql_of(&q).contains("TRIM(product0.name)"));

    let q = Product::select().map(|p| p.name.substring(1i32, 3i32));
    assert!(sql_of(&q).contains("SUBSTRING(product0.name, ?, ?)"));

    let q = Product::select().map(|p| p.name.lpad(8i32, "0"));
    assert!(sql_of(&q).contains("LPAD(product0.name, ?, ?)"));

    let q = Product::select().map(|p| p.name.reverse());
    assert!(sql_of(&q).contains("REVERSE(product0.name)"));
}

#[test]
fn test_case_when_chain() {
    let q = Product::select().map(|p| {
        case_when::<String>(p.price.gt(100.0), "expensive")
            .when(p.price.gt(10.0), "medium")
            .otherwise("cheap")
    });
    assert_eq!(
        sql_of(&q),
        "SELECT CASE WHEN product0.price > ? THEN ? \
         WHEN product0.price > ? THEN ? ELSE ? END AS res FROM product product0"
    );
}

#[test]
fn test_open_case_has_no_else() {
    let q = Product::select().map(|p| case_when(p.price.gt(100.0), p.name.clone()).end());
    assert_eq!(
        sql_of(&q),
        "SELECT CASE WHEN product0.price > ? THEN product0.name END AS res \
         FROM product product0"
    );
}

#[test]
fn test_optional_operations() {
    let q = OptCols::select().map(|o| o.my_int.is_defined());
    assert!(sql_of(&q).contains("opt_cols0.my_int IS NOT NULL"));

    let q = OptCols::select().map(|o| o.my_int.is_empty());
    assert!(sql_of(&q).contains("opt_cols0.my_int IS NULL"));

    let q = OptCols::select().map(|o| o.my_int.get_or_else(0i32));
    assert!(sql_of(&q).contains("COALESCE(opt_cols0.my_int, ?)"));

    let q = OptCols::select().map(|o| o.my_int.map(|n| n + 1i32));
    assert!(sql_of(&q).contains("(opt_cols0.my_int + ?)"));

    let q = OptCols::select().map(|o| o.my_int.filter(|n| n.gt(0i32)));
    assert!(sql_of(&q)
        .contains("CASE WHEN opt_cols0.my_int > ? THEN opt_cols0.my_int END"));
}

#[test]
fn test_null_safe_equality_parameters() {
    let q = OptCols::select().filter(|o| o.my_int.eq_nullsafe(None));
    let r = rendered(&q);
    assert!(r.sql.contains(
        "WHERE (opt_cols0.my_int IS NULL AND ? IS NULL) OR opt_cols0.my_int = ?"
    ));
    assert_eq!(
        r.params.iter().map(|p| p.value.clone()).collect::<Vec<_>>(),
        vec![SqlValue::Null, SqlValue::Null]
    );

    let q = OptCols::select().filter(|o| o.my_int.eq_nullsafe(Some(7i32)));
    let values: Vec<SqlValue> = params_of(&q);
    assert_eq!(values, vec![SqlValue::Int(7), SqlValue::Int(7)]);
}

#[test]
fn test_coalesce_and_nullif() {
    let q = OptCols::select().map(|o| coalesce([o.my_str.clone(), "fallback".into()]));
    assert!(sql_of(&q).contains("COALESCE(opt_cols0.my_str, ?)"));

    let q = Product::select().map(|p| null_if(p.name.clone(), "unknown"));
    assert!(sql_of(&q).contains("NULLIF(product0.name, ?)"));
}

#[test]
fn test_count_distinct() {
    let q = Purchase::select().aggregate(|p| count_distinct(&p.product_id));
    assert_eq!(
        sql_of(&q),
        "SELECT COUNT(DISTINCT purchase0.product_id) AS res FROM purchase purchase0"
    );
}

#[test]
fn test_aggregate_tuple_projection() {
    let q = Purchase::select().aggregate(|p| {
        (
            crate::expr::ops::min(&p.total),
            crate::expr::ops::max(&p.total),
            crate::expr::ops::avg(&p.total),
        )
    });
    assert_eq!(
        sql_of(&q),
        "SELECT MIN(purchase0.total) AS res__0, MAX(purchase0.total) AS res__1, \
         AVG(purchase0.total) AS res__2 FROM purchase purchase0"
    );
}

#[test]
fn test_sum_over_single_column_select() {
    let q = Purchase::select().map(|p| p.total.clone()).sum();
    assert_eq!(
        sql_of(&q),
        "SELECT SUM(purchase0.total) AS res FROM purchase purchase0"
    );
}

#[test]
fn test_scalar_subquery_expression() {
    let max_price = Product::select().map(|p| p.price.clone()).max().as_expr();
    let q = Product::select()
        .filter(move |p| p.price.eq(max_price.clone()))
        .map(|p| p.name.clone());
    assert_eq!(
        sql_of(&q),
        "SELECT product0.name AS res FROM product product0 WHERE product0.price = \
         (SELECT MAX(product1.price) AS res FROM product product1)"
    );
}

#[test]
fn test_bitwise_chain() {
    let q = Purchase::select().map(|p| (p.count.clone() & 4i32) | 1i32);
    assert_eq!(
        sql_of(&q),
        "SELECT BITOR(BITAND(purchase0.count, ?), ?) AS res FROM purchase purchase0"
    );
}
