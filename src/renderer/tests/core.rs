//! Core composition-to-SQL tests.

use super::fixtures::*;
use crate::schema::Table;
use crate::types::SqlValue;

#[test]
fn test_select_all_columns() {
    let q = Product::select();
    assert_eq!(
        sql_of(&q),
        "SELECT product0.id AS res__id, product0.kebab_case_name AS res__kebab_case_name, \
         product0.name AS res__name, product0.price AS res__price FROM product product0"
    );
}

#[test]
fn test_select_map_scalar() {
    let q = Product::select().map(|p| p.name.clone());
    assert_eq!(
        sql_of(&q),
        "SELECT product0.name AS res FROM product product0"
    );
}

#[test]
fn test_filter() {
    let q = Product::select()
        .map(|p| p.name.clone())
        .filter(|n| n.eq("Guitar"));
    assert_eq!(
        sql_of(&q),
        "SELECT product0.name AS res FROM product product0 WHERE product0.name = ?"
    );
    assert_eq!(params_of(&q), vec![SqlValue::Text("Guitar".to_string())]);
}

#[test]
fn test_stacked_filters_conjoin() {
    let q = Product::select()
        .filter(|p| p.price.gt(1.0))
        .filter(|p| p.price.lt(100.0))
        .map(|p| p.name.clone());
    assert_eq!(
        sql_of(&q),
        "SELECT product0.name AS res FROM product product0 \
         WHERE product0.price > ? AND product0.price < ?"
    );
    assert_eq!(
        params_of(&q),
        vec![SqlValue::Float(1.0), SqlValue::Float(100.0)]
    );
}

#[test]
fn test_sort_map_take_drop() {
    let q = Product::select()
        .sort_by(|p| p.price.clone())
        .map(|p| p.name.clone())
        .take(2)
        .drop(1);
    assert_eq!(
        sql_of(&q),
        "SELECT product0.name AS res FROM product product0 \
         ORDER BY product0.price LIMIT 1 OFFSET 1"
    );
}

#[test]
fn test_last_sort_is_primary() {
    let q = Purchase::select()
        .sort_by(|p| p.product_id.clone())
        .asc()
        .sort_by(|p| p.shipping_info_id.clone())
        .desc()
        .map(|p| p.id.clone());
    assert_eq!(
        sql_of(&q),
        "SELECT purchase0.id AS res FROM purchase purchase0 \
         ORDER BY purchase0.shipping_info_id DESC, purchase0.product_id ASC"
    );
}

#[test]
fn test_take_take_is_min() {
    let q = Product::select().map(|p| p.name.clone()).take(5).take(3);
    assert!(sql_of(&q).ends_with("LIMIT 3"));
    let q = Product::select().map(|p| p.name.clone()).take(3).take(5);
    assert!(sql_of(&q).ends_with("LIMIT 3"));
}

#[test]
fn test_drop_drop_sums() {
    let q = Product::select().map(|p| p.name.clone()).drop(2).drop(3);
    assert!(sql_of(&q).ends_with("OFFSET 5"));
}

#[test]
fn test_drop_then_take() {
    let q = Product::select().map(|p| p.name.clone()).drop(2).take(3);
    assert!(sql_of(&q).ends_with("LIMIT 3 OFFSET 2"));
}

#[test]
fn test_distinct() {
    let q = Product::select().map(|p| p.name.clone()).distinct();
    assert_eq!(
        sql_of(&q),
        "SELECT DISTINCT product0.name AS res FROM product product0"
    );
}

#[test]
fn test_filter_after_sort_wraps_subquery() {
    let q = Product::select()
        .sort_by(|p| p.price.clone())
        .take(2)
        .filter(|p| p.name.eq("Socks"));
    assert_eq!(
        sql_of(&q),
        "SELECT subquery0.res__id AS res__id, \
         subquery0.res__kebab_case_name AS res__kebab_case_name, \
         subquery0.res__name AS res__name, subquery0.res__price AS res__price \
         FROM (SELECT product1.id AS res__id, \
         product1.kebab_case_name AS res__kebab_case_name, \
         product1.name AS res__name, product1.price AS res__price \
         FROM product product1 ORDER BY res__price LIMIT 2) subquery0 \
         WHERE subquery0.res__name = ?"
    );
}

#[test]
fn test_group_by_having() {
    let q = Purchase::select()
        .group_by(
            |p| p.product_id.clone(),
            |key, p| (key.clone(), crate::expr::ops::sum(&p.total)),
        )
        .filter(|(_, total)| total.gt(100.0));
    assert_eq!(
        sql_of(&q),
        "SELECT purchase0.product_id AS res__0, SUM(purchase0.total) AS res__1 \
         FROM purchase purchase0 GROUP BY purchase0.product_id \
         HAVING SUM(purchase0.total) > ?"
    );
}

#[test]
fn test_filter_before_group_is_where() {
    let q = Purchase::select()
        .filter(|p| p.count.gt(1i32))
        .group_by(
            |p| p.product_id.clone(),
            |key, _| key.clone(),
        );
    let sql = sql_of(&q);
    assert!(sql.contains("WHERE purchase0.count > ?"));
    assert!(sql.contains("GROUP BY purchase0.product_id"));
    assert!(!sql.contains("HAVING"));
}

#[test]
fn test_except_keeps_both_projections() {
    let q = Product::select()
        .map(|p| p.name.to_lowercase())
        .except(Product::select().map(|p| p.kebab_case_name.to_lowercase()));
    assert_eq!(
        sql_of(&q),
        "SELECT LOWER(product0.name) AS res FROM product product0 \
         EXCEPT SELECT LOWER(product1.kebab_case_name) AS res FROM product product1"
    );
}

#[test]
fn test_union_chain() {
    let q = Product::select()
        .map(|p| p.name.clone())
        .union(Product::select().map(|p| p.kebab_case_name.clone()))
        .union_all(Product::select().map(|p| p.name.clone()));
    assert_eq!(
        sql_of(&q),
        "SELECT product0.name AS res FROM product product0 \
         UNION SELECT product1.kebab_case_name AS res FROM product product1 \
         UNION ALL SELECT product2.name AS res FROM product product2"
    );
}

#[test]
fn test_compound_order_by_uses_result_alias() {
    let q = Product::select()
        .map(|p| p.name.clone())
        .union(Product::select().map(|p| p.kebab_case_name.clone()))
        .sort_by(|n| n.clone());
    assert!(sql_of(&q).ends_with("ORDER BY res"));
}

#[test]
fn test_left_join_shape() {
    let q = Buyer::select().left_join(ShippingInfo::select(), |b, s| {
        b.id.eq(s.buyer_id.clone())
    });
    assert_eq!(
        sql_of(&q),
        "SELECT buyer0.id AS res__0__id, buyer0.name AS res__0__name, \
         buyer0.date_of_birth AS res__0__date_of_birth, \
         shipping_info1.id AS res__1__id, shipping_info1.buyer_id AS res__1__buyer_id, \
         shipping_info1.shipping_date AS res__1__shipping_date \
         FROM buyer buyer0 LEFT JOIN shipping_info shipping_info1 \
         ON buyer0.id = shipping_info1.buyer_id"
    );
}

#[test]
fn test_flat_map_is_comma_join() {
    let q = Buyer::select().flat_map(|b| {
        let buyer_id = b.id.clone();
        ShippingInfo::select()
            .filter(move |s| s.buyer_id.eq(buyer_id.clone()))
            .map(|s| s.id.clone())
    });
    assert_eq!(
        sql_of(&q),
        "SELECT shipping_info1.id AS res FROM buyer buyer0, shipping_info shipping_info1 \
         WHERE shipping_info1.buyer_id = buyer0.id"
    );
}

#[test]
fn test_contains_renders_in_subquery() {
    let q = Buyer::select()
        .filter(|b| Product::select().map(|p| p.id.clone()).contains(b.id.clone()))
        .map(|b| b.id.clone());
    assert_eq!(
        sql_of(&q),
        "SELECT buyer0.id AS res FROM buyer buyer0 \
         WHERE buyer0.id IN (SELECT product1.id AS res FROM product product1)"
    );
}

#[test]
fn test_exists() {
    let q = Buyer::select()
        .filter(|_| ShippingInfo::select().exists())
        .map(|b| b.id.clone());
    assert_eq!(
        sql_of(&q),
        "SELECT buyer0.id AS res FROM buyer buyer0 WHERE EXISTS \
         (SELECT shipping_info1.id AS res__id, shipping_info1.buyer_id AS res__buyer_id, \
         shipping_info1.shipping_date AS res__shipping_date \
         FROM shipping_info shipping_info1)"
    );
}

#[test]
fn test_values_table() {
    let q = crate::query::select::values_of([1i64, 2, 3]).filter(|n| n.gt(1i64));
    assert_eq!(
        sql_of(&q),
        "SELECT subquery0.column1 AS res FROM (VALUES (?), (?), (?)) subquery0 (column1) \
         WHERE subquery0.column1 > ?"
    );
    assert_eq!(
        params_of(&q),
        vec![
            SqlValue::Int(1),
            SqlValue::Int(2),
            SqlValue::Int(3),
            SqlValue::Int(1)
        ]
    );
}

#[test]
fn test_union_all_aggregate_elides_unused_columns() {
    let q = Product::select()
        .map(|p| (p.name.clone(), p.price.clone()))
        .union_all(Product::select().map(|p| (p.name.clone(), p.price.clone())))
        .aggregate(|row| crate::expr::ops::sum(&row.1));
    assert_eq!(
        sql_of(&q),
        "SELECT SUM(subquery0.res__1) AS res FROM \
         (SELECT product0.price AS res__1 FROM product product0 \
         UNION ALL SELECT product1.price AS res__1 FROM product product1) subquery0"
    );
}

#[test]
fn test_except_aggregate_keeps_all_columns() {
    let q = Product::select()
        .map(|p| (p.name.clone(), p.price.clone()))
        .except(Product::select().map(|p| (p.name.clone(), p.price.clone())))
        .aggregate(|row| crate::expr::ops::sum(&row.1));
    assert_eq!(
        sql_of(&q),
        "SELECT SUM(subquery0.res__1) AS res FROM \
         (SELECT product0.name AS res__0, product0.price AS res__1 FROM product product0 \
         EXCEPT SELECT product1.name AS res__0, product1.price AS res__1 \
         FROM product product1) subquery0"
    );
}

#[test]
fn test_count_over_union_elides_to_constant() {
    let q = Product::select()
        .map(|p| p.name.clone())
        .union_all(Product::select().map(|p| p.name.clone()))
        .count();
    assert_eq!(
        sql_of(&q),
        "SELECT COUNT(1) AS res FROM \
         (SELECT 1 AS res FROM product product0 \
         UNION ALL SELECT 1 AS res FROM product product1) subquery0"
    );
}

#[test]
fn test_rendering_is_deterministic() {
    let build = || {
        Product::select()
            .filter(|p| p.price.gt(1.0))
            .sort_by(|p| p.name.clone())
            .map(|p| (p.name.clone(), p.price.clone()))
            .take(10)
    };
    let q = build();
    let first = rendered(&q);
    let second = rendered(&q);
    assert_eq!(first.sql, second.sql);
    assert_eq!(first.params, second.params);
}

#[test]
fn test_placeholder_count_matches_params() {
    let q = Product::select()
        .filter(|p| p.price.between(1.0, 100.0))
        .filter(|p| p.name.in_values(["a", "b", "c"]))
        .map(|p| (p.name.clone(), p.price.clone() * 2.0));
    let r = rendered(&q);
    assert_eq!(r.sql.matches('?').count(), r.params.len());
    assert_eq!(r.params.len(), 6);
}
