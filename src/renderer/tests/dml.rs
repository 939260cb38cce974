//! INSERT / UPDATE / DELETE rendering tests.

use chrono::NaiveDate;

use super::fixtures::*;
use crate::expr::Expr;
use crate::renderer::Dialect;
use crate::schema::Table;
use crate::types::SqlValue;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

#[test]
fn test_insert_values() {
    let q = Buyer::insert().values(|c| {
        vec![c.name.set("A"), c.date_of_birth.set(date(2001, 4, 7))]
    });
    let r = rendered(&q);
    assert_eq!(r.sql, "INSERT INTO buyer (name, date_of_birth) VALUES (?, ?)");
    assert_eq!(r.params.len(), 2);
    assert_eq!(r.params[0].value, SqlValue::Text("A".to_string()));
}

#[test]
fn test_insert_multiple_values_calls_accumulate_rows() {
    let q = Buyer::insert()
        .values(|c| vec![c.name.set("A"), c.date_of_birth.set(date(2001, 4, 7))])
        .values(|c| vec![c.name.set("B"), c.date_of_birth.set(date(2002, 5, 8))]);
    let r = rendered(&q);
    assert_eq!(
        r.sql,
        "INSERT INTO buyer (name, date_of_birth) VALUES (?, ?), (?, ?)"
    );
    assert_eq!(r.params.len(), 4);
}

#[test]
fn test_insert_batched_single_statement() {
    let q = Buyer::insert().batched(
        |c| (c.name, c.date_of_birth),
        [
            ("A".to_string(), date(2001, 4, 7)),
            ("B".to_string(), date(2002, 5, 8)),
            ("C".to_string(), date(2003, 6, 9)),
        ],
    );
    let r = rendered(&q);
    assert_eq!(
        r.sql,
        "INSERT INTO buyer (name, date_of_birth) VALUES (?, ?), (?, ?), (?, ?)"
    );
    assert_eq!(r.params.len(), 6);
}

#[test]
fn test_insert_mismatched_rows_fail_to_render() {
    let q = Buyer::insert()
        .values(|c| vec![c.name.set("A"), c.date_of_birth.set(date(2001, 4, 7))])
        .values(|c| vec![c.name.set("B")]);
    assert!(render_on(&q, Dialect::H2).is_err());
}

#[test]
fn test_insert_from_select() {
    let q = Product::insert().from_select(
        |c| (c.kebab_case_name, c.name, c.price),
        Product::select().map(|p| {
            (
                p.kebab_case_name.clone(),
                p.name.clone(),
                p.price.clone() * 2.0,
            )
        }),
    );
    assert_eq!(
        sql_of(&q),
        "INSERT INTO product (kebab_case_name, name, price) \
         SELECT product0.kebab_case_name AS res__0, product0.name AS res__1, \
         (product0.price * ?) AS res__2 FROM product product0"
    );
}

#[test]
fn test_insert_returning_postgres() {
    let q = Buyer::insert()
        .values(|c| vec![c.name.set("A"), c.date_of_birth.set(date(2001, 4, 7))])
        .returning(|b| b.id.clone());
    assert_eq!(
        sql_on(&q, Dialect::Postgres),
        "INSERT INTO buyer (name, date_of_birth) VALUES ($1, $2) RETURNING id AS res"
    );
}

#[test]
fn test_returning_rejected_without_support() {
    let q = Buyer::insert()
        .values(|c| vec![c.name.set("A"), c.date_of_birth.set(date(2001, 4, 7))])
        .returning(|b| b.id.clone());
    assert!(render_on(&q, Dialect::H2).is_err());
    assert!(render_on(&q, Dialect::Mysql).is_err());
}

#[test]
fn test_on_conflict_ignore_postgres() {
    let q = Buyer::insert()
        .values(|c| vec![c.name.set("A"), c.date_of_birth.set(date(2001, 4, 7))])
        .on_conflict_ignore(|c| vec![c.id.name()]);
    assert_eq!(
        sql_on(&q, Dialect::Postgres),
        "INSERT INTO buyer (name, date_of_birth) VALUES ($1, $2) \
         ON CONFLICT (id) DO NOTHING"
    );
}

#[test]
fn test_on_conflict_update_postgres() {
    let q = Buyer::insert()
        .values(|c| vec![c.name.set("A"), c.date_of_birth.set(date(2001, 4, 7))])
        .on_conflict_update(|c| vec![c.id.name()], |c| vec![c.name.set("A2")]);
    assert_eq!(
        sql_on(&q, Dialect::Postgres),
        "INSERT INTO buyer (name, date_of_birth) VALUES ($1, $2) \
         ON CONFLICT (id) DO UPDATE SET name = $3"
    );
}

#[test]
fn test_on_duplicate_key_mysql() {
    let q = Buyer::insert()
        .values(|c| vec![c.name.set("A"), c.date_of_birth.set(date(2001, 4, 7))])
        .on_conflict_update(|c| vec![c.id.name()], |c| vec![c.name.set("A2")]);
    assert_eq!(
        sql_on(&q, Dialect::Mysql),
        "INSERT INTO `buyer` (`name`, `date_of_birth`) VALUES (?, ?) \
         ON DUPLICATE KEY UPDATE `name` = ?"
    );
}

#[test]
fn test_on_conflict_rejected_without_support() {
    let q = Buyer::insert()
        .values(|c| vec![c.name.set("A"), c.date_of_birth.set(date(2001, 4, 7))])
        .on_conflict_ignore(|c| vec![c.id.name()]);
    assert!(render_on(&q, Dialect::H2).is_err());
}

#[test]
fn test_update_with_computed_assignment() {
    let q = Product::update(|p| p.name.eq("Guitar"))
        .set(|c, p| vec![c.price.set(p.price.clone() * 2.0)]);
    let r = rendered(&q);
    assert_eq!(
        r.sql,
        "UPDATE product SET price = (price * ?) WHERE name = ?"
    );
    assert_eq!(
        r.params.iter().map(|p| p.value.clone()).collect::<Vec<_>>(),
        vec![SqlValue::Float(2.0), SqlValue::Text("Guitar".to_string())]
    );
}

#[test]
fn test_update_without_assignments_fails() {
    let q = Product::update(|p| p.id.gt(0i64));
    assert!(render_on(&q, Dialect::H2).is_err());
}

#[test]
fn test_update_constant_true_predicate_binds_parameter() {
    let q = Product::update(|_| Expr::literal(true))
        .set(|c, _| vec![c.price.set(1.0)]);
    let r = rendered(&q);
    assert_eq!(r.sql, "UPDATE product SET price = ? WHERE ?");
    assert_eq!(r.params[1].value, SqlValue::Bool(true));
}

#[test]
fn test_update_join_from_clause() {
    let q = ShippingInfo::update(|s| s.id.gt(0i64)).join(Buyer::select(), |s, b| {
        let c = ShippingInfo::cols();
        (
            s.buyer_id.eq(b.id.clone()),
            vec![c.shipping_date.set(b.date_of_birth.clone())],
        )
    });
    assert_eq!(
        sql_of(&q),
        "UPDATE shipping_info SET shipping_date = buyer0.date_of_birth \
         FROM buyer buyer0 WHERE shipping_info.id > ? \
         AND shipping_info.buyer_id = buyer0.id"
    );
}

#[test]
fn test_update_join_mysql_qualifies_set() {
    let q = ShippingInfo::update(|s| s.id.gt(0i64)).join(Buyer::select(), |s, b| {
        let c = ShippingInfo::cols();
        (
            s.buyer_id.eq(b.id.clone()),
            vec![c.shipping_date.set(b.date_of_birth.clone())],
        )
    });
    assert_eq!(
        sql_on(&q, Dialect::Mysql),
        "UPDATE `shipping_info` JOIN `buyer` buyer0 \
         ON `shipping_info`.`buyer_id` = buyer0.`id` \
         SET `shipping_info`.`shipping_date` = buyer0.`date_of_birth` \
         WHERE `shipping_info`.`id` > ?"
    );
}

#[test]
fn test_delete() {
    let q = Product::delete(|p| p.name.eq("Socks"));
    let r = rendered(&q);
    assert_eq!(r.sql, "DELETE FROM product WHERE name = ?");
    assert_eq!(r.params[0].value, SqlValue::Text("Socks".to_string()));
}

#[test]
fn test_delete_constant_true_predicate() {
    let q = Product::delete(|_| Expr::literal(true));
    let r = rendered(&q);
    assert_eq!(r.sql, "DELETE FROM product WHERE ?");
    assert_eq!(r.params[0].value, SqlValue::Bool(true));
}

#[test]
fn test_delete_returning_sqlite() {
    let q = Product::delete(|p| p.id.eq(1i64)).returning(|p| p.name.clone());
    assert_eq!(
        sql_on(&q, Dialect::Sqlite),
        "DELETE FROM product WHERE id = ? RETURNING name AS res"
    );
}

#[test]
fn test_update_returning_postgres() {
    let q = Product::update(|p| p.id.eq(1i64))
        .set(|c, _| vec![c.price.set(9.99)])
        .returning(|p| (p.name.clone(), p.price.clone()));
    assert_eq!(
        sql_on(&q, Dialect::Postgres),
        "UPDATE product SET price = $1 WHERE id = $2 \
         RETURNING name AS res__0, price AS res__1"
    );
}
