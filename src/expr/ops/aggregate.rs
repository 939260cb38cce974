//! Aggregate expression builders.
//!
//! The plain forms mirror SQL's behavior of returning NULL on an empty
//! group only through their `_opt` variants; the plain variants are for
//! contexts where the group is known non-empty (or the dialect folds NULL
//! into a usable zero value downstream).

use crate::expr::{AggFunc, Expr, ExprNode};
use crate::fragment::ParamSlot;
use crate::types::{SqlNumeric, SqlType, SqlValue, TypeCode};

fn agg(func: AggFunc, arg: Option<ExprNode>, distinct: bool) -> ExprNode {
    ExprNode::Aggregate {
        func,
        arg: arg.map(Box::new),
        distinct,
        separator: None,
    }
}

/// `COUNT(1)`.
pub fn count() -> Expr<i64> {
    Expr::from_node(agg(AggFunc::Count, Some(ExprNode::Raw("1")), false))
}

/// `COUNT(x)`.
pub fn count_expr<T: SqlType>(e: &Expr<T>) -> Expr<i64> {
    Expr::from_node(agg(AggFunc::Count, Some(e.node().clone()), false))
}

/// `COUNT(DISTINCT x)`.
pub fn count_distinct<T: SqlType>(e: &Expr<T>) -> Expr<i64> {
    Expr::from_node(agg(AggFunc::Count, Some(e.node().clone()), true))
}

/// `SUM(x)`, assumed non-NULL.
pub fn sum<T: SqlNumeric>(e: &Expr<T>) -> Expr<T> {
    Expr::from_node(agg(AggFunc::Sum, Some(e.node().clone()), false))
}

/// `SUM(x)`, NULL on an empty group.
pub fn sum_opt<T: SqlNumeric>(e: &Expr<T>) -> Expr<Option<T>> {
    Expr::from_node(agg(AggFunc::Sum, Some(e.node().clone()), false))
}

/// `MIN(x)`, assumed non-NULL.
pub fn min<T: SqlType>(e: &Expr<T>) -> Expr<T> {
    Expr::from_node(agg(AggFunc::Min, Some(e.node().clone()), false))
}

/// `MIN(x)`, NULL on an empty group.
pub fn min_opt<T: SqlType>(e: &Expr<T>) -> Expr<Option<T>> {
    Expr::from_node(agg(AggFunc::Min, Some(e.node().clone()), false))
}

/// `MAX(x)`, assumed non-NULL.
pub fn max<T: SqlType>(e: &Expr<T>) -> Expr<T> {
    Expr::from_node(agg(AggFunc::Max, Some(e.node().clone()), false))
}

/// `MAX(x)`, NULL on an empty group.
pub fn max_opt<T: SqlType>(e: &Expr<T>) -> Expr<Option<T>> {
    Expr::from_node(agg(AggFunc::Max, Some(e.node().clone()), false))
}

/// `AVG(x)`, assumed non-NULL.
pub fn avg<T: SqlNumeric>(e: &Expr<T>) -> Expr<T> {
    Expr::from_node(agg(AggFunc::Avg, Some(e.node().clone()), false))
}

/// `AVG(x)`, NULL on an empty group.
pub fn avg_opt<T: SqlNumeric>(e: &Expr<T>) -> Expr<Option<T>> {
    Expr::from_node(agg(AggFunc::Avg, Some(e.node().clone()), false))
}

/// String aggregation with a separator; `STRING_AGG`, `GROUP_CONCAT`, or
/// `LISTAGG` per dialect.
pub fn string_agg(e: &Expr<String>, separator: impl Into<String>) -> Expr<String> {
    Expr::from_node(ExprNode::Aggregate {
        func: AggFunc::StringAgg,
        arg: Some(Box::new(e.node().clone())),
        distinct: false,
        separator: Some(ParamSlot::new(
            SqlValue::Text(separator.into()),
            TypeCode::Varchar,
        )),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::FromId;

    #[test]
    fn test_count_is_count_one() {
        match count().node() {
            ExprNode::Aggregate {
                func: AggFunc::Count,
                arg: Some(arg),
                distinct: false,
                ..
            } => assert!(matches!(arg.as_ref(), ExprNode::Raw("1"))),
            other => panic!("expected COUNT aggregate, got {:?}", other),
        }
    }

    #[test]
    fn test_sum_keeps_arg() {
        let price = Expr::<f64>::column(FromId::fresh(), "price");
        assert!(matches!(
            sum(&price).node(),
            ExprNode::Aggregate {
                func: AggFunc::Sum,
                ..
            }
        ));
    }

    #[test]
    fn test_string_agg_carries_separator() {
        let name = Expr::<String>::column(FromId::fresh(), "name");
        match string_agg(&name, ",").node() {
            ExprNode::Aggregate {
                separator: Some(slot),
                ..
            } => assert_eq!(slot.value, SqlValue::Text(",".to_string())),
            other => panic!("expected separator, got {:?}", other),
        }
    }
}
