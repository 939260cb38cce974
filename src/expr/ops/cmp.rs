//! Comparisons, null-safe equality, membership, and casts.

use crate::expr::{BinaryOp, Expr, ExprNode};
use crate::types::SqlType;

fn binary(op: BinaryOp, lhs: ExprNode, rhs: ExprNode) -> ExprNode {
    ExprNode::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

impl<T: SqlType> Expr<T> {
    /// SQL `=`. Three-valued: comparing against NULL yields NULL.
    pub fn eq(&self, other: impl Into<Expr<T>>) -> Expr<bool> {
        Expr::from_node(binary(
            BinaryOp::Eq,
            self.node().clone(),
            other.into().into_node(),
        ))
    }

    /// SQL `<>`.
    pub fn ne(&self, other: impl Into<Expr<T>>) -> Expr<bool> {
        Expr::from_node(binary(
            BinaryOp::Ne,
            self.node().clone(),
            other.into().into_node(),
        ))
    }

    pub fn lt(&self, other: impl Into<Expr<T>>) -> Expr<bool> {
        Expr::from_node(binary(
            BinaryOp::Lt,
            self.node().clone(),
            other.into().into_node(),
        ))
    }

    pub fn le(&self, other: impl Into<Expr<T>>) -> Expr<bool> {
        Expr::from_node(binary(
            BinaryOp::Le,
            self.node().clone(),
            other.into().into_node(),
        ))
    }

    pub fn gt(&self, other: impl Into<Expr<T>>) -> Expr<bool> {
        Expr::from_node(binary(
            BinaryOp::Gt,
            self.node().clone(),
            other.into().into_node(),
        ))
    }

    pub fn ge(&self, other: impl Into<Expr<T>>) -> Expr<bool> {
        Expr::from_node(binary(
            BinaryOp::Ge,
            self.node().clone(),
            other.into().into_node(),
        ))
    }

    /// Null-safe equality: NULL compares equal to NULL and unequal to any
    /// value. Rendered as `(a IS NULL AND b IS NULL) OR a = b`, or `<=>`
    /// where the dialect has it.
    pub fn eq_nullsafe(&self, other: impl Into<Expr<T>>) -> Expr<bool> {
        Expr::from_node(ExprNode::NullSafeEq {
            lhs: Box::new(self.node().clone()),
            rhs: Box::new(other.into().into_node()),
            negated: false,
        })
    }

    /// Negated null-safe equality.
    pub fn ne_nullsafe(&self, other: impl Into<Expr<T>>) -> Expr<bool> {
        Expr::from_node(ExprNode::NullSafeEq {
            lhs: Box::new(self.node().clone()),
            rhs: Box::new(other.into().into_node()),
            negated: true,
        })
    }

    /// `x IN (…)` over an explicit value list. An empty list renders as the
    /// dialect's constant false.
    pub fn in_values<I>(&self, items: I) -> Expr<bool>
    where
        I: IntoIterator,
        I::Item: Into<Expr<T>>,
    {
        Expr::from_node(ExprNode::InValues {
            expr: Box::new(self.node().clone()),
            list: items.into_iter().map(|i| i.into().into_node()).collect(),
            negated: false,
        })
    }

    /// `x NOT IN (…)` over an explicit value list.
    pub fn not_in_values<I>(&self, items: I) -> Expr<bool>
    where
        I: IntoIterator,
        I::Item: Into<Expr<T>>,
    {
        Expr::from_node(ExprNode::InValues {
            expr: Box::new(self.node().clone()),
            list: items.into_iter().map(|i| i.into().into_node()).collect(),
            negated: true,
        })
    }

    /// `x BETWEEN lo AND hi`.
    pub fn between(&self, lo: impl Into<Expr<T>>, hi: impl Into<Expr<T>>) -> Expr<bool> {
        Expr::from_node(ExprNode::Between {
            expr: Box::new(self.node().clone()),
            lo: Box::new(lo.into().into_node()),
            hi: Box::new(hi.into().into_node()),
        })
    }

    /// `CAST(x AS …)` using the target type's cast keyword, possibly
    /// overridden by the dialect.
    pub fn cast<U: SqlType>(&self) -> Expr<U> {
        Expr::from_node(ExprNode::Cast {
            expr: Box::new(self.node().clone()),
            code: U::TYPE_CODE,
        })
    }

    /// Lift into the optional type without changing the rendered SQL.
    pub fn into_opt(self) -> Expr<Option<T>> {
        self.retype()
    }
}

/// `COALESCE(a, b, …)` over same-typed expressions.
pub fn coalesce<T: SqlType>(items: impl IntoIterator<Item = Expr<T>>) -> Expr<T> {
    Expr::from_node(ExprNode::Call {
        name: "COALESCE",
        args: items.into_iter().map(Expr::into_node).collect(),
    })
}

/// `NULLIF(a, b)`.
pub fn null_if<T: SqlType>(a: impl Into<Expr<T>>, b: impl Into<Expr<T>>) -> Expr<Option<T>> {
    Expr::from_node(ExprNode::Call {
        name: "NULLIF",
        args: vec![a.into().into_node(), b.into().into_node()],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::FromId;

    #[test]
    fn test_eq_builds_binary() {
        let col = Expr::<i64>::column(FromId::fresh(), "id");
        let pred = col.eq(5i64);
        assert!(matches!(
            pred.node(),
            ExprNode::Binary {
                op: BinaryOp::Eq,
                ..
            }
        ));
    }

    #[test]
    fn test_nullsafe_against_none() {
        let col = Expr::<Option<i32>>::column(FromId::fresh(), "my_int");
        let pred = col.eq_nullsafe(None);
        assert!(matches!(
            pred.node(),
            ExprNode::NullSafeEq { negated: false, .. }
        ));
    }

    #[test]
    fn test_in_values_collects() {
        let col = Expr::<String>::column(FromId::fresh(), "name");
        let pred = col.in_values(["a", "b"]);
        match pred.node() {
            ExprNode::InValues { list, negated, .. } => {
                assert_eq!(list.len(), 2);
                assert!(!negated);
            }
            other => panic!("expected InValues, got {:?}", other),
        }
    }
}
