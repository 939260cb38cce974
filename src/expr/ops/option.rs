//! Operations on optional expressions.
//!
//! SQL's null propagation does most of the work: `map` and `flat_map`
//! rebuild the expression over the unwrapped node and retype the result.

use crate::expr::{Expr, ExprNode, UnaryOp};
use crate::types::SqlType;

impl<T: SqlType> Expr<Option<T>> {
    /// `x IS NOT NULL`.
    pub fn is_defined(&self) -> Expr<bool> {
        Expr::from_node(ExprNode::Unary {
            op: UnaryOp::IsNotNull,
            expr: Box::new(self.node().clone()),
        })
    }

    /// `x IS NULL`.
    pub fn is_empty(&self) -> Expr<bool> {
        Expr::from_node(ExprNode::Unary {
            op: UnaryOp::IsNull,
            expr: Box::new(self.node().clone()),
        })
    }

    /// Apply an operation to the wrapped value; NULL stays NULL.
    pub fn map<U: SqlType>(&self, f: impl FnOnce(Expr<T>) -> Expr<U>) -> Expr<Option<U>> {
        f(self.clone().retype()).retype()
    }

    /// Apply an optional-producing operation to the wrapped value.
    pub fn flat_map<U: SqlType>(
        &self,
        f: impl FnOnce(Expr<T>) -> Expr<Option<U>>,
    ) -> Expr<Option<U>> {
        f(self.clone().retype())
    }

    /// `COALESCE(x, default)`.
    pub fn get_or_else(&self, default: impl Into<Expr<T>>) -> Expr<T> {
        Expr::from_node(ExprNode::Call {
            name: "COALESCE",
            args: vec![self.node().clone(), default.into().into_node()],
        })
    }

    /// `COALESCE(x, other)` staying optional.
    pub fn or_else(&self, other: impl Into<Expr<Option<T>>>) -> Expr<Option<T>> {
        Expr::from_node(ExprNode::Call {
            name: "COALESCE",
            args: vec![self.node().clone(), other.into().into_node()],
        })
    }

    /// Keep the value only where the predicate holds:
    /// `CASE WHEN pred THEN x ELSE NULL END`.
    pub fn filter(&self, pred: impl FnOnce(Expr<T>) -> Expr<bool>) -> Expr<Option<T>> {
        let cond = pred(self.clone().retype());
        Expr::from_node(ExprNode::Case {
            branches: vec![(cond.into_node(), self.node().clone())],
            otherwise: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::FromId;

    #[test]
    fn test_is_defined() {
        let col = Expr::<Option<i32>>::column(FromId::fresh(), "my_int");
        assert!(matches!(
            col.is_defined().node(),
            ExprNode::Unary {
                op: UnaryOp::IsNotNull,
                ..
            }
        ));
    }

    #[test]
    fn test_map_keeps_node_shape() {
        let col = Expr::<Option<i64>>::column(FromId::fresh(), "my_int");
        let mapped = col.map(|n| n + 1i64);
        // Null propagation: the node is a plain addition over the column.
        assert!(matches!(
            mapped.node(),
            ExprNode::Binary {
                op: crate::expr::BinaryOp::Add,
                ..
            }
        ));
    }

    #[test]
    fn test_filter_is_case() {
        let col = Expr::<Option<i64>>::column(FromId::fresh(), "my_int");
        let filtered = col.filter(|n| n.gt(0i64));
        match filtered.node() {
            ExprNode::Case {
                branches,
                otherwise,
            } => {
                assert_eq!(branches.len(), 1);
                assert!(otherwise.is_none());
            }
            other => panic!("expected Case, got {:?}", other),
        }
    }
}
