//! Boolean connectives. SQL three-valued semantics apply throughout.

use crate::expr::{BinaryOp, Expr, ExprNode, UnaryOp};

impl Expr<bool> {
    pub fn and(&self, other: impl Into<Expr<bool>>) -> Expr<bool> {
        Expr::from_node(ExprNode::Binary {
            op: BinaryOp::And,
            lhs: Box::new(self.node().clone()),
            rhs: Box::new(other.into().into_node()),
        })
    }

    pub fn or(&self, other: impl Into<Expr<bool>>) -> Expr<bool> {
        Expr::from_node(ExprNode::Binary {
            op: BinaryOp::Or,
            lhs: Box::new(self.node().clone()),
            rhs: Box::new(other.into().into_node()),
        })
    }

    pub fn not(&self) -> Expr<bool> {
        Expr::from_node(ExprNode::Unary {
            op: UnaryOp::Not,
            expr: Box::new(self.node().clone()),
        })
    }
}

impl std::ops::Not for Expr<bool> {
    type Output = Expr<bool>;

    fn not(self) -> Expr<bool> {
        Expr::from_node(ExprNode::Unary {
            op: UnaryOp::Not,
            expr: Box::new(self.into_node()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::FromId;

    #[test]
    fn test_and_or_not() {
        let a = Expr::<bool>::column(FromId::fresh(), "a");
        let b = Expr::<bool>::column(FromId::fresh(), "b");
        let e = a.and(b.clone()).or(!b);
        assert!(matches!(
            e.node(),
            ExprNode::Binary {
                op: BinaryOp::Or,
                ..
            }
        ));
    }
}
