//! Arithmetic, bitwise operations, and numeric functions.
//!
//! The `std::ops` overloads are implemented per concrete scalar type so the
//! boolean and string impls stay coherent with them.

use crate::expr::{BinaryOp, BitOp, Expr, ExprNode, UnaryOp};
use crate::types::{SqlIntegral, SqlNumeric};

impl<T: SqlNumeric> Expr<T> {
    pub fn abs(&self) -> Expr<T> {
        Expr::from_node(ExprNode::Call {
            name: "ABS",
            args: vec![self.node().clone()],
        })
    }

    pub fn ceil(&self) -> Expr<T> {
        Expr::from_node(ExprNode::Call {
            name: "CEIL",
            args: vec![self.node().clone()],
        })
    }

    pub fn floor(&self) -> Expr<T> {
        Expr::from_node(ExprNode::Call {
            name: "FLOOR",
            args: vec![self.node().clone()],
        })
    }
}

impl<T: SqlIntegral> Expr<T> {
    /// Integer modulo; spelled `%` or `MOD(a, b)` per dialect.
    pub fn modulo(&self, other: impl Into<Expr<T>>) -> Expr<T> {
        Expr::from_node(ExprNode::Modulo {
            lhs: Box::new(self.node().clone()),
            rhs: Box::new(other.into().into_node()),
        })
    }

    pub fn bit_and(&self, other: impl Into<Expr<T>>) -> Expr<T> {
        Expr::from_node(ExprNode::Bit {
            op: BitOp::And,
            lhs: Box::new(self.node().clone()),
            rhs: Box::new(other.into().into_node()),
        })
    }

    pub fn bit_or(&self, other: impl Into<Expr<T>>) -> Expr<T> {
        Expr::from_node(ExprNode::Bit {
            op: BitOp::Or,
            lhs: Box::new(self.node().clone()),
            rhs: Box::new(other.into().into_node()),
        })
    }

    pub fn bit_xor(&self, other: impl Into<Expr<T>>) -> Expr<T> {
        Expr::from_node(ExprNode::Bit {
            op: BitOp::Xor,
            lhs: Box::new(self.node().clone()),
            rhs: Box::new(other.into().into_node()),
        })
    }

    pub fn bit_not(&self) -> Expr<T> {
        Expr::from_node(ExprNode::BitNot {
            expr: Box::new(self.node().clone()),
        })
    }
}

macro_rules! impl_arith_ops {
    ($t:ty) => {
        impl<R: Into<Expr<$t>>> std::ops::Add<R> for Expr<$t> {
            type Output = Expr<$t>;
            fn add(self, rhs: R) -> Expr<$t> {
                Expr::from_node(ExprNode::Binary {
                    op: BinaryOp::Add,
                    lhs: Box::new(self.into_node()),
                    rhs: Box::new(rhs.into().into_node()),
                })
            }
        }

        impl<R: Into<Expr<$t>>> std::ops::Sub<R> for Expr<$t> {
            type Output = Expr<$t>;
            fn sub(self, rhs: R) -> Expr<$t> {
                Expr::from_node(ExprNode::Binary {
                    op: BinaryOp::Sub,
                    lhs: Box::new(self.into_node()),
                    rhs: Box::new(rhs.into().into_node()),
                })
            }
        }

        impl<R: Into<Expr<$t>>> std::ops::Mul<R> for Expr<$t> {
            type Output = Expr<$t>;
            fn mul(self, rhs: R) -> Expr<$t> {
                Expr::from_node(ExprNode::Binary {
                    op: BinaryOp::Mul,
                    lhs: Box::new(self.into_node()),
                    rhs: Box::new(rhs.into().into_node()),
                })
            }
        }

        impl<R: Into<Expr<$t>>> std::ops::Div<R> for Expr<$t> {
            type Output = Expr<$t>;
            fn div(self, rhs: R) -> Expr<$t> {
                Expr::from_node(ExprNode::Binary {
                    op: BinaryOp::Div,
                    lhs: Box::new(self.into_node()),
                    rhs: Box::new(rhs.into().into_node()),
                })
            }
        }

        impl std::ops::Neg for Expr<$t> {
            type Output = Expr<$t>;
            fn neg(self) -> Expr<$t> {
                Expr::from_node(ExprNode::Unary {
                    op: UnaryOp::Neg,
                    expr: Box::new(self.into_node()),
                })
            }
        }
    };
}

macro_rules! impl_bit_ops {
    ($t:ty) => {
        impl<R: Into<Expr<$t>>> std::ops::Rem<R> for Expr<$t> {
            type Output = Expr<$t>;
            fn rem(self, rhs: R) -> Expr<$t> {
                Expr::from_node(ExprNode::Modulo {
                    lhs: Box::new(self.into_node()),
                    rhs: Box::new(rhs.into().into_node()),
                })
            }
        }

        impl<R: Into<Expr<$t>>> std::ops::BitAnd<R> for Expr<$t> {
            type Output = Expr<$t>;
            fn bitand(self, rhs: R) -> Expr<$t> {
                Expr::from_node(ExprNode::Bit {
                    op: BitOp::And,
                    lhs: Box::new(self.into_node()),
                    rhs: Box::new(rhs.into().into_node()),
                })
            }
        }

        impl<R: Into<Expr<$t>>> std::ops::BitOr<R> for Expr<$t> {
            type Output = Expr<$t>;
            fn bitor(self, rhs: R) -> Expr<$t> {
                Expr::from_node(ExprNode::Bit {
                    op: BitOp::Or,
                    lhs: Box::new(self.into_node()),
                    rhs: Box::new(rhs.into().into_node()),
                })
            }
        }

        impl<R: Into<Expr<$t>>> std::ops::BitXor<R> for Expr<$t> {
            type Output = Expr<$t>;
            fn bitxor(self, rhs: R) -> Expr<$t> {
                Expr::from_node(ExprNode::Bit {
                    op: BitOp::Xor,
                    lhs: Box::new(self.into_node()),
                    rhs: Box::new(rhs.into().into_node()),
                })
            }
        }

        impl std::ops::Not for Expr<$t> {
            type Output = Expr<$t>;
            fn not(self) -> Expr<$t> {
                Expr::from_node(ExprNode::BitNot {
                    expr: Box::new(self.into_node()),
                })
            }
        }
    };
}

impl_arith_ops!(i16);
impl_arith_ops!(i32);
impl_arith_ops!(i64);
impl_arith_ops!(f32);
impl_arith_ops!(f64);

impl_bit_ops!(i16);
impl_bit_ops!(i32);
impl_bit_ops!(i64);
