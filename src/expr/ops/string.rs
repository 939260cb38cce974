//! String expressions: concatenation, pattern matching, and the SQL string
//! function surface.

use crate::expr::{Expr, ExprNode};
use crate::fragment::ParamSlot;
use crate::types::{SqlValue, TypeCode};

fn text_param(value: String) -> ExprNode {
    ExprNode::Literal(ParamSlot::new(SqlValue::Text(value), TypeCode::Varchar))
}

impl Expr<String> {
    /// String concatenation; `||` or `CONCAT(…)` per dialect.
    pub fn concat(&self, other: impl Into<Expr<String>>) -> Expr<String> {
        Expr::from_node(ExprNode::Concat {
            lhs: Box::new(self.node().clone()),
            rhs: Box::new(other.into().into_node()),
        })
    }

    /// `LIKE` with a caller-controlled pattern.
    pub fn like(&self, pattern: impl Into<Expr<String>>) -> Expr<bool> {
        Expr::from_node(ExprNode::Like {
            expr: Box::new(self.node().clone()),
            pattern: Box::new(pattern.into().into_node()),
            case_insensitive: false,
        })
    }

    /// Case-insensitive `LIKE`; `ILIKE` where available, otherwise
    /// `LOWER(a) LIKE LOWER(b)`.
    pub fn ilike(&self, pattern: impl Into<Expr<String>>) -> Expr<bool> {
        Expr::from_node(ExprNode::Like {
            expr: Box::new(self.node().clone()),
            pattern: Box::new(pattern.into().into_node()),
            case_insensitive: true,
        })
    }

    /// Prefix match. The bound parameter itself carries the trailing `%`.
    pub fn starts_with(&self, prefix: impl Into<String>) -> Expr<bool> {
        self.like(Expr::from_node(text_param(format!("{}%", prefix.into()))))
    }

    /// Suffix match. The bound parameter itself carries the leading `%`.
    pub fn ends_with(&self, suffix: impl Into<String>) -> Expr<bool> {
        self.like(Expr::from_node(text_param(format!("%{}", suffix.into()))))
    }

    /// Substring match. The bound parameter is wrapped in `%` on both sides.
    pub fn contains_str(&self, needle: impl Into<String>) -> Expr<bool> {
        self.like(Expr::from_node(text_param(format!("%{}%", needle.into()))))
    }

    /// Character length.
    pub fn length(&self) -> Expr<i32> {
        Expr::from_node(ExprNode::Call {
            name: "CHAR_LENGTH",
            args: vec![self.node().clone()],
        })
    }

    /// Length in bytes.
    pub fn octet_length(&self) -> Expr<i32> {
        Expr::from_node(ExprNode::Call {
            name: "OCTET_LENGTH",
            args: vec![self.node().clone()],
        })
    }

    /// 1-based position of `needle`, 0 when absent; `POSITION(… IN …)` or
    /// `INSTR` per dialect.
    pub fn index_of(&self, needle: impl Into<Expr<String>>) -> Expr<i32> {
        Expr::from_node(ExprNode::StrPos {
            needle: Box::new(needle.into().into_node()),
            haystack: Box::new(self.node().clone()),
        })
    }

    pub fn to_lowercase(&self) -> Expr<String> {
        Expr::from_node(ExprNode::Call {
            name: "LOWER",
            args: vec![self.node().clone()],
        })
    }

    pub fn to_uppercase(&self) -> Expr<String> {
        Expr::from_node(ExprNode::Call {
            name: "UPPER",
            args: vec![self.node().clone()],
        })
    }

    pub fn trim(&self) -> Expr<String> {
        Expr::from_node(ExprNode::Call {
            name: "TRIM",
            args: vec![self.node().clone()],
        })
    }

    pub fn ltrim(&self) -> Expr<String> {
        Expr::from_node(ExprNode::Call {
            name: "LTRIM",
            args: vec![self.node().clone()],
        })
    }

    pub fn rtrim(&self) -> Expr<String> {
        Expr::from_node(ExprNode::Call {
            name: "RTRIM",
            args: vec![self.node().clone()],
        })
    }

    /// Two-argument trim, removing any of `chars` from both ends.
    pub fn trim_chars(&self, chars: impl Into<Expr<String>>) -> Expr<String> {
        Expr::from_node(ExprNode::Call {
            name: "TRIM",
            args: vec![self.node().clone(), chars.into().into_node()],
        })
    }

    pub fn ltrim_chars(&self, chars: impl Into<Expr<String>>) -> Expr<String> {
        Expr::from_node(ExprNode::Call {
            name: "LTRIM",
            args: vec![self.node().clone(), chars.into().into_node()],
        })
    }

    pub fn rtrim_chars(&self, chars: impl Into<Expr<String>>) -> Expr<String> {
        Expr::from_node(ExprNode::Call {
            name: "RTRIM",
            args: vec![self.node().clone(), chars.into().into_node()],
        })
    }

    /// `SUBSTRING(x, start, length)` with a 1-based start.
    pub fn substring(
        &self,
        start: impl Into<Expr<i32>>,
        length: impl Into<Expr<i32>>,
    ) -> Expr<String> {
        Expr::from_node(ExprNode::Call {
            name: "SUBSTRING",
            args: vec![
                self.node().clone(),
                start.into().into_node(),
                length.into().into_node(),
            ],
        })
    }

    pub fn lpad(&self, length: impl Into<Expr<i32>>, pad: impl Into<Expr<String>>) -> Expr<String> {
        Expr::from_node(ExprNode::Call {
            name: "LPAD",
            args: vec![
                self.node().clone(),
                length.into().into_node(),
                pad.into().into_node(),
            ],
        })
    }

    pub fn rpad(&self, length: impl Into<Expr<i32>>, pad: impl Into<Expr<String>>) -> Expr<String> {
        Expr::from_node(ExprNode::Call {
            name: "RPAD",
            args: vec![
                self.node().clone(),
                length.into().into_node(),
                pad.into().into_node(),
            ],
        })
    }

    pub fn reverse(&self) -> Expr<String> {
        Expr::from_node(ExprNode::Call {
            name: "REVERSE",
            args: vec![self.node().clone()],
        })
    }
}

impl<R: Into<Expr<String>>> std::ops::Add<R> for Expr<String> {
    type Output = Expr<String>;

    fn add(self, rhs: R) -> Expr<String> {
        Expr::from_node(ExprNode::Concat {
            lhs: Box::new(self.into_node()),
            rhs: Box::new(rhs.into().into_node()),
        })
    }
}
