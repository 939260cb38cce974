//! Typed scalar expressions over a data IR.
//!
//! [`Expr<T>`] is a phantom-typed handle around an [`ExprNode`] tree. The
//! node tree is plain data so the renderer can walk it, rewrite it, and
//! compare it structurally; the type parameter carries the static scalar
//! type that connects columns, operations, and decoded results.

pub mod ops;

use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::fragment::ParamSlot;
use crate::query::SelectIr;
use crate::types::{SqlType, TypeCode};

/// Identity of a from-source (table reference, subquery, or values table).
///
/// Two references to the same table are distinct sources; identity is the
/// allocated id, never structural equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FromId(u64);

static NEXT_FROM_ID: AtomicU64 = AtomicU64::new(0);

impl FromId {
    /// Allocate a fresh, process-unique id.
    pub fn fresh() -> Self {
        FromId(NEXT_FROM_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Path of a leaf inside a projection shape: record fields and tuple
/// positions, outermost first. The empty path is a scalar projection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ColumnPath(pub Vec<&'static str>);

impl ColumnPath {
    /// The SQL alias this path is exported under: `res` for a scalar,
    /// `res__a__b` for nested shapes.
    pub fn alias(&self) -> String {
        if self.0.is_empty() {
            "res".to_string()
        } else {
            format!("res__{}", self.0.join("__"))
        }
    }
}

impl std::fmt::Display for ColumnPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

/// Binary operators rendered with a fixed spelling on every dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    /// Whether the rendered form is wrapped in parentheses.
    pub fn grouped(&self) -> bool {
        !matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge
        )
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sym = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Eq => "=",
            BinaryOp::Ne => "<>",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
        };
        write!(f, "{}", sym)
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Not,
    Neg,
    Plus,
    IsNull,
    IsNotNull,
}

/// Bitwise operators whose spelling is dialect-chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BitOp {
    And,
    Or,
    Xor,
}

/// Aggregate functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggFunc {
    Count,
    Sum,
    Min,
    Max,
    Avg,
    StringAgg,
}

impl std::fmt::Display for AggFunc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AggFunc::Count => "COUNT",
            AggFunc::Sum => "SUM",
            AggFunc::Min => "MIN",
            AggFunc::Max => "MAX",
            AggFunc::Avg => "AVG",
            AggFunc::StringAgg => "STRING_AGG",
        };
        write!(f, "{}", name)
    }
}

/// A scalar expression tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprNode {
    /// A column of a from-source, resolved to `alias.column` at render time.
    Column { table: FromId, name: &'static str },
    /// A result column of a subquery in scope, resolved to `alias.res__…`.
    SubqueryColumn { source: FromId, path: ColumnPath },
    /// A bound parameter.
    Literal(ParamSlot),
    /// Validated literal SQL text (`1`, `CURRENT_TIMESTAMP`).
    Raw(&'static str),
    Unary {
        op: UnaryOp,
        expr: Box<ExprNode>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<ExprNode>,
        rhs: Box<ExprNode>,
    },
    /// String concatenation; `||` or `CONCAT(…)` per dialect.
    Concat {
        lhs: Box<ExprNode>,
        rhs: Box<ExprNode>,
    },
    /// Integer modulo; `%` or `MOD(…)` per dialect.
    Modulo {
        lhs: Box<ExprNode>,
        rhs: Box<ExprNode>,
    },
    /// Bitwise operation; operator or function spelling per dialect.
    Bit {
        op: BitOp,
        lhs: Box<ExprNode>,
        rhs: Box<ExprNode>,
    },
    BitNot {
        expr: Box<ExprNode>,
    },
    /// Null-safe equality; generic expansion or `<=>` per dialect.
    NullSafeEq {
        lhs: Box<ExprNode>,
        rhs: Box<ExprNode>,
        negated: bool,
    },
    Like {
        expr: Box<ExprNode>,
        pattern: Box<ExprNode>,
        case_insensitive: bool,
    },
    /// Position of a substring; `POSITION(… IN …)` or `INSTR` per dialect.
    StrPos {
        needle: Box<ExprNode>,
        haystack: Box<ExprNode>,
    },
    /// Plain function call with a fixed name across dialects.
    Call {
        name: &'static str,
        args: Vec<ExprNode>,
    },
    Cast {
        expr: Box<ExprNode>,
        code: TypeCode,
    },
    Between {
        expr: Box<ExprNode>,
        lo: Box<ExprNode>,
        hi: Box<ExprNode>,
    },
    InValues {
        expr: Box<ExprNode>,
        list: Vec<ExprNode>,
        negated: bool,
    },
    InSubquery {
        expr: Box<ExprNode>,
        query: Box<SelectIr>,
        negated: bool,
    },
    Exists {
        query: Box<SelectIr>,
    },
    /// One-column, one-row select used as a scalar.
    ScalarSubquery {
        query: Box<SelectIr>,
    },
    Case {
        branches: Vec<(ExprNode, ExprNode)>,
        otherwise: Option<Box<ExprNode>>,
    },
    Aggregate {
        func: AggFunc,
        arg: Option<Box<ExprNode>>,
        distinct: bool,
        /// Separator for string aggregation.
        separator: Option<ParamSlot>,
    },
}

impl ExprNode {
    /// Visit this node and every descendant expression, descending into
    /// embedded subqueries.
    pub fn visit(&self, f: &mut dyn FnMut(&ExprNode)) {
        f(self);
        match self {
            ExprNode::Column { .. }
            | ExprNode::SubqueryColumn { .. }
            | ExprNode::Literal(_)
            | ExprNode::Raw(_) => {}
            ExprNode::Unary { expr, .. }
            | ExprNode::BitNot { expr }
            | ExprNode::Cast { expr, .. } => expr.visit(f),
            ExprNode::Binary { lhs, rhs, .. }
            | ExprNode::Concat { lhs, rhs }
            | ExprNode::Modulo { lhs, rhs }
            | ExprNode::Bit { lhs, rhs, .. }
            | ExprNode::NullSafeEq { lhs, rhs, .. } => {
                lhs.visit(f);
                rhs.visit(f);
            }
            ExprNode::Like { expr, pattern, .. } => {
                expr.visit(f);
                pattern.visit(f);
            }
            ExprNode::StrPos { needle, haystack } => {
                needle.visit(f);
                haystack.visit(f);
            }
            ExprNode::Call { args, .. } => {
                for arg in args {
                    arg.visit(f);
                }
            }
            ExprNode::Between { expr, lo, hi } => {
                expr.visit(f);
                lo.visit(f);
                hi.visit(f);
            }
            ExprNode::InValues { expr, list, .. } => {
                expr.visit(f);
                for item in list {
                    item.visit(f);
                }
            }
            ExprNode::InSubquery { expr, query, .. } => {
                expr.visit(f);
                query.visit_exprs(f);
            }
            ExprNode::Exists { query } | ExprNode::ScalarSubquery { query } => {
                query.visit_exprs(f)
            }
            ExprNode::Case {
                branches,
                otherwise,
            } => {
                for (cond, value) in branches {
                    cond.visit(f);
                    value.visit(f);
                }
                if let Some(e) = otherwise {
                    e.visit(f);
                }
            }
            ExprNode::Aggregate { arg, .. } => {
                if let Some(a) = arg {
                    a.visit(f);
                }
            }
        }
    }
}

/// A typed expression: an [`ExprNode`] plus the static scalar type it
/// evaluates to.
pub struct Expr<T> {
    node: ExprNode,
    marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Expr<T> {
    fn clone(&self) -> Self {
        Expr {
            node: self.node.clone(),
            marker: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for Expr<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Expr").field(&self.node).finish()
    }
}

impl<T> Expr<T> {
    /// Wrap an untyped node. The caller asserts the node evaluates to `T`.
    pub fn from_node(node: ExprNode) -> Self {
        Expr {
            node,
            marker: PhantomData,
        }
    }

    pub fn node(&self) -> &ExprNode {
        &self.node
    }

    pub fn into_node(self) -> ExprNode {
        self.node
    }

    /// Reinterpret the static type without changing the node. Used by the
    /// optional-lifting operations where SQL null propagation does the work.
    pub fn retype<U>(self) -> Expr<U> {
        Expr::from_node(self.node)
    }
}

impl<T: SqlType> Expr<T> {
    /// A column of the given from-source.
    pub fn column(table: FromId, name: &'static str) -> Self {
        Expr::from_node(ExprNode::Column { table, name })
    }

    /// A bound literal value.
    pub fn literal(value: T) -> Self {
        Expr::from_node(ExprNode::Literal(ParamSlot::new(
            value.to_value(),
            T::TYPE_CODE,
        )))
    }

    /// Validated literal SQL text standing in for a value of type `T`.
    pub fn raw(sql: &'static str) -> Self {
        Expr::from_node(ExprNode::Raw(sql))
    }
}

impl<T: SqlType> From<T> for Expr<T> {
    fn from(value: T) -> Self {
        Expr::literal(value)
    }
}

impl From<&str> for Expr<String> {
    fn from(value: &str) -> Self {
        Expr::literal(value.to_string())
    }
}

impl From<&str> for Expr<Option<String>> {
    fn from(value: &str) -> Self {
        Expr::literal(Some(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SqlValue;

    #[test]
    fn test_from_id_unique() {
        let a = FromId::fresh();
        let b = FromId::fresh();
        assert_ne!(a, b);
    }

    #[test]
    fn test_column_path_alias() {
        assert_eq!(ColumnPath::default().alias(), "res");
        assert_eq!(ColumnPath(vec!["0", "name"]).alias(), "res__0__name");
    }

    #[test]
    fn test_literal_slot() {
        let e = Expr::literal(7i64);
        match e.node() {
            ExprNode::Literal(slot) => {
                assert_eq!(slot.value, SqlValue::Int(7));
                assert_eq!(slot.code, TypeCode::BigInt);
            }
            other => panic!("expected literal, got {:?}", other),
        }
    }

    #[test]
    fn test_visit_descends() {
        let e = Expr::<i64>::literal(1) + Expr::literal(2);
        let mut literals = 0;
        e.node().visit(&mut |n| {
            if matches!(n, ExprNode::Literal(_)) {
                literals += 1;
            }
        });
        assert_eq!(literals, 2);
    }
}
