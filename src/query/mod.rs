//! Query IR.
//!
//! The typed builders in [`select`], [`insert`], [`update`], and [`delete`]
//! carry their projection as a live [`Queryable`](crate::queryable::Queryable)
//! value. Everything nested inside an expression or a from-source is erased
//! to the plain structures here, which is what the renderer walks.

pub mod delete;
pub mod insert;
pub mod select;
pub mod update;

use serde::{Deserialize, Serialize};

use crate::expr::{ColumnPath, ExprNode, FromId};
use crate::fragment::ParamSlot;
use crate::schema::{Assignment, TableMeta};

/// Compound set operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetOp {
    Union,
    UnionAll,
    Intersect,
    Except,
}

impl SetOp {
    /// Whether the operator preserves the row multiset of its inputs when a
    /// projected column is dropped. Only `UNION ALL` does; the others use
    /// every column for row equality.
    pub fn allows_column_elision(&self) -> bool {
        matches!(self, SetOp::UnionAll)
    }
}

impl std::fmt::Display for SetOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kw = match self {
            SetOp::Union => "UNION",
            SetOp::UnionAll => "UNION ALL",
            SetOp::Intersect => "INTERSECT",
            SetOp::Except => "EXCEPT",
        };
        write!(f, "{}", kw)
    }
}

/// Join kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
}

impl std::fmt::Display for JoinKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kw = match self {
            JoinKind::Inner => "JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Full => "FULL OUTER JOIN",
        };
        write!(f, "{}", kw)
    }
}

/// Sort direction of one order key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDir {
    Asc,
    Desc,
}

/// Null placement of one order key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NullsOrder {
    First,
    Last,
}

/// One ORDER BY key. Keys are kept primary-first.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByIr {
    pub expr: ExprNode,
    pub dir: Option<SortDir>,
    pub nulls: Option<NullsOrder>,
}

/// GROUP BY keys plus the HAVING predicates accumulated by later filters.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupByIr {
    pub keys: Vec<ExprNode>,
    pub having: Vec<ExprNode>,
}

/// A source in a FROM clause. Identity is the [`FromId`]; two references to
/// the same table are distinct sources.
#[derive(Debug, Clone, PartialEq)]
pub enum FromSource {
    Table {
        id: FromId,
        meta: &'static TableMeta,
    },
    Subquery {
        id: FromId,
        query: Box<SelectIr>,
    },
    /// Literal inline table: `(VALUES (?), (?)) alias (column)`.
    Values {
        id: FromId,
        column: &'static str,
        rows: Vec<ParamSlot>,
    },
}

impl FromSource {
    pub fn id(&self) -> FromId {
        match self {
            FromSource::Table { id, .. }
            | FromSource::Subquery { id, .. }
            | FromSource::Values { id, .. } => *id,
        }
    }
}

/// One join node. `on` is `None` only for comma cross-joins produced by
/// `flat_map`, whose predicate lives in WHERE.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinIr {
    pub kind: JoinKind,
    pub source: FromSource,
    pub on: Option<ExprNode>,
}

/// An erased simple select.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleSelectIr {
    pub projection: Vec<(ColumnPath, ExprNode)>,
    pub distinct: bool,
    pub from: Vec<FromSource>,
    pub joins: Vec<JoinIr>,
    pub wheres: Vec<ExprNode>,
    pub group_by: Option<GroupByIr>,
}

/// An erased compound select: a simple head plus chained set operations,
/// with the order/limit stack that applies to the whole.
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundSelectIr {
    pub lhs: SimpleSelectIr,
    pub ops: Vec<(SetOp, SimpleSelectIr)>,
    pub order_by: Vec<OrderByIr>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// An erased select of either shape.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectIr {
    Simple(SimpleSelectIr),
    Compound(CompoundSelectIr),
}

impl SimpleSelectIr {
    /// Visit every expression in this select, descending into nested
    /// subqueries (from-sources and expression-level ones).
    pub fn visit_exprs(&self, f: &mut dyn FnMut(&ExprNode)) {
        for (_, node) in &self.projection {
            node.visit(f);
        }
        for source in &self.from {
            if let FromSource::Subquery { query, .. } = source {
                query.visit_exprs(f);
            }
        }
        for join in &self.joins {
            if let FromSource::Subquery { query, .. } = &join.source {
                query.visit_exprs(f);
            }
            if let Some(on) = &join.on {
                on.visit(f);
            }
        }
        for pred in &self.wheres {
            pred.visit(f);
        }
        if let Some(group) = &self.group_by {
            for key in &group.keys {
                key.visit(f);
            }
            for pred in &group.having {
                pred.visit(f);
            }
        }
    }
}

impl SelectIr {
    pub fn visit_exprs(&self, f: &mut dyn FnMut(&ExprNode)) {
        match self {
            SelectIr::Simple(s) => s.visit_exprs(f),
            SelectIr::Compound(c) => {
                c.lhs.visit_exprs(f);
                for (_, side) in &c.ops {
                    side.visit_exprs(f);
                }
                for key in &c.order_by {
                    key.expr.visit(f);
                }
            }
        }
    }

    /// Projection of the head select; every side of a compound shares it.
    pub fn projection(&self) -> &[(ColumnPath, ExprNode)] {
        match self {
            SelectIr::Simple(s) => &s.projection,
            SelectIr::Compound(c) => &c.lhs.projection,
        }
    }
}

/// Erased INSERT.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertIr {
    pub meta: &'static TableMeta,
    /// Id the RETURNING projection's columns are bound to.
    pub table_id: FromId,
    pub source: InsertSourceIr,
    pub on_conflict: Option<OnConflictIr>,
    pub returning: Option<Vec<(ColumnPath, ExprNode)>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InsertSourceIr {
    /// Rows given as per-row assignment lists; every row must assign the
    /// same columns in the same order.
    Rows(Vec<Vec<Assignment>>),
    /// Explicit column tuple with positional value rows.
    Batched {
        columns: Vec<&'static str>,
        rows: Vec<Vec<ExprNode>>,
    },
    /// `INSERT … SELECT`.
    Select {
        columns: Vec<&'static str>,
        query: Box<SelectIr>,
    },
}

/// ON CONFLICT clause.
#[derive(Debug, Clone, PartialEq)]
pub struct OnConflictIr {
    /// Conflict-key columns; ignored by dialects without a key list.
    pub keys: Vec<&'static str>,
    pub action: ConflictActionIr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConflictActionIr {
    DoNothing,
    DoUpdate(Vec<Assignment>),
}

/// Erased UPDATE.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateIr {
    pub meta: &'static TableMeta,
    pub table_id: FromId,
    pub assigns: Vec<Assignment>,
    pub joins: Vec<JoinIr>,
    pub wheres: Vec<ExprNode>,
    pub returning: Option<Vec<(ColumnPath, ExprNode)>>,
}

/// Erased DELETE.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteIr {
    pub meta: &'static TableMeta,
    pub table_id: FromId,
    pub wheres: Vec<ExprNode>,
    pub returning: Option<Vec<(ColumnPath, ExprNode)>>,
}
