//! Typed UPDATE builder.

use crate::expr::{Expr, ExprNode, FromId};
use crate::query::select::{join_target_source, Select};
use crate::query::{JoinIr, JoinKind, UpdateIr};
use crate::queryable::Queryable;
use crate::schema::{Assignment, Table};

/// A typed UPDATE of `T`'s table.
#[derive(Clone)]
pub struct Update<T: Table> {
    table_id: FromId,
    row: T::Expr,
    assigns: Vec<Assignment>,
    joins: Vec<JoinIr>,
    wheres: Vec<ExprNode>,
}

impl<T: Table> Update<T> {
    pub(crate) fn new(pred: impl FnOnce(&T::Expr) -> Expr<bool>) -> Self {
        let table_id = FromId::fresh();
        let row = T::expr(table_id);
        let wheres = vec![pred(&row).into_node()];
        Update {
            table_id,
            row,
            assigns: vec![],
            joins: vec![],
            wheres,
        }
    }

    /// Set columns. The closure sees the assignment handles and the current
    /// row, so assignments can be computed from existing values.
    pub fn set(mut self, f: impl FnOnce(&T::Cols, &T::Expr) -> Vec<Assignment>) -> Self {
        self.assigns.extend(f(&T::cols(), &self.row));
        self
    }

    /// Narrow the affected rows further.
    pub fn filter(mut self, f: impl FnOnce(&T::Expr) -> Expr<bool>) -> Self {
        self.wheres.push(f(&self.row).into_node());
        self
    }

    /// Join another query for a multi-table update. The closure produces
    /// the join predicate together with the assignments that read from the
    /// joined row.
    pub fn join<Q2: Queryable>(
        mut self,
        other: Select<Q2>,
        f: impl FnOnce(&T::Expr, &Q2) -> (Expr<bool>, Vec<Assignment>),
    ) -> Self {
        let (source, q2) = join_target_source(other);
        let (pred, assigns) = f(&self.row, &q2);
        self.joins.push(JoinIr {
            kind: JoinKind::Inner,
            source,
            on: Some(pred.into_node()),
        });
        self.assigns.extend(assigns);
        self
    }

    /// Return columns of the affected rows; dialect-gated like the insert
    /// form.
    pub fn returning<R: Queryable>(self, f: impl FnOnce(&T::Expr) -> R) -> UpdateReturning<T, R> {
        let projection = f(&self.row);
        UpdateReturning {
            update: self,
            projection,
        }
    }

    pub(crate) fn erase(&self) -> UpdateIr {
        UpdateIr {
            meta: T::META,
            table_id: self.table_id,
            assigns: self.assigns.clone(),
            joins: self.joins.clone(),
            wheres: self.wheres.clone(),
            returning: None,
        }
    }
}

/// An UPDATE with a RETURNING projection of shape `R`.
#[derive(Clone)]
pub struct UpdateReturning<T: Table, R: Queryable> {
    update: Update<T>,
    projection: R,
}

impl<T: Table, R: Queryable> UpdateReturning<T, R> {
    pub fn projection(&self) -> &R {
        &self.projection
    }

    pub(crate) fn erase(&self) -> UpdateIr {
        let mut ir = self.update.erase();
        ir.returning = Some(self.projection.walked());
        ir
    }
}
