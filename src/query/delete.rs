//! Typed DELETE builder.

use crate::expr::{Expr, ExprNode, FromId};
use crate::query::DeleteIr;
use crate::queryable::Queryable;
use crate::schema::Table;

/// A typed DELETE from `T`'s table.
#[derive(Clone)]
pub struct Delete<T: Table> {
    table_id: FromId,
    row: T::Expr,
    wheres: Vec<ExprNode>,
}

impl<T: Table> Delete<T> {
    pub(crate) fn new(pred: impl FnOnce(&T::Expr) -> Expr<bool>) -> Self {
        let table_id = FromId::fresh();
        let row = T::expr(table_id);
        let wheres = vec![pred(&row).into_node()];
        Delete {
            table_id,
            row,
            wheres,
        }
    }

    /// Narrow the affected rows further.
    pub fn filter(mut self, f: impl FnOnce(&T::Expr) -> Expr<bool>) -> Self {
        self.wheres.push(f(&self.row).into_node());
        self
    }

    /// Return columns of the deleted rows; dialect-gated.
    pub fn returning<R: Queryable>(self, f: impl FnOnce(&T::Expr) -> R) -> DeleteReturning<T, R> {
        let projection = f(&self.row);
        DeleteReturning {
            delete: self,
            projection,
        }
    }

    pub(crate) fn erase(&self) -> DeleteIr {
        DeleteIr {
            meta: T::META,
            table_id: self.table_id,
            wheres: self.wheres.clone(),
            returning: None,
        }
    }
}

/// A DELETE with a RETURNING projection of shape `R`.
#[derive(Clone)]
pub struct DeleteReturning<T: Table, R: Queryable> {
    delete: Delete<T>,
    projection: R,
}

impl<T: Table, R: Queryable> DeleteReturning<T, R> {
    pub fn projection(&self) -> &R {
        &self.projection
    }

    pub(crate) fn erase(&self) -> DeleteIr {
        let mut ir = self.delete.erase();
        ir.returning = Some(self.projection.walked());
        ir
    }
}
