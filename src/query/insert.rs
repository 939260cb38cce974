//! Typed INSERT builders: single-row assignments, multi-row batches, and
//! insert-from-select, with dialect-gated ON CONFLICT and RETURNING.

use std::marker::PhantomData;

use crate::expr::{Expr, ExprNode, FromId};
use crate::query::select::Select;
use crate::query::{ConflictActionIr, InsertIr, InsertSourceIr, OnConflictIr};
use crate::queryable::Queryable;
use crate::schema::{Assignment, Column, Table};
use crate::types::SqlType;

/// A tuple of column handles with the matching tuple of host values and of
/// typed expressions. Bounded at 8 positions; nest inserts beyond that.
pub trait ColumnTuple {
    /// Host-value row shape for [`Insert::batched`].
    type Values;
    /// Expression row shape a source select must project for
    /// [`Insert::from_select`].
    type Exprs: Queryable;

    fn names(&self) -> Vec<&'static str>;
    fn row_to_nodes(row: Self::Values) -> Vec<ExprNode>;
}

macro_rules! impl_column_tuple {
    ($(($T:ident, $idx:tt)),+) => {
        impl<$($T: SqlType),+> ColumnTuple for ($(Column<$T>,)+) {
            type Values = ($($T,)+);
            type Exprs = ($(Expr<$T>,)+);

            fn names(&self) -> Vec<&'static str> {
                vec![$(self.$idx.name()),+]
            }

            fn row_to_nodes(row: Self::Values) -> Vec<ExprNode> {
                vec![$(Expr::literal(row.$idx).into_node()),+]
            }
        }
    };
}

impl_column_tuple!((A, 0));
impl_column_tuple!((A, 0), (B, 1));
impl_column_tuple!((A, 0), (B, 1), (C, 2));
impl_column_tuple!((A, 0), (B, 1), (C, 2), (D, 3));
impl_column_tuple!((A, 0), (B, 1), (C, 2), (D, 3), (E, 4));
impl_column_tuple!((A, 0), (B, 1), (C, 2), (D, 3), (E, 4), (F, 5));
impl_column_tuple!((A, 0), (B, 1), (C, 2), (D, 3), (E, 4), (F, 5), (G, 6));
impl_column_tuple!((A, 0), (B, 1), (C, 2), (D, 3), (E, 4), (F, 5), (G, 6), (H, 7));

/// A typed INSERT into `T`'s table.
#[derive(Clone)]
pub struct Insert<T: Table> {
    table_id: FromId,
    source: InsertSourceIr,
    on_conflict: Option<OnConflictIr>,
    marker: PhantomData<fn() -> T>,
}

impl<T: Table> Insert<T> {
    pub(crate) fn new() -> Self {
        Insert {
            table_id: FromId::fresh(),
            source: InsertSourceIr::Rows(vec![]),
            on_conflict: None,
            marker: PhantomData,
        }
    }

    /// Add one row of `column = value` assignments. Unassigned columns are
    /// omitted and fall back to database defaults / auto-increment.
    /// Calling `values` repeatedly appends rows; every row must assign the
    /// same columns.
    pub fn values(mut self, f: impl FnOnce(&T::Cols) -> Vec<Assignment>) -> Self {
        let row = f(&T::cols());
        match &mut self.source {
            InsertSourceIr::Rows(rows) => rows.push(row),
            _ => self.source = InsertSourceIr::Rows(vec![row]),
        }
        self
    }

    /// Multi-row insert: one column tuple, many positional value tuples,
    /// emitted as a single statement with one VALUES clause.
    pub fn batched<C: ColumnTuple>(
        mut self,
        columns: impl FnOnce(&T::Cols) -> C,
        rows: impl IntoIterator<Item = C::Values>,
    ) -> Self {
        let cols = columns(&T::cols());
        self.source = InsertSourceIr::Batched {
            columns: cols.names(),
            rows: rows.into_iter().map(C::row_to_nodes).collect(),
        };
        self
    }

    /// `INSERT … SELECT` from a query projecting the target column types.
    pub fn from_select<C: ColumnTuple>(
        mut self,
        columns: impl FnOnce(&T::Cols) -> C,
        query: Select<C::Exprs>,
    ) -> Self {
        let cols = columns(&T::cols());
        self.source = InsertSourceIr::Select {
            columns: cols.names(),
            query: Box::new(query.erase()),
        };
        self
    }

    /// Skip conflicting rows: `ON CONFLICT (…) DO NOTHING` (the key list is
    /// dropped on dialects without one). Unsupported dialects fail at
    /// render time.
    pub fn on_conflict_ignore(mut self, keys: impl FnOnce(&T::Cols) -> Vec<&'static str>) -> Self {
        self.on_conflict = Some(OnConflictIr {
            keys: keys(&T::cols()),
            action: ConflictActionIr::DoNothing,
        });
        self
    }

    /// Upsert: `ON CONFLICT (…) DO UPDATE SET …` or the dialect's
    /// duplicate-key form.
    pub fn on_conflict_update(
        mut self,
        keys: impl FnOnce(&T::Cols) -> Vec<&'static str>,
        set: impl FnOnce(&T::Cols) -> Vec<Assignment>,
    ) -> Self {
        self.on_conflict = Some(OnConflictIr {
            keys: keys(&T::cols()),
            action: ConflictActionIr::DoUpdate(set(&T::cols())),
        });
        self
    }

    /// Return columns of the affected rows. Fails at render time on
    /// dialects without RETURNING.
    pub fn returning<R: Queryable>(
        self,
        f: impl FnOnce(&T::Expr) -> R,
    ) -> InsertReturning<T, R> {
        let row = T::expr(self.table_id);
        let projection = f(&row);
        InsertReturning {
            insert: self,
            projection,
        }
    }

    pub(crate) fn erase(&self) -> InsertIr {
        InsertIr {
            meta: T::META,
            table_id: self.table_id,
            source: self.source.clone(),
            on_conflict: self.on_conflict.clone(),
            returning: None,
        }
    }
}

/// An INSERT with a RETURNING projection of shape `R`.
#[derive(Clone)]
pub struct InsertReturning<T: Table, R: Queryable> {
    insert: Insert<T>,
    projection: R,
}

impl<T: Table, R: Queryable> InsertReturning<T, R> {
    pub fn projection(&self) -> &R {
        &self.projection
    }

    pub(crate) fn erase(&self) -> InsertIr {
        let mut ir = self.insert.erase();
        ir.returning = Some(self.projection.walked());
        ir
    }
}
