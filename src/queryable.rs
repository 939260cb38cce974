//! The row protocol: walking a projection into named expressions and
//! reconstructing result values from a flat row.
//!
//! A [`Queryable`] value is the query-side shape of a result row. Walking
//! it yields the ordered `(path, expression)` pairs the renderer projects;
//! decoding consumes one dynamic value per leaf, in the same order, and
//! rebuilds the output shape.

use crate::error::{RelqError, Result};
use crate::expr::{ColumnPath, Expr, ExprNode};
use crate::types::{SqlType, SqlValue, TypeCode};

/// A projection shape that can be flattened to columns and rebuilt from a
/// result row.
pub trait Queryable: Clone {
    /// The decoded, storage-side shape.
    type Output;

    /// Append `(path, expression)` pairs for every leaf, in order.
    fn walk(&self, path: &mut Vec<&'static str>, out: &mut Vec<(ColumnPath, ExprNode)>);

    /// Rebuild the same shape with every leaf substituted by `f`, keyed by
    /// the leaf's path. Used to re-root a projection onto a subquery alias.
    fn remap(
        &self,
        path: &mut Vec<&'static str>,
        f: &mut dyn FnMut(&ColumnPath) -> ExprNode,
    ) -> Self;

    /// Append the driver type code of every leaf, in walk order.
    fn type_codes(&self, out: &mut Vec<TypeCode>);

    /// Number of leaves.
    fn width(&self) -> usize;

    /// Decode one row, consuming `self.width()` values starting at `index`.
    fn decode(
        &self,
        row: &[SqlValue],
        index: &mut usize,
        path: &mut Vec<&'static str>,
    ) -> Result<Self::Output>;

    /// Convenience wrapper over [`Queryable::walk`] from an empty path.
    fn walked(&self) -> Vec<(ColumnPath, ExprNode)> {
        let mut path = Vec::new();
        let mut out = Vec::new();
        self.walk(&mut path, &mut out);
        out
    }

    /// Convenience wrapper over [`Queryable::remap`] from an empty path.
    fn remapped(&self, f: &mut dyn FnMut(&ColumnPath) -> ExprNode) -> Self {
        let mut path = Vec::new();
        self.remap(&mut path, f)
    }
}

/// Read one leaf value, with bounds and type checking.
pub fn read_column<T: SqlType>(
    row: &[SqlValue],
    index: &mut usize,
    path: &[&'static str],
) -> Result<T> {
    let alias = ColumnPath(path.to_vec()).alias();
    let value = row
        .get(*index)
        .ok_or_else(|| RelqError::decode(alias.clone(), "missing column in result row"))?;
    *index += 1;
    T::from_value(value).ok_or_else(|| {
        RelqError::decode(
            alias,
            format!("cannot read {} value as {}", value.kind(), T::TYPE_CODE),
        )
    })
}

impl<T: SqlType> Queryable for Expr<T> {
    type Output = T;

    fn walk(&self, path: &mut Vec<&'static str>, out: &mut Vec<(ColumnPath, ExprNode)>) {
        out.push((ColumnPath(path.clone()), self.node().clone()));
    }

    fn remap(
        &self,
        path: &mut Vec<&'static str>,
        f: &mut dyn FnMut(&ColumnPath) -> ExprNode,
    ) -> Self {
        Expr::from_node(f(&ColumnPath(path.clone())))
    }

    fn type_codes(&self, out: &mut Vec<TypeCode>) {
        out.push(T::TYPE_CODE);
    }

    fn width(&self) -> usize {
        1
    }

    fn decode(
        &self,
        row: &[SqlValue],
        index: &mut usize,
        path: &mut Vec<&'static str>,
    ) -> Result<T> {
        read_column(row, index, path)
    }
}

/// The query-side shape of an outer-join side that may be absent: wraps the
/// inner shape, decodes to `None` when the whole span is NULL.
#[derive(Clone)]
pub struct Nullable<R: Queryable>(R);

impl<R: Queryable> Nullable<R> {
    pub fn new(inner: R) -> Self {
        Nullable(inner)
    }

    /// The wrapped expression row. Expressions reached through here keep
    /// their non-optional static types; reads on unmatched rows decode the
    /// whole wrapper to `None` instead.
    pub fn inner(&self) -> &R {
        &self.0
    }
}

impl<R: Queryable> Queryable for Nullable<R> {
    type Output = Option<R::Output>;

    fn walk(&self, path: &mut Vec<&'static str>, out: &mut Vec<(ColumnPath, ExprNode)>) {
        self.0.walk(path, out);
    }

    fn remap(
        &self,
        path: &mut Vec<&'static str>,
        f: &mut dyn FnMut(&ColumnPath) -> ExprNode,
    ) -> Self {
        Nullable(self.0.remap(path, f))
    }

    fn type_codes(&self, out: &mut Vec<TypeCode>) {
        self.0.type_codes(out);
    }

    fn width(&self) -> usize {
        self.0.width()
    }

    fn decode(
        &self,
        row: &[SqlValue],
        index: &mut usize,
        path: &mut Vec<&'static str>,
    ) -> Result<Self::Output> {
        let span = self.0.width();
        let all_null = row
            .get(*index..*index + span)
            .map(|window| window.iter().all(SqlValue::is_null))
            .unwrap_or(false);
        if all_null {
            *index += span;
            return Ok(None);
        }
        self.0.decode(row, index, path).map(Some)
    }
}

macro_rules! impl_queryable_tuple {
    ($(($T:ident, $idx:tt, $seg:literal)),+) => {
        impl<$($T: Queryable),+> Queryable for ($($T,)+) {
            type Output = ($($T::Output,)+);

            fn walk(
                &self,
                path: &mut Vec<&'static str>,
                out: &mut Vec<(ColumnPath, ExprNode)>,
            ) {
                $(
                    path.push($seg);
                    self.$idx.walk(path, out);
                    path.pop();
                )+
            }

            fn remap(
                &self,
                path: &mut Vec<&'static str>,
                f: &mut dyn FnMut(&ColumnPath) -> ExprNode,
            ) -> Self {
                ($(
                    {
                        path.push($seg);
                        let part = self.$idx.remap(path, f);
                        path.pop();
                        part
                    },
                )+)
            }

            fn type_codes(&self, out: &mut Vec<TypeCode>) {
                $(self.$idx.type_codes(out);)+
            }

            fn width(&self) -> usize {
                0 $(+ self.$idx.width())+
            }

            fn decode(
                &self,
                row: &[SqlValue],
                index: &mut usize,
                path: &mut Vec<&'static str>,
            ) -> Result<Self::Output> {
                Ok(($(
                    {
                        path.push($seg);
                        let part = self.$idx.decode(row, index, path)?;
                        path.pop();
                        part
                    },
                )+))
            }
        }
    };
}

impl_queryable_tuple!((A, 0, "0"));
impl_queryable_tuple!((A, 0, "0"), (B, 1, "1"));
impl_queryable_tuple!((A, 0, "0"), (B, 1, "1"), (C, 2, "2"));
impl_queryable_tuple!((A, 0, "0"), (B, 1, "1"), (C, 2, "2"), (D, 3, "3"));
impl_queryable_tuple!((A, 0, "0"), (B, 1, "1"), (C, 2, "2"), (D, 3, "3"), (E, 4, "4"));
impl_queryable_tuple!(
    (A, 0, "0"),
    (B, 1, "1"),
    (C, 2, "2"),
    (D, 3, "3"),
    (E, 4, "4"),
    (F, 5, "5")
);
impl_queryable_tuple!(
    (A, 0, "0"),
    (B, 1, "1"),
    (C, 2, "2"),
    (D, 3, "3"),
    (E, 4, "4"),
    (F, 5, "5"),
    (G, 6, "6")
);
impl_queryable_tuple!(
    (A, 0, "0"),
    (B, 1, "1"),
    (C, 2, "2"),
    (D, 3, "3"),
    (E, 4, "4"),
    (F, 5, "5"),
    (G, 6, "6"),
    (H, 7, "7")
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::FromId;

    fn pair() -> (Expr<i64>, Expr<String>) {
        let t = FromId::fresh();
        (Expr::column(t, "id"), Expr::column(t, "name"))
    }

    #[test]
    fn test_tuple_walk_paths() {
        let shape = pair();
        let walked = shape.walked();
        assert_eq!(walked.len(), 2);
        assert_eq!(walked[0].0.alias(), "res__0");
        assert_eq!(walked[1].0.alias(), "res__1");
    }

    #[test]
    fn test_scalar_walk_path_is_res() {
        let (id, _) = pair();
        assert_eq!(id.walked()[0].0.alias(), "res");
    }

    #[test]
    fn test_tuple_decode() {
        let shape = pair();
        let row = vec![SqlValue::Int(3), SqlValue::Text("socks".into())];
        let mut index = 0;
        let mut path = Vec::new();
        let decoded = shape.decode(&row, &mut index, &mut path).unwrap();
        assert_eq!(decoded, (3, "socks".to_string()));
        assert_eq!(index, 2);
    }

    #[test]
    fn test_nullable_decodes_null_span_to_none() {
        let shape = Nullable::new(pair());
        let row = vec![SqlValue::Null, SqlValue::Null];
        let mut index = 0;
        let mut path = Vec::new();
        assert_eq!(shape.decode(&row, &mut index, &mut path).unwrap(), None);
        assert_eq!(index, 2);
    }

    #[test]
    fn test_nullable_decodes_present_span() {
        let shape = Nullable::new(pair());
        let row = vec![SqlValue::Int(1), SqlValue::Text("x".into())];
        let mut index = 0;
        let mut path = Vec::new();
        assert_eq!(
            shape.decode(&row, &mut index, &mut path).unwrap(),
            Some((1, "x".to_string()))
        );
    }

    #[test]
    fn test_decode_type_mismatch_names_path() {
        let shape = pair();
        let row = vec![SqlValue::Int(3), SqlValue::Int(9)];
        let mut index = 0;
        let mut path = Vec::new();
        let err = shape.decode(&row, &mut index, &mut path).unwrap_err();
        assert!(err.to_string().contains("res__1"));
    }

    #[test]
    fn test_remap_reroots_leaves() {
        let shape = pair();
        let source = FromId::fresh();
        let rerooted = shape.remapped(&mut |p| ExprNode::SubqueryColumn {
            source,
            path: p.clone(),
        });
        match rerooted.0.node() {
            ExprNode::SubqueryColumn { path, .. } => assert_eq!(path.alias(), "res__0"),
            other => panic!("expected subquery column, got {:?}", other),
        }
    }
}
