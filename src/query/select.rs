//! The select composition algebra.
//!
//! A [`Select`] is either a [`SimpleSelect`] (projection, from, joins,
//! where, group-by) or a [`CompoundSelect`] (a simple head plus set
//! operations, with the order/limit stack). Combinators normalize at
//! composition time: stacked filters become a conjunction, filters after a
//! group-by become HAVING, limit stacks fold by `min`/sum, and operations
//! that would change the meaning of an already-shaped query wrap it in a
//! subquery reference first.

use crate::expr::ops::aggregate;
use crate::expr::{Expr, ExprNode, FromId};
use crate::fragment::ParamSlot;
use crate::query::{
    CompoundSelectIr, FromSource, GroupByIr, JoinIr, JoinKind, NullsOrder, OrderByIr, SelectIr,
    SetOp, SimpleSelectIr, SortDir,
};
use crate::queryable::{Nullable, Queryable};
use crate::schema::Table;
use crate::types::{SqlNumeric, SqlType};

/// A select without order, limit, or set operations.
#[derive(Clone)]
pub struct SimpleSelect<Q: Queryable> {
    pub(crate) projection: Q,
    pub(crate) distinct: bool,
    pub(crate) from: Vec<FromSource>,
    pub(crate) joins: Vec<JoinIr>,
    pub(crate) wheres: Vec<ExprNode>,
    pub(crate) group_by: Option<GroupByIr>,
}

/// A select carrying set operations and/or an order/limit stack.
#[derive(Clone)]
pub struct CompoundSelect<Q: Queryable> {
    pub(crate) lhs: SimpleSelect<Q>,
    pub(crate) ops: Vec<(SetOp, SimpleSelect<Q>)>,
    /// Primary key first; `sort_by` prepends.
    pub(crate) order_by: Vec<OrderByIr>,
    pub(crate) limit: Option<u64>,
    pub(crate) offset: Option<u64>,
}

/// A composable, renderable SELECT with result shape `Q`.
#[derive(Clone)]
pub enum Select<Q: Queryable> {
    Simple(SimpleSelect<Q>),
    Compound(CompoundSelect<Q>),
}

fn with_projection<Q: Queryable, R: Queryable>(
    s: SimpleSelect<Q>,
    projection: R,
) -> SimpleSelect<R> {
    SimpleSelect {
        projection,
        distinct: s.distinct,
        from: s.from,
        joins: s.joins,
        wheres: s.wheres,
        group_by: s.group_by,
    }
}

impl<Q: Queryable> SimpleSelect<Q> {
    pub(crate) fn erase(&self) -> SimpleSelectIr {
        SimpleSelectIr {
            projection: self.projection.walked(),
            distinct: self.distinct,
            from: self.from.clone(),
            joins: self.joins.clone(),
            wheres: self.wheres.clone(),
            group_by: self.group_by.clone(),
        }
    }
}

impl<Q: Queryable> Select<Q> {
    /// A fresh `SELECT *`-shaped query over a table.
    pub fn from_table<T: Table<Expr = Q>>() -> Select<Q> {
        let id = FromId::fresh();
        Select::Simple(SimpleSelect {
            projection: T::expr(id),
            distinct: false,
            from: vec![FromSource::Table { id, meta: T::META }],
            joins: vec![],
            wheres: vec![],
            group_by: None,
        })
    }

    /// The current projection value.
    pub fn projection(&self) -> &Q {
        match self {
            Select::Simple(s) => &s.projection,
            Select::Compound(c) => &c.lhs.projection,
        }
    }

    pub(crate) fn erase(&self) -> SelectIr {
        match self {
            Select::Simple(s) => SelectIr::Simple(s.erase()),
            Select::Compound(c) => SelectIr::Compound(CompoundSelectIr {
                lhs: c.lhs.erase(),
                ops: c.ops.iter().map(|(op, s)| (*op, s.erase())).collect(),
                order_by: c.order_by.clone(),
                limit: c.limit,
                offset: c.offset,
            }),
        }
    }

    /// Rebuild this query as a subquery reference: the whole select moves
    /// into FROM and the projection is re-rooted onto its exported columns.
    pub(crate) fn wrap(self) -> SimpleSelect<Q> {
        let id = FromId::fresh();
        let projection = self.projection().remapped(&mut |path| ExprNode::SubqueryColumn {
            source: id,
            path: path.clone(),
        });
        let query = Box::new(self.erase());
        SimpleSelect {
            projection,
            distinct: false,
            from: vec![FromSource::Subquery { id, query }],
            joins: vec![],
            wheres: vec![],
            group_by: None,
        }
    }

    /// Force a subquery boundary.
    pub fn subquery(self) -> Select<Q> {
        Select::Simple(self.wrap())
    }

    fn into_plain_simple(self) -> SimpleSelect<Q> {
        match self {
            Select::Simple(s) => s,
            other => other.wrap(),
        }
    }

    /// A simple select that further from/joins/where edits keep sound.
    fn into_joinable(self) -> SimpleSelect<Q> {
        match self {
            Select::Simple(s) if s.group_by.is_none() && !s.distinct => s,
            other => other.wrap(),
        }
    }

    /// Restrict the rows. Before a `group_by` this appends to WHERE; after
    /// one it appends to HAVING; on a compound select the query is wrapped
    /// first. Stacked filters conjoin.
    pub fn filter(self, f: impl FnOnce(&Q) -> Expr<bool>) -> Self {
        match self {
            Select::Simple(mut s) => {
                let pred = f(&s.projection).into_node();
                match &mut s.group_by {
                    Some(group) => group.having.push(pred),
                    None => s.wheres.push(pred),
                }
                Select::Simple(s)
            }
            other => {
                let mut s = other.wrap();
                let pred = f(&s.projection).into_node();
                s.wheres.push(pred);
                Select::Simple(s)
            }
        }
    }

    /// Replace the projection. A plain select (also one that only carries
    /// order/limit) is reshaped in place; distinct, grouped, or set-op
    /// queries are wrapped so their row multiset is preserved.
    pub fn map<R: Queryable>(self, f: impl FnOnce(&Q) -> R) -> Select<R> {
        match self {
            Select::Simple(s) if s.group_by.is_none() && !s.distinct => {
                let projection = f(&s.projection);
                Select::Simple(with_projection(s, projection))
            }
            Select::Compound(c)
                if c.ops.is_empty() && c.lhs.group_by.is_none() && !c.lhs.distinct =>
            {
                let projection = f(&c.lhs.projection);
                Select::Compound(CompoundSelect {
                    lhs: with_projection(c.lhs, projection),
                    ops: vec![],
                    order_by: c.order_by,
                    limit: c.limit,
                    offset: c.offset,
                })
            }
            other => {
                let s = other.wrap();
                let projection = f(&s.projection);
                Select::Simple(with_projection(s, projection))
            }
        }
    }

    /// Merge another query's sources into this one, comma-cross-join style.
    /// A dependency of the inner query on the outer row simply shows up in
    /// the merged WHERE clause.
    pub fn flat_map<R: Queryable>(self, f: impl FnOnce(&Q) -> Select<R>) -> Select<R> {
        let outer = self.into_joinable();
        let inner = match f(&outer.projection) {
            Select::Simple(i) if i.group_by.is_none() && !i.distinct => i,
            other => other.wrap(),
        };
        let mut from = outer.from;
        from.extend(inner.from);
        let mut joins = outer.joins;
        joins.extend(inner.joins);
        let mut wheres = outer.wheres;
        wheres.extend(inner.wheres);
        Select::Simple(SimpleSelect {
            projection: inner.projection,
            distinct: false,
            from,
            joins,
            wheres,
            group_by: None,
        })
    }

    /// Add a sort key. The key is prepended: the last-applied `sort_by` is
    /// the primary sort, earlier ones break its ties.
    pub fn sort_by<T: SqlType>(self, f: impl FnOnce(&Q) -> Expr<T>) -> Self {
        match self {
            Select::Simple(s) => {
                let key = OrderByIr {
                    expr: f(&s.projection).into_node(),
                    dir: None,
                    nulls: None,
                };
                Select::Compound(CompoundSelect {
                    lhs: s,
                    ops: vec![],
                    order_by: vec![key],
                    limit: None,
                    offset: None,
                })
            }
            Select::Compound(mut c) if c.limit.is_none() && c.offset.is_none() => {
                let key = OrderByIr {
                    expr: f(&c.lhs.projection).into_node(),
                    dir: None,
                    nulls: None,
                };
                c.order_by.insert(0, key);
                Select::Compound(c)
            }
            // Sorting after a limit changes which rows survive; wrap first.
            other => {
                let s = other.wrap();
                Select::Simple(s).sort_by(f)
            }
        }
    }

    fn modify_first_key(self, f: impl FnOnce(&mut OrderByIr)) -> Self {
        match self {
            Select::Compound(mut c) => {
                if let Some(key) = c.order_by.first_mut() {
                    f(key);
                }
                Select::Compound(c)
            }
            other => other,
        }
    }

    /// Make the most recently added sort key ascending.
    pub fn asc(self) -> Self {
        self.modify_first_key(|k| k.dir = Some(SortDir::Asc))
    }

    /// Make the most recently added sort key descending.
    pub fn desc(self) -> Self {
        self.modify_first_key(|k| k.dir = Some(SortDir::Desc))
    }

    /// Sort NULLs first on the most recently added sort key.
    pub fn nulls_first(self) -> Self {
        self.modify_first_key(|k| k.nulls = Some(NullsOrder::First))
    }

    /// Sort NULLs last on the most recently added sort key.
    pub fn nulls_last(self) -> Self {
        self.modify_first_key(|k| k.nulls = Some(NullsOrder::Last))
    }

    /// Keep at most `n` rows. Stacked takes keep the minimum.
    pub fn take(self, n: u64) -> Self {
        match self {
            Select::Simple(s) => Select::Compound(CompoundSelect {
                lhs: s,
                ops: vec![],
                order_by: vec![],
                limit: Some(n),
                offset: None,
            }),
            Select::Compound(mut c) => {
                c.limit = Some(c.limit.map_or(n, |m| m.min(n)));
                Select::Compound(c)
            }
        }
    }

    /// Skip the first `n` rows. Stacked drops sum; a drop after a take
    /// narrows the remaining window.
    pub fn drop(self, n: u64) -> Self {
        match self {
            Select::Simple(s) => Select::Compound(CompoundSelect {
                lhs: s,
                ops: vec![],
                order_by: vec![],
                limit: None,
                offset: Some(n),
            }),
            Select::Compound(mut c) => {
                c.offset = Some(c.offset.unwrap_or(0) + n);
                c.limit = c.limit.map(|m| m.saturating_sub(n));
                Select::Compound(c)
            }
        }
    }

    /// Deduplicate rows. Forces a subquery around grouped, sorted, or
    /// limited queries.
    pub fn distinct(self) -> Self {
        match self {
            Select::Simple(mut s) if s.group_by.is_none() => {
                s.distinct = true;
                Select::Simple(s)
            }
            other => {
                let mut s = other.wrap();
                s.distinct = true;
                Select::Simple(s)
            }
        }
    }

    /// Group rows by a key and project aggregates over each group. A later
    /// `filter` lands in HAVING.
    pub fn group_by<K: SqlType, R: Queryable>(
        self,
        key: impl FnOnce(&Q) -> Expr<K>,
        agg: impl FnOnce(&Expr<K>, &Q) -> R,
    ) -> Select<R> {
        let s = match self {
            Select::Simple(s) if s.group_by.is_none() && !s.distinct => s,
            other => other.wrap(),
        };
        let key_expr = key(&s.projection);
        let projection = agg(&key_expr, &s.projection);
        let group = GroupByIr {
            keys: vec![key_expr.into_node()],
            having: vec![],
        };
        let mut out = with_projection(s, projection);
        out.group_by = Some(group);
        Select::Simple(out)
    }

    /// Collapse the whole query to a single row of aggregates.
    pub fn aggregate<R: Queryable>(self, f: impl FnOnce(&Q) -> R) -> Select<R> {
        let s = match self {
            Select::Simple(s) if s.group_by.is_none() && !s.distinct => s,
            other => other.wrap(),
        };
        let projection = f(&s.projection);
        Select::Simple(with_projection(s, projection))
    }

    /// `COUNT(1)` over the query.
    pub fn count(self) -> Select<Expr<i64>> {
        self.aggregate(|_| aggregate::count())
    }

    fn join_as<Q2: Queryable, R: Queryable>(
        self,
        other: Select<Q2>,
        kind: JoinKind,
        on: impl FnOnce(&Q, &Q2) -> Expr<bool>,
        shape: impl FnOnce(Q, Q2) -> R,
    ) -> Select<R> {
        let mut s = self.into_joinable();
        let (source, q2) = join_target_source(other);
        let pred = on(&s.projection, &q2).into_node();
        s.joins.push(JoinIr {
            kind,
            source,
            on: Some(pred),
        });
        let projection = shape(s.projection.clone(), q2);
        Select::Simple(with_projection(s, projection))
    }

    /// Inner join.
    pub fn join<Q2: Queryable>(
        self,
        other: Select<Q2>,
        on: impl FnOnce(&Q, &Q2) -> Expr<bool>,
    ) -> Select<(Q, Q2)> {
        self.join_as(other, JoinKind::Inner, on, |a, b| (a, b))
    }

    /// Left join; the right side decodes to `None` where unmatched.
    pub fn left_join<Q2: Queryable>(
        self,
        other: Select<Q2>,
        on: impl FnOnce(&Q, &Q2) -> Expr<bool>,
    ) -> Select<(Q, Nullable<Q2>)> {
        self.join_as(other, JoinKind::Left, on, |a, b| (a, Nullable::new(b)))
    }

    /// Right join; the left side decodes to `None` where unmatched.
    pub fn right_join<Q2: Queryable>(
        self,
        other: Select<Q2>,
        on: impl FnOnce(&Q, &Q2) -> Expr<bool>,
    ) -> Select<(Nullable<Q>, Q2)> {
        self.join_as(other, JoinKind::Right, on, |a, b| (Nullable::new(a), b))
    }

    /// Full outer join; both sides become nullable. Dialects without FULL
    /// OUTER render this as `LEFT JOIN … UNION … RIGHT JOIN …`.
    pub fn outer_join<Q2: Queryable>(
        self,
        other: Select<Q2>,
        on: impl FnOnce(&Q, &Q2) -> Expr<bool>,
    ) -> Select<(Nullable<Q>, Nullable<Q2>)> {
        self.join_as(other, JoinKind::Full, on, |a, b| {
            (Nullable::new(a), Nullable::new(b))
        })
    }

    fn compound_with(self, op: SetOp, other: Select<Q>) -> Select<Q> {
        let (lhs, mut ops) = match self {
            Select::Simple(s) => (s, vec![]),
            Select::Compound(c)
                if c.order_by.is_empty() && c.limit.is_none() && c.offset.is_none() =>
            {
                (c.lhs, c.ops)
            }
            shaped => (shaped.wrap(), vec![]),
        };
        ops.push((op, other.into_plain_simple()));
        Select::Compound(CompoundSelect {
            lhs,
            ops,
            order_by: vec![],
            limit: None,
            offset: None,
        })
    }

    /// Set union, removing duplicates.
    pub fn union(self, other: Select<Q>) -> Select<Q> {
        self.compound_with(SetOp::Union, other)
    }

    /// Multiset union, keeping duplicates.
    pub fn union_all(self, other: Select<Q>) -> Select<Q> {
        self.compound_with(SetOp::UnionAll, other)
    }

    pub fn intersect(self, other: Select<Q>) -> Select<Q> {
        self.compound_with(SetOp::Intersect, other)
    }

    pub fn except(self, other: Select<Q>) -> Select<Q> {
        self.compound_with(SetOp::Except, other)
    }

    /// `EXISTS (…)` over this query.
    pub fn exists(self) -> Expr<bool> {
        Expr::from_node(ExprNode::Exists {
            query: Box::new(self.erase()),
        })
    }
}

impl<T: SqlType> Select<Expr<T>> {
    /// `item IN (…)` over this single-column query.
    pub fn contains(self, item: impl Into<Expr<T>>) -> Expr<bool> {
        Expr::from_node(ExprNode::InSubquery {
            expr: Box::new(item.into().into_node()),
            query: Box::new(self.erase()),
            negated: false,
        })
    }

    /// Use this one-column, one-row query as a scalar expression.
    pub fn as_expr(self) -> Expr<T> {
        Expr::from_node(ExprNode::ScalarSubquery {
            query: Box::new(self.erase()),
        })
    }

    /// `MIN` over the projected column.
    pub fn min(self) -> Select<Expr<T>> {
        self.aggregate(|e| aggregate::min(e))
    }

    /// `MAX` over the projected column.
    pub fn max(self) -> Select<Expr<T>> {
        self.aggregate(|e| aggregate::max(e))
    }
}

impl<T: SqlNumeric> Select<Expr<T>> {
    /// `SUM` over the projected column.
    pub fn sum(self) -> Select<Expr<T>> {
        self.aggregate(|e| aggregate::sum(e))
    }

    /// `AVG` over the projected column.
    pub fn avg(self) -> Select<Expr<T>> {
        self.aggregate(|e| aggregate::avg(e))
    }
}

/// Resolve a select used as a join target: an untouched single-table query
/// joins as the table itself, anything else becomes a subquery reference
/// with its projection re-rooted onto the exported columns.
pub(crate) fn join_target_source<Q2: Queryable>(other: Select<Q2>) -> (FromSource, Q2) {
    match other {
        Select::Simple(mut s)
            if s.joins.is_empty()
                && s.wheres.is_empty()
                && s.group_by.is_none()
                && !s.distinct
                && s.from.len() == 1 =>
        {
            let source = s.from.remove(0);
            (source, s.projection)
        }
        other => {
            let id = FromId::fresh();
            let projection = other
                .projection()
                .remapped(&mut |path| ExprNode::SubqueryColumn {
                    source: id,
                    path: path.clone(),
                });
            let query = Box::new(other.erase());
            (FromSource::Subquery { id, query }, projection)
        }
    }
}

/// A literal inline table of values, usable like any other select.
pub fn values_of<T: SqlType>(items: impl IntoIterator<Item = T>) -> Select<Expr<T>> {
    let id = FromId::fresh();
    let rows = items
        .into_iter()
        .map(|v| ParamSlot::new(v.to_value(), T::TYPE_CODE))
        .collect();
    Select::Simple(SimpleSelect {
        projection: Expr::column(id, "column1"),
        distinct: false,
        from: vec![FromSource::Values {
            id,
            column: "column1",
            rows,
        }],
        joins: vec![],
        wheres: vec![],
        group_by: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Select<Expr<i64>> {
        values_of([1i64, 2, 3])
    }

    #[test]
    fn test_take_take_keeps_min() {
        let q = base().take(5).take(2);
        match q {
            Select::Compound(c) => assert_eq!(c.limit, Some(2)),
            _ => panic!("expected compound"),
        }
    }

    #[test]
    fn test_drop_drop_sums() {
        let q = base().drop(2).drop(3);
        match q {
            Select::Compound(c) => {
                assert_eq!(c.offset, Some(5));
                assert_eq!(c.limit, None);
            }
            _ => panic!("expected compound"),
        }
    }

    #[test]
    fn test_take_then_drop_narrows_window() {
        let q = base().take(2).drop(1);
        match q {
            Select::Compound(c) => {
                assert_eq!(c.limit, Some(1));
                assert_eq!(c.offset, Some(1));
            }
            _ => panic!("expected compound"),
        }
    }

    #[test]
    fn test_filter_stacks_into_wheres() {
        let q = base().filter(|n| n.gt(0i64)).filter(|n| n.lt(10i64));
        match q {
            Select::Simple(s) => assert_eq!(s.wheres.len(), 2),
            _ => panic!("expected simple"),
        }
    }

    #[test]
    fn test_last_sort_is_primary() {
        let q = base().sort_by(|n| n.clone()).asc().sort_by(|n| n.clone() + 1i64).desc();
        match q {
            Select::Compound(c) => {
                assert_eq!(c.order_by.len(), 2);
                assert_eq!(c.order_by[0].dir, Some(SortDir::Desc));
                assert_eq!(c.order_by[1].dir, Some(SortDir::Asc));
            }
            _ => panic!("expected compound"),
        }
    }

    #[test]
    fn test_filter_after_sort_wraps() {
        let q = base().sort_by(|n| n.clone()).take(2).filter(|n| n.gt(0i64));
        match q {
            Select::Simple(s) => {
                assert_eq!(s.from.len(), 1);
                assert!(matches!(s.from[0], FromSource::Subquery { .. }));
                assert_eq!(s.wheres.len(), 1);
            }
            _ => panic!("expected wrapped simple"),
        }
    }

    #[test]
    fn test_union_chains_ops() {
        let q = base().union(base()).union_all(base());
        match q {
            Select::Compound(c) => {
                assert_eq!(c.ops.len(), 2);
                assert_eq!(c.ops[0].0, SetOp::Union);
                assert_eq!(c.ops[1].0, SetOp::UnionAll);
            }
            _ => panic!("expected compound"),
        }
    }
}
