//! SELECT rendering.

use crate::error::{RelqError, Result};
use crate::expr::ColumnPath;
use crate::fragment::Fragment;
use crate::query::{
    CompoundSelectIr, FromSource, JoinKind, NullsOrder, OrderByIr, SelectIr, SimpleSelectIr,
    SortDir,
};
use crate::renderer::context::{
    collect_live_columns, elision_allowed, LiveColumns, RenderContext,
};
use crate::renderer::expr::{render_expr, render_predicates};

/// Render a select of either shape.
///
/// `live` is the set of exported columns the enclosing scope references;
/// projection entries outside it are dropped when every compound operator
/// in `ir` tolerates that. `as_subquery` makes ORDER BY prefer the result
/// aliases, which set operations require.
pub fn render_select(
    ir: &SelectIr,
    ctx: &mut RenderContext,
    live: &LiveColumns,
    as_subquery: bool,
) -> Result<Fragment> {
    let elide = elision_allowed(ir);
    match ir {
        SelectIr::Simple(s) => render_simple(s, ctx, live, elide),
        SelectIr::Compound(c) => render_compound(c, ctx, live, elide, as_subquery),
    }
}

fn render_compound(
    c: &CompoundSelectIr,
    ctx: &mut RenderContext,
    live: &LiveColumns,
    elide: bool,
    as_subquery: bool,
) -> Result<Fragment> {
    let mut out = render_simple(&c.lhs, ctx, live, elide)?;
    for (op, side) in &c.ops {
        out.push_sql(format!(" {} ", op));
        out.append(render_simple(side, ctx, live, elide)?);
    }

    if !c.order_by.is_empty() {
        let mut keys = Vec::with_capacity(c.order_by.len());
        for key in &c.order_by {
            keys.push(render_order_key(key, &c.lhs, ctx, !c.ops.is_empty(), as_subquery)?);
        }
        out.push_sql(" ORDER BY ");
        out.append(Fragment::join(", ", keys));
    }

    out.push_sql(ctx.dialect().limit_offset(c.limit, c.offset));
    Ok(out)
}

/// Render one ORDER BY key. Inside a compound or a subquery the key prefers
/// its exported alias, so set operations stay valid and outer scopes can
/// keep referring to the column.
fn render_order_key(
    key: &OrderByIr,
    head: &SimpleSelectIr,
    ctx: &mut RenderContext,
    compound: bool,
    as_subquery: bool,
) -> Result<Fragment> {
    let exported = head
        .projection
        .iter()
        .find(|(_, node)| *node == key.expr)
        .map(|(path, _)| path.alias());

    let base = match exported {
        Some(alias) if compound || as_subquery => Fragment::raw(alias),
        None if compound => {
            return Err(RelqError::render(
                "order-by references a column that the compound select does not export",
            ))
        }
        _ => render_expr(&key.expr, ctx)?,
    };

    let dir = match key.dir {
        Some(SortDir::Asc) => " ASC",
        Some(SortDir::Desc) => " DESC",
        None => "",
    };

    let mut out = Fragment::new();
    match key.nulls {
        Some(nulls) if !ctx.dialect().supports_nulls_ordering() => {
            // `expr IS NULL` sorts non-null rows (0) before null rows (1);
            // DESC flips that, putting nulls first.
            out.append(base.clone());
            out.push_sql(match nulls {
                NullsOrder::First => " IS NULL DESC, ",
                NullsOrder::Last => " IS NULL ASC, ",
            });
            out.append(base);
            out.push_sql(dir);
        }
        Some(nulls) => {
            out.append(base);
            out.push_sql(dir);
            out.push_sql(match nulls {
                NullsOrder::First => " NULLS FIRST",
                NullsOrder::Last => " NULLS LAST",
            });
        }
        None => {
            out.append(base);
            out.push_sql(dir);
        }
    }
    Ok(out)
}

fn render_simple(
    s: &SimpleSelectIr,
    ctx: &mut RenderContext,
    live: &LiveColumns,
    elide: bool,
) -> Result<Fragment> {
    // FULL OUTER on dialects without it: union of the left- and right-join
    // variants, both rendered against fresh aliases.
    if !ctx.dialect().supports_full_outer_join() {
        if let Some(pos) = s.joins.iter().position(|j| j.kind == JoinKind::Full) {
            let mut left = s.clone();
            left.joins[pos].kind = JoinKind::Left;
            let mut right = s.clone();
            right.joins[pos].kind = JoinKind::Right;
            let mut out = render_simple(&left, ctx, live, elide)?;
            out.push_sql(" UNION ");
            out.append(render_simple(&right, ctx, live, elide)?);
            return Ok(out);
        }
    }

    if s.from.is_empty() && !s.joins.is_empty() {
        return Err(RelqError::render("join without a leading from-source"));
    }

    // Aliases for every source in this scope, before anything renders.
    let mut from_aliases = Vec::with_capacity(s.from.len());
    for source in &s.from {
        from_aliases.push(ctx.assign_alias(source));
    }
    let mut join_aliases = Vec::with_capacity(s.joins.len());
    for join in &s.joins {
        join_aliases.push(ctx.assign_alias(&join.source));
    }

    let nested_live = collect_live_columns(s);

    // Projection, pruned to the live set where the shape permits.
    let kept: Vec<&(ColumnPath, crate::expr::ExprNode)> = if elide {
        s.projection
            .iter()
            .filter(|(path, _)| live.contains(path))
            .collect()
    } else {
        s.projection.iter().collect()
    };
    let mut columns = Vec::with_capacity(kept.len().max(1));
    if kept.is_empty() {
        // Everything was pruned (an aggregate-only outer query); keep the
        // select well-formed.
        columns.push(Fragment::raw("1 AS res"));
    } else {
        for (path, node) in kept {
            let mut column = render_expr(node, ctx)?;
            column.push_sql(format!(" AS {}", path.alias()));
            columns.push(column);
        }
    }

    let mut out = Fragment::lit(if s.distinct {
        "SELECT DISTINCT "
    } else {
        "SELECT "
    });
    out.append(Fragment::join(", ", columns));

    if s.from.is_empty() {
        out.push_sql(ctx.dialect().select_suffix());
    } else {
        out.push_sql(" FROM ");
        let mut sources = Vec::with_capacity(s.from.len());
        for (source, alias) in s.from.iter().zip(&from_aliases) {
            sources.push(render_source(source, alias, ctx, &nested_live)?);
        }
        out.append(Fragment::join(", ", sources));
    }

    for (join, alias) in s.joins.iter().zip(&join_aliases) {
        out.push_sql(format!(" {} ", join.kind));
        out.append(render_source(&join.source, alias, ctx, &nested_live)?);
        if let Some(on) = &join.on {
            out.push_sql(" ON ");
            out.append(render_expr(on, ctx)?);
        }
    }

    if !s.wheres.is_empty() {
        out.push_sql(" WHERE ");
        out.append(render_predicates(&s.wheres, ctx)?);
    }

    if let Some(group) = &s.group_by {
        let mut keys = Vec::with_capacity(group.keys.len());
        for key in &group.keys {
            keys.push(render_expr(key, ctx)?);
        }
        out.push_sql(" GROUP BY ");
        out.append(Fragment::join(", ", keys));

        if !group.having.is_empty() {
            out.push_sql(" HAVING ");
            out.append(render_predicates(&group.having, ctx)?);
        }
    }

    Ok(out)
}

fn render_source(
    source: &FromSource,
    alias: &str,
    ctx: &mut RenderContext,
    nested_live: &std::collections::HashMap<crate::expr::FromId, LiveColumns>,
) -> Result<Fragment> {
    match source {
        FromSource::Table { meta, .. } => {
            Ok(Fragment::raw(format!("{} {}", ctx.table_name(meta.name), alias)))
        }
        FromSource::Subquery { id, query } => {
            let live = nested_live.get(id).cloned().unwrap_or(LiveColumns::All);
            let mut out = Fragment::lit("(");
            out.append(render_select(query, ctx, &live, true)?);
            out.push_sql(format!(") {}", alias));
            Ok(out)
        }
        FromSource::Values { column, rows, .. } => {
            if rows.is_empty() {
                return Err(RelqError::render("values table has no rows"));
            }
            let mut out = Fragment::lit("(VALUES ");
            for (i, slot) in rows.iter().enumerate() {
                if i > 0 {
                    out.push_sql(", ");
                }
                out.push_sql("(");
                out.push_param(slot.clone());
                out.push_sql(")");
            }
            out.push_sql(format!(") {} ({})", alias, column));
            Ok(out)
        }
    }
}
