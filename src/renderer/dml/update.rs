//! UPDATE rendering.

use crate::error::{RelqError, Result};
use crate::fragment::Fragment;
use crate::query::UpdateIr;
use crate::renderer::context::{LiveColumns, RenderContext};
use crate::renderer::dml::select::render_select;
use crate::renderer::expr::{render_expr, render_predicates};
use crate::renderer::traits::UpdateJoinStyle;
use crate::query::FromSource;

pub fn render_update(ir: &UpdateIr, ctx: &mut RenderContext) -> Result<Fragment> {
    if ir.assigns.is_empty() {
        return Err(RelqError::render("update has no assignments"));
    }

    // Only a joined update needs its columns qualified; the bare form keeps
    // RETURNING and WHERE portable.
    if ir.joins.is_empty() {
        ctx.bind_unqualified(ir.table_id);
    } else {
        ctx.bind_table_qualified(ir.table_id, ir.meta.name);
    }
    let table = ctx.table_name(ir.meta.name);

    let style = ctx.dialect().update_join_style();
    let qualify_set = ctx.dialect().qualify_update_set() && !ir.joins.is_empty();

    // Aliases for joined sources, before any expression renders.
    let mut join_aliases = Vec::with_capacity(ir.joins.len());
    for join in &ir.joins {
        join_aliases.push(ctx.assign_alias(&join.source));
    }

    let mut out = Fragment::lit("UPDATE ");
    out.push_sql(table.clone());

    // MySQL folds the joins between the table and SET.
    if style == UpdateJoinStyle::JoinClause {
        for (join, alias) in ir.joins.iter().zip(&join_aliases) {
            out.push_sql(format!(" {} ", join.kind));
            out.append(render_join_source(&join.source, alias, ctx)?);
            if let Some(on) = &join.on {
                out.push_sql(" ON ");
                out.append(render_expr(on, ctx)?);
            }
        }
    }

    out.push_sql(" SET ");
    let mut assigns = Vec::with_capacity(ir.assigns.len());
    for assign in &ir.assigns {
        let column = ctx.column_name(assign.column);
        let mut item = if qualify_set {
            Fragment::raw(format!("{}.{}", table, column))
        } else {
            Fragment::raw(column)
        };
        item.push_sql(" = ");
        item.append(render_expr(&assign.value, ctx)?);
        assigns.push(item);
    }
    out.append(Fragment::join(", ", assigns));

    // ANSI / Postgres style: joined sources move into FROM, the first ON
    // folds into WHERE.
    let mut preds = ir.wheres.clone();
    if style == UpdateJoinStyle::FromClause && !ir.joins.is_empty() {
        out.push_sql(" FROM ");
        for (i, (join, alias)) in ir.joins.iter().zip(&join_aliases).enumerate() {
            if i == 0 {
                out.append(render_join_source(&join.source, alias, ctx)?);
                if let Some(on) = &join.on {
                    preds.push(on.clone());
                }
            } else {
                out.push_sql(format!(" {} ", join.kind));
                out.append(render_join_source(&join.source, alias, ctx)?);
                if let Some(on) = &join.on {
                    out.push_sql(" ON ");
                    out.append(render_expr(on, ctx)?);
                }
            }
        }
    }

    if !preds.is_empty() {
        out.push_sql(" WHERE ");
        out.append(render_predicates(&preds, ctx)?);
    }

    if let Some(returning) = &ir.returning {
        if !ctx.dialect().supports_returning() {
            return Err(RelqError::render(
                "this dialect does not support RETURNING",
            ));
        }
        out.push_sql(" RETURNING ");
        let mut columns = Vec::with_capacity(returning.len());
        for (path, node) in returning {
            let mut column = render_expr(node, ctx)?;
            column.push_sql(format!(" AS {}", path.alias()));
            columns.push(column);
        }
        out.append(Fragment::join(", ", columns));
    }

    out.mark_complete();
    Ok(out)
}

fn render_join_source(
    source: &FromSource,
    alias: &str,
    ctx: &mut RenderContext,
) -> Result<Fragment> {
    match source {
        FromSource::Table { meta, .. } => {
            Ok(Fragment::raw(format!("{} {}", ctx.table_name(meta.name), alias)))
        }
        FromSource::Subquery { query, .. } => {
            let mut out = Fragment::lit("(");
            out.append(render_select(query, ctx, &LiveColumns::All, true)?);
            out.push_sql(format!(") {}", alias));
            Ok(out)
        }
        FromSource::Values { .. } => Err(RelqError::render(
            "values tables cannot be joined into an update",
        )),
    }
}
