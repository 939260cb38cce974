//! INSERT rendering.

use crate::error::{RelqError, Result};
use crate::fragment::Fragment;
use crate::query::{ConflictActionIr, InsertIr, InsertSourceIr, OnConflictIr};
use crate::renderer::context::{LiveColumns, RenderContext};
use crate::renderer::dml::select::render_select;
use crate::renderer::expr::render_expr;
use crate::renderer::traits::ConflictStyle;
use crate::schema::Assignment;

pub fn render_insert(ir: &InsertIr, ctx: &mut RenderContext) -> Result<Fragment> {
    ctx.bind_unqualified(ir.table_id);

    let mut out = Fragment::lit("INSERT INTO ");
    out.push_sql(ctx.table_name(ir.meta.name));

    match &ir.source {
        InsertSourceIr::Rows(rows) => {
            let columns = row_columns(rows)?;
            push_column_list(&mut out, &columns, ctx);
            out.push_sql(" VALUES ");
            for (i, row) in rows.iter().enumerate() {
                if i > 0 {
                    out.push_sql(", ");
                }
                out.push_sql("(");
                let mut values = Vec::with_capacity(row.len());
                for assign in row {
                    values.push(render_expr(&assign.value, ctx)?);
                }
                out.append(Fragment::join(", ", values));
                out.push_sql(")");
            }
        }
        InsertSourceIr::Batched { columns, rows } => {
            if rows.is_empty() {
                return Err(RelqError::render("insert has no rows"));
            }
            if let Some(bad) = rows.iter().find(|row| row.len() != columns.len()) {
                return Err(RelqError::render(format!(
                    "insert row has {} values for {} columns",
                    bad.len(),
                    columns.len()
                )));
            }
            push_column_list(&mut out, columns, ctx);
            out.push_sql(" VALUES ");
            for (i, row) in rows.iter().enumerate() {
                if i > 0 {
                    out.push_sql(", ");
                }
                out.push_sql("(");
                let mut values = Vec::with_capacity(row.len());
                for value in row {
                    values.push(render_expr(value, ctx)?);
                }
                out.append(Fragment::join(", ", values));
                out.push_sql(")");
            }
        }
        InsertSourceIr::Select { columns, query } => {
            push_column_list(&mut out, columns, ctx);
            out.push_sql(" ");
            out.append(render_select(query, ctx, &LiveColumns::All, false)?);
        }
    }

    if let Some(conflict) = &ir.on_conflict {
        out.append(render_on_conflict(conflict, ir, ctx)?);
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

/// The shared column list of assignment-style rows; every row must assign
/// the same columns in the same order.
fn row_columns(rows: &[Vec<Assignment>]) -> Result<Vec<&'static str>> {
    let first = rows
        .first()
        .ok_or_else(|| RelqError::render("insert has no rows"))?;
    let columns: Vec<&'static str> = first.iter().map(|a| a.column).collect();
    for row in &rows[1..] {
        let row_columns: Vec<&'static str> = row.iter().map(|a| a.column).collect();
        if row_columns != columns {
            return Err(RelqError::render(
                "insert rows assign different column lists",
            ));
        }
    }
    Ok(columns)
}

fn push_column_list(out: &mut Fragment, columns: &[&'static str], ctx: &RenderContext) {
    out.push_sql(" (");
    let names: Vec<String> = columns.iter().map(|c| ctx.column_name(c)).collect();
    out.push_sql(names.join(", "));
    out.push_sql(")");
}

fn render_on_conflict(
    conflict: &OnConflictIr,
    ir: &InsertIr,
    ctx: &mut RenderContext,
) -> Result<Fragment> {
    match ctx.dialect().conflict_style() {
        ConflictStyle::OnConflict => {
            let mut out = Fragment::lit(" ON CONFLICT (");
            let keys: Vec<String> = conflict.keys.iter().map(|k| ctx.column_name(k)).collect();
            out.push_sql(keys.join(", "));
            out.push_sql(")");
            match &conflict.action {
                ConflictActionIr::DoNothing => out.push_sql(" DO NOTHING"),
                ConflictActionIr::DoUpdate(assigns) => {
                    out.push_sql(" DO UPDATE SET ");
                    out.append(render_assignments(assigns, ctx)?);
                }
            }
            Ok(out)
        }
        ConflictStyle::DuplicateKey => {
            let mut out = Fragment::lit(" ON DUPLICATE KEY UPDATE ");
            match &conflict.action {
                ConflictActionIr::DoNothing => {
                    // No DO NOTHING form; the self-assignment idiom makes the
                    // conflicting insert a no-op.
                    let column = conflict
                        .keys
                        .first()
                        .copied()
                        .or_else(|| ir.meta.columns.first().map(|c| c.name))
                        .ok_or_else(|| RelqError::render("table has no columns"))?;
                    let name = ctx.column_name(column);
                    out.push_sql(format!("{} = {}", name, name));
                }
                ConflictActionIr::DoUpdate(assigns) => {
                    out.append(render_assignments(assigns, ctx)?);
                }
            }
            Ok(out)
        }
        ConflictStyle::Unsupported => Err(RelqError::render(
            "this dialect does not support conflict resolution on insert",
        )),
    }
}

fn render_assignments(assigns: &[Assignment], ctx: &mut RenderContext) -> Result<Fragment> {
    let mut rendered = Vec::with_capacity(assigns.len());
    for assign in assigns {
        let mut item = Fragment::raw(ctx.column_name(assign.column));
        item.push_sql(" = ");
        item.append(render_expr(&assign.value, ctx)?);
        rendered.push(item);
    }
    Ok(Fragment::join(", ", rendered))
}
