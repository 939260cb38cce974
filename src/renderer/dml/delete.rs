//! DELETE rendering.

use crate::error::{RelqError, Result};
use crate::fragment::Fragment;
use crate::query::DeleteIr;
use crate::renderer::context::RenderContext;
use crate::renderer::expr::{render_expr, render_predicates};

pub fn render_delete(ir: &DeleteIr, ctx: &mut RenderContext) -> Result<Fragment> {
    ctx.bind_unqualified(ir.table_id);

    let mut out = Fragment::lit("DELETE FROM ");
    out.push_sql(ctx.table_name(ir.meta.name));

    if !ir.wheres.is_empty() {
        out.push_sql(" WHERE ");
        out.append(render_predicates(&ir.wheres, ctx)?);
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
