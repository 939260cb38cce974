//! Expression rendering: [`ExprNode`] to [`Fragment`] through the context.

use crate::error::Result;
use crate::expr::{AggFunc, BinaryOp, ExprNode, UnaryOp};
use crate::fragment::Fragment;
use crate::renderer::context::{LiveColumns, RenderContext};
use crate::renderer::dml::select::render_select;

/// Whether a node's rendering delimits itself (atoms, function forms, and
/// operators that emit their own parentheses).
fn self_delimiting(node: &ExprNode) -> bool {
    match node {
        ExprNode::Column { .. }
        | ExprNode::SubqueryColumn { .. }
        | ExprNode::Literal(_)
        | ExprNode::Raw(_)
        | ExprNode::Call { .. }
        | ExprNode::Cast { .. }
        | ExprNode::Case { .. }
        | ExprNode::Aggregate { .. }
        | ExprNode::ScalarSubquery { .. }
        | ExprNode::Exists { .. }
        | ExprNode::Concat { .. }
        | ExprNode::Modulo { .. }
        | ExprNode::Bit { .. }
        | ExprNode::BitNot { .. }
        | ExprNode::StrPos { .. } => true,
        ExprNode::Binary { op, .. } => op.grouped(),
        _ => false,
    }
}

fn wrapped(inner: Fragment) -> Fragment {
    let mut out = Fragment::lit("(");
    out.append(inner);
    out.push_sql(")");
    out
}

/// Render as an operand of a binary form. Comparisons bind tighter than the
/// connectives, so only the null-safe expansion needs forced grouping.
fn render_operand(node: &ExprNode, ctx: &mut RenderContext) -> Result<Fragment> {
    let inner = render_expr(node, ctx)?;
    if matches!(node, ExprNode::NullSafeEq { .. }) {
        Ok(wrapped(inner))
    } else {
        Ok(inner)
    }
}

/// Render as the operand of a unary operator, where anything that does not
/// delimit itself gets parentheses.
fn render_unary_operand(node: &ExprNode, ctx: &mut RenderContext) -> Result<Fragment> {
    let inner = render_expr(node, ctx)?;
    if self_delimiting(node) {
        Ok(inner)
    } else {
        Ok(wrapped(inner))
    }
}

/// Render a predicate list joined by AND. A single predicate renders bare;
/// with several, any predicate that would re-associate under the AND gets
/// parentheses.
pub fn render_predicates(preds: &[ExprNode], ctx: &mut RenderContext) -> Result<Fragment> {
    if let [single] = preds {
        return render_expr(single, ctx);
    }
    let mut rendered = Vec::with_capacity(preds.len());
    for pred in preds {
        rendered.push(render_operand(pred, ctx)?);
    }
    Ok(Fragment::join(" AND ", rendered))
}

pub fn render_expr(node: &ExprNode, ctx: &mut RenderContext) -> Result<Fragment> {
    match node {
        ExprNode::Column { table, name } => Ok(Fragment::raw(ctx.column_ref(*table, name)?)),
        ExprNode::SubqueryColumn { source, path } => {
            Ok(Fragment::raw(ctx.subquery_column_ref(*source, path)?))
        }
        ExprNode::Literal(slot) => Ok(Fragment::param(slot.clone())),
        ExprNode::Raw(text) => Ok(Fragment::raw(*text)),
        ExprNode::Unary { op, expr } => {
            let operand = render_unary_operand(expr, ctx)?;
            let mut out = Fragment::new();
            match op {
                UnaryOp::Not => {
                    out.push_sql("NOT ");
                    out.append(operand);
                }
                UnaryOp::Neg => {
                    out.push_sql("-");
                    out.append(operand);
                }
                UnaryOp::Plus => {
                    out.push_sql("+");
                    out.append(operand);
                }
                UnaryOp::IsNull => {
                    out.append(operand);
                    out.push_sql(" IS NULL");
                }
                UnaryOp::IsNotNull => {
                    out.append(operand);
                    out.push_sql(" IS NOT NULL");
                }
            }
            Ok(out)
        }
        ExprNode::Binary { op, lhs, rhs } => {
            let left = render_operand(lhs, ctx)?;
            let right = render_operand(rhs, ctx)?;
            let mut out = Fragment::new();
            if op.grouped() {
                out.push_sql("(");
            }
            out.append(left);
            out.push_sql(format!(" {} ", render_binary_op(*op)));
            out.append(right);
            if op.grouped() {
                out.push_sql(")");
            }
            Ok(out)
        }
        // Dialect-routed operations take bare operand renderings; the
        // dialect method supplies whatever grouping its spelling needs.
        ExprNode::Concat { lhs, rhs } => {
            let left = render_expr(lhs, ctx)?;
            let right = render_expr(rhs, ctx)?;
            Ok(ctx.dialect().concat(left, right))
        }
        ExprNode::Modulo { lhs, rhs } => {
            let left = render_expr(lhs, ctx)?;
            let right = render_expr(rhs, ctx)?;
            Ok(ctx.dialect().modulo(left, right))
        }
        ExprNode::Bit { op, lhs, rhs } => {
            let left = render_expr(lhs, ctx)?;
            let right = render_expr(rhs, ctx)?;
            Ok(ctx.dialect().bit_op(*op, left, right))
        }
        ExprNode::BitNot { expr } => {
            let operand = render_expr(expr, ctx)?;
            Ok(ctx.dialect().bit_not(operand))
        }
        ExprNode::NullSafeEq { lhs, rhs, negated } => {
            let left = render_expr(lhs, ctx)?;
            let right = render_expr(rhs, ctx)?;
            Ok(ctx.dialect().null_safe_eq(left, right, *negated))
        }
        ExprNode::Like {
            expr,
            pattern,
            case_insensitive,
        } => {
            let subject = render_operand(expr, ctx)?;
            let pat = render_operand(pattern, ctx)?;
            if *case_insensitive {
                Ok(ctx.dialect().ilike(subject, pat))
            } else {
                let mut out = Fragment::new();
                out.append(subject);
                out.push_sql(" LIKE ");
                out.append(pat);
                Ok(out)
            }
        }
        ExprNode::StrPos { needle, haystack } => {
            let n = render_operand(needle, ctx)?;
            let h = render_operand(haystack, ctx)?;
            Ok(ctx.dialect().str_pos(n, h))
        }
        ExprNode::Call { name, args } => {
            let mut rendered = Vec::with_capacity(args.len());
            for arg in args {
                rendered.push(render_expr(arg, ctx)?);
            }
            let mut out = Fragment::lit(format!("{}(", name));
            out.append(Fragment::join(", ", rendered));
            out.push_sql(")");
            Ok(out)
        }
        ExprNode::Cast { expr, code } => {
            let inner = render_expr(expr, ctx)?;
            let mut out = Fragment::lit("CAST(");
            out.append(inner);
            out.push_sql(format!(" AS {})", ctx.dialect().cast_type(*code)));
            Ok(out)
        }
        ExprNode::Between { expr, lo, hi } => {
            let mut out = Fragment::new();
            out.append(render_operand(expr, ctx)?);
            out.push_sql(" BETWEEN ");
            out.append(render_operand(lo, ctx)?);
            out.push_sql(" AND ");
            out.append(render_operand(hi, ctx)?);
            Ok(out)
        }
        ExprNode::InValues {
            expr,
            list,
            negated,
        } => {
            if list.is_empty() {
                // Empty lists are constant: nothing is IN, everything is
                // NOT IN.
                return Ok(Fragment::raw(ctx.dialect().bool_literal(*negated)));
            }
            let mut out = Fragment::new();
            out.append(render_operand(expr, ctx)?);
            out.push_sql(if *negated { " NOT IN (" } else { " IN (" });
            let mut rendered = Vec::with_capacity(list.len());
            for item in list {
                rendered.push(render_expr(item, ctx)?);
            }
            out.append(Fragment::join(", ", rendered));
            out.push_sql(")");
            Ok(out)
        }
        ExprNode::InSubquery {
            expr,
            query,
            negated,
        } => {
            let mut out = Fragment::new();
            out.append(render_operand(expr, ctx)?);
            out.push_sql(if *negated { " NOT IN (" } else { " IN (" });
            out.append(render_select(query, ctx, &LiveColumns::All, true)?);
            out.push_sql(")");
            Ok(out)
        }
        ExprNode::Exists { query } => {
            let mut out = Fragment::lit("EXISTS (");
            out.append(render_select(query, ctx, &LiveColumns::All, true)?);
            out.push_sql(")");
            Ok(out)
        }
        ExprNode::ScalarSubquery { query } => {
            let mut out = Fragment::lit("(");
            out.append(render_select(query, ctx, &LiveColumns::All, true)?);
            out.push_sql(")");
            Ok(out)
        }
        ExprNode::Case {
            branches,
            otherwise,
        } => {
            let mut out = Fragment::lit("CASE");
            for (cond, value) in branches {
                out.push_sql(" WHEN ");
                out.append(render_expr(cond, ctx)?);
                out.push_sql(" THEN ");
                out.append(render_expr(value, ctx)?);
            }
            if let Some(value) = otherwise {
                out.push_sql(" ELSE ");
                out.append(render_expr(value, ctx)?);
            }
            out.push_sql(" END");
            Ok(out)
        }
        ExprNode::Aggregate {
            func,
            arg,
            distinct,
            separator,
        } => {
            let rendered = match arg {
                Some(a) => render_expr(a, ctx)?,
                None => Fragment::raw("1"),
            };
            if let AggFunc::StringAgg = func {
                let sep = separator.clone().unwrap_or_else(|| {
                    crate::fragment::ParamSlot::new(
                        crate::types::SqlValue::Text(String::new()),
                        crate::types::TypeCode::Varchar,
                    )
                });
                return Ok(ctx.dialect().string_agg(rendered, sep));
            }
            let mut out = Fragment::lit(format!("{}(", func));
            if *distinct {
                out.push_sql("DISTINCT ");
            }
            out.append(rendered);
            out.push_sql(")");
            Ok(out)
        }
    }
}

fn render_binary_op(op: BinaryOp) -> String {
    op.to_string()
}
