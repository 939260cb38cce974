use crate::expr::BitOp;
use crate::fragment::{Fragment, ParamSlot};
use crate::renderer::traits::SqlDialect;

/// HSQLDB generator.
pub struct HsqldbDialect;

impl SqlDialect for HsqldbDialect {
    fn modulo(&self, lhs: Fragment, rhs: Fragment) -> Fragment {
        let mut out = Fragment::lit("MOD(");
        out.append(lhs);
        out.push_sql(", ");
        out.append(rhs);
        out.push_sql(")");
        out
    }

    fn bit_op(&self, op: BitOp, lhs: Fragment, rhs: Fragment) -> Fragment {
        let name = match op {
            BitOp::And => "BITAND",
            BitOp::Or => "BITOR",
            BitOp::Xor => "BITXOR",
        };
        let mut out = Fragment::lit(format!("{}(", name));
        out.append(lhs);
        out.push_sql(", ");
        out.append(rhs);
        out.push_sql(")");
        out
    }

    fn bit_not(&self, expr: Fragment) -> Fragment {
        let mut out = Fragment::lit("BITNOT(");
        out.append(expr);
        out.push_sql(")");
        out
    }

    fn string_agg(&self, arg: Fragment, separator: ParamSlot) -> Fragment {
        let mut out = Fragment::lit("LISTAGG(");
        out.append(arg);
        out.push_sql(", ");
        out.push_param(separator);
        out.push_sql(")");
        out
    }

    /// HSQLDB requires a FROM clause even for bare expression selects.
    fn select_suffix(&self) -> &'static str {
        " FROM (VALUES (0))"
    }
}
