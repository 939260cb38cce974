use crate::expr::BitOp;
use crate::fragment::{Fragment, ParamSlot};
use crate::renderer::traits::SqlDialect;

/// H2 generator.
pub struct H2Dialect;

impl SqlDialect for H2Dialect {
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
}
