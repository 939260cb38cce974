use crate::fragment::{Fragment, ParamSlot};
use crate::renderer::traits::{ConflictStyle, SqlDialect, UpdateJoinStyle};
use crate::types::TypeCode;

/// MySQL generator.
pub struct MysqlDialect;

impl SqlDialect for MysqlDialect {
    fn quote_identifier(&self, name: &str) -> String {
        format!("`{}`", name.replace('`', "``"))
    }

    fn bool_literal(&self, value: bool) -> &'static str {
        if value {
            "1"
        } else {
            "0"
        }
    }

    fn concat(&self, lhs: Fragment, rhs: Fragment) -> Fragment {
        let mut out = Fragment::lit("CONCAT(");
        out.append(lhs);
        out.push_sql(", ");
        out.append(rhs);
        out.push_sql(")");
        out
    }

    fn null_safe_eq(&self, lhs: Fragment, rhs: Fragment, negated: bool) -> Fragment {
        let mut out = Fragment::new();
        if negated {
            out.push_sql("NOT (");
        }
        out.append(lhs);
        out.push_sql(" <=> ");
        out.append(rhs);
        if negated {
            out.push_sql(")");
        }
        out
    }

    fn string_agg(&self, arg: Fragment, separator: ParamSlot) -> Fragment {
        let mut out = Fragment::lit("GROUP_CONCAT(");
        out.append(arg);
        out.push_sql(" SEPARATOR ");
        out.push_param(separator);
        out.push_sql(")");
        out
    }

    fn cast_type(&self, code: TypeCode) -> &'static str {
        match code {
            TypeCode::Boolean
            | TypeCode::SmallInt
            | TypeCode::Integer
            | TypeCode::BigInt => "SIGNED",
            TypeCode::Real | TypeCode::Double => "DOUBLE",
            TypeCode::Varchar | TypeCode::Uuid => "CHAR",
            TypeCode::Date => "DATE",
            TypeCode::Timestamp | TypeCode::TimestampTz => "DATETIME",
            TypeCode::Binary => "BINARY",
        }
    }

    fn limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> String {
        // OFFSET requires a LIMIT; the huge literal is the documented idiom.
        match (limit, offset) {
            (None, Some(off)) => format!(" LIMIT 18446744073709551615 OFFSET {}", off),
            (Some(n), Some(off)) => format!(" LIMIT {} OFFSET {}", n, off),
            (Some(n), None) => format!(" LIMIT {}", n),
            (None, None) => String::new(),
        }
    }

    fn supports_nulls_ordering(&self) -> bool {
        false
    }

    fn supports_full_outer_join(&self) -> bool {
        false
    }

    fn conflict_style(&self) -> ConflictStyle {
        ConflictStyle::DuplicateKey
    }

    fn update_join_style(&self) -> UpdateJoinStyle {
        UpdateJoinStyle::JoinClause
    }

    fn qualify_update_set(&self) -> bool {
        true
    }
}
