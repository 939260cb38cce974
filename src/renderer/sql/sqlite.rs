use crate::fragment::{Fragment, ParamSlot};
use crate::renderer::traits::{ConflictStyle, SqlDialect};

/// SQLite generator.
pub struct SqliteDialect;

impl SqlDialect for SqliteDialect {
    fn str_pos(&self, needle: Fragment, haystack: Fragment) -> Fragment {
        let mut out = Fragment::lit("INSTR(");
        out.append(haystack);
        out.push_sql(", ");
        out.append(needle);
        out.push_sql(")");
        out
    }

    fn string_agg(&self, arg: Fragment, separator: ParamSlot) -> Fragment {
        let mut out = Fragment::lit("GROUP_CONCAT(");
        out.append(arg);
        out.push_sql(", ");
        out.push_param(separator);
        out.push_sql(")");
        out
    }

    fn limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> String {
        // OFFSET requires a LIMIT; -1 means unbounded.
        match (limit, offset) {
            (None, Some(off)) => format!(" LIMIT -1 OFFSET {}", off),
            (Some(n), Some(off)) => format!(" LIMIT {} OFFSET {}", n, off),
            (Some(n), None) => format!(" LIMIT {}", n),
            (None, None) => String::new(),
        }
    }

    fn supports_full_outer_join(&self) -> bool {
        false
    }

    fn supports_returning(&self) -> bool {
        true
    }

    fn conflict_style(&self) -> ConflictStyle {
        ConflictStyle::OnConflict
    }
}
