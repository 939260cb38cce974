use crate::fragment::Fragment;
use crate::renderer::traits::{ConflictStyle, SqlDialect};

/// PostgreSQL generator.
pub struct PostgresDialect;

impl SqlDialect for PostgresDialect {
    fn placeholder(&self, index: usize) -> String {
        format!("${}", index)
    }

    fn ilike(&self, expr: Fragment, pattern: Fragment) -> Fragment {
        let mut out = Fragment::new();
        out.append(expr);
        out.push_sql(" ILIKE ");
        out.append(pattern);
        out
    }

    fn supports_returning(&self) -> bool {
        true
    }

    fn conflict_style(&self) -> ConflictStyle {
        ConflictStyle::OnConflict
    }
}
