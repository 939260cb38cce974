//! Dialect trait and identifier escaping.
//!
//! Default method bodies target ANSI SQL; each dialect struct in
//! [`sql`](crate::renderer::sql) overrides only its divergences.

use crate::expr::BitOp;
use crate::fragment::{Fragment, ParamSlot};
use crate::types::TypeCode;

/// SQL reserved words that must be quoted when used as identifiers.
pub const RESERVED_WORDS: &[&str] = &[
    "all", "and", "as", "asc", "between", "by", "case", "check", "column", "constraint", "create",
    "cross", "default", "delete", "desc", "distinct", "drop", "else", "end", "except", "exists",
    "false", "from", "full", "group", "having", "in", "index", "inner", "insert", "intersect",
    "into", "is", "join", "key", "left", "like", "limit", "not", "null", "offset", "on", "or",
    "order", "outer", "primary", "references", "right", "select", "set", "table", "then", "true",
    "union", "update", "user", "values", "when", "where",
];

/// Quote an identifier with double quotes if it is a reserved word, starts
/// with a digit, or contains characters outside `[A-Za-z0-9_]`. Dotted
/// identifiers are quoted per part.
pub fn escape_identifier(name: &str) -> String {
    if name.contains('.') {
        return name
            .split('.')
            .map(escape_single_identifier)
            .collect::<Vec<_>>()
            .join(".");
    }
    escape_single_identifier(name)
}

fn escape_single_identifier(name: &str) -> String {
    let lower = name.to_lowercase();
    let needs_escaping = RESERVED_WORDS.contains(&lower.as_str())
        || name.chars().any(|c| !c.is_alphanumeric() && c != '_')
        || name.chars().next().map(|c| c.is_numeric()).unwrap_or(false);

    if needs_escaping {
        format!("\"{}\"", name.replace('"', "\"\""))
    } else {
        name.to_string()
    }
}

/// How a dialect spells conflict resolution on INSERT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictStyle {
    /// `ON CONFLICT (keys) DO NOTHING / DO UPDATE SET …`
    OnConflict,
    /// `ON DUPLICATE KEY UPDATE …`, no key list.
    DuplicateKey,
    Unsupported,
}

/// Where a dialect puts the joined sources of a multi-table UPDATE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateJoinStyle {
    /// `UPDATE t SET … FROM a JOIN b … WHERE …`
    FromClause,
    /// `UPDATE t JOIN a … SET … WHERE …`
    JoinClause,
}

/// Dialect-specific SQL generation. Defaults are ANSI.
pub trait SqlDialect {
    /// Placeholder marker for the 1-based parameter index.
    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    /// Quote a table or column identifier.
    fn quote_identifier(&self, name: &str) -> String {
        escape_identifier(name)
    }

    /// Constant boolean literal.
    fn bool_literal(&self, value: bool) -> &'static str {
        if value {
            "TRUE"
        } else {
            "FALSE"
        }
    }

    /// String concatenation of two rendered operands.
    fn concat(&self, lhs: Fragment, rhs: Fragment) -> Fragment {
        let mut out = Fragment::lit("(");
        out.append(lhs);
        out.push_sql(" || ");
        out.append(rhs);
        out.push_sql(")");
        out
    }

    /// Integer modulo of two rendered operands.
    fn modulo(&self, lhs: Fragment, rhs: Fragment) -> Fragment {
        let mut out = Fragment::lit("(");
        out.append(lhs);
        out.push_sql(" % ");
        out.append(rhs);
        out.push_sql(")");
        out
    }

    /// Binary bitwise operation of two rendered operands.
    fn bit_op(&self, op: BitOp, lhs: Fragment, rhs: Fragment) -> Fragment {
        let sym = match op {
            BitOp::And => " & ",
            BitOp::Or => " | ",
            BitOp::Xor => " ^ ",
        };
        let mut out = Fragment::lit("(");
        out.append(lhs);
        out.push_sql(sym);
        out.append(rhs);
        out.push_sql(")");
        out
    }

    /// Bitwise complement.
    fn bit_not(&self, expr: Fragment) -> Fragment {
        let mut out = Fragment::lit("~(");
        out.append(expr);
        out.push_sql(")");
        out
    }

    /// Null-safe equality of two rendered operands. The generic expansion
    /// renders each operand twice, so parameters inside them bind twice.
    fn null_safe_eq(&self, lhs: Fragment, rhs: Fragment, negated: bool) -> Fragment {
        let mut out = Fragment::new();
        if negated {
            out.push_sql("NOT (");
        }
        out.push_sql("(");
        out.append(lhs.clone());
        out.push_sql(" IS NULL AND ");
        out.append(rhs.clone());
        out.push_sql(" IS NULL) OR ");
        out.append(lhs);
        out.push_sql(" = ");
        out.append(rhs);
        if negated {
            out.push_sql(")");
        }
        out
    }

    /// Case-insensitive LIKE.
    fn ilike(&self, expr: Fragment, pattern: Fragment) -> Fragment {
        let mut out = Fragment::lit("LOWER(");
        out.append(expr);
        out.push_sql(") LIKE LOWER(");
        out.append(pattern);
        out.push_sql(")");
        out
    }

    /// 1-based substring position.
    fn str_pos(&self, needle: Fragment, haystack: Fragment) -> Fragment {
        let mut out = Fragment::lit("POSITION(");
        out.append(needle);
        out.push_sql(" IN ");
        out.append(haystack);
        out.push_sql(")");
        out
    }

    /// String aggregation with a bound separator.
    fn string_agg(&self, arg: Fragment, separator: ParamSlot) -> Fragment {
        let mut out = Fragment::lit("STRING_AGG(");
        out.append(arg);
        out.push_sql(", ");
        out.push_param(separator);
        out.push_sql(")");
        out
    }

    /// Target keyword for `CAST(x AS …)`.
    fn cast_type(&self, code: TypeCode) -> &'static str {
        match code {
            TypeCode::Boolean => "BOOLEAN",
            TypeCode::SmallInt => "SMALLINT",
            TypeCode::Integer => "INTEGER",
            TypeCode::BigInt => "BIGINT",
            TypeCode::Real => "REAL",
            TypeCode::Double => "DOUBLE PRECISION",
            TypeCode::Varchar => "VARCHAR",
            TypeCode::Date => "DATE",
            TypeCode::Timestamp => "TIMESTAMP",
            TypeCode::TimestampTz => "TIMESTAMP WITH TIME ZONE",
            TypeCode::Uuid => "UUID",
            TypeCode::Binary => "VARBINARY",
        }
    }

    /// LIMIT / OFFSET tail, starting with a leading space when non-empty.
    fn limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> String {
        let mut sql = String::new();
        if let Some(n) = limit {
            sql.push_str(&format!(" LIMIT {}", n));
        }
        if let Some(n) = offset {
            sql.push_str(&format!(" OFFSET {}", n));
        }
        sql
    }

    /// Whether `NULLS FIRST / NULLS LAST` is accepted in ORDER BY.
    fn supports_nulls_ordering(&self) -> bool {
        true
    }

    /// Whether FULL OUTER JOIN is accepted; emulated via
    /// `LEFT JOIN … UNION … RIGHT JOIN …` otherwise.
    fn supports_full_outer_join(&self) -> bool {
        true
    }

    /// Whether INSERT/UPDATE/DELETE accept a RETURNING clause.
    fn supports_returning(&self) -> bool {
        false
    }

    fn conflict_style(&self) -> ConflictStyle {
        ConflictStyle::Unsupported
    }

    fn update_join_style(&self) -> UpdateJoinStyle {
        UpdateJoinStyle::FromClause
    }

    /// Whether SET columns of a joined UPDATE are table-qualified.
    fn qualify_update_set(&self) -> bool {
        false
    }

    /// Tail appended to a SELECT without a FROM clause.
    fn select_suffix(&self) -> &'static str {
        ""
    }
}
