//! Scalar type mapping between Rust values and SQL.
//!
//! Every scalar that can appear in a query carries a [`TypeCode`] (the
//! JDBC-style wire code used when binding and reading), a cast keyword used
//! by `CAST(x AS …)`, and conversions to and from the dynamic [`SqlValue`]
//! that travels through the driver contract.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JDBC-style type code attached to parameter slots and result columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeCode {
    Boolean,
    SmallInt,
    Integer,
    BigInt,
    Real,
    Double,
    Varchar,
    Date,
    Timestamp,
    TimestampTz,
    Uuid,
    Binary,
}

impl std::fmt::Display for TypeCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
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
            TypeCode::Binary => "BINARY",
        };
        write!(f, "{}", name)
    }
}

/// A dynamic value crossing the driver boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SqlValue {
    /// NULL value
    Null,
    /// Boolean
    Bool(bool),
    /// Integer (all integral widths travel as i64)
    Int(i64),
    /// Float
    Float(f64),
    /// String
    Text(String),
    /// Raw bytes
    Bytes(Vec<u8>),
    /// Calendar date
    Date(NaiveDate),
    /// Timestamp without zone
    DateTime(NaiveDateTime),
    /// Timestamp with zone, normalized to UTC
    TimestampTz(DateTime<Utc>),
    /// UUID value
    Uuid(Uuid),
}

impl SqlValue {
    /// Whether this value is SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Short tag used in decode error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            SqlValue::Null => "NULL",
            SqlValue::Bool(_) => "BOOLEAN",
            SqlValue::Int(_) => "INTEGER",
            SqlValue::Float(_) => "FLOAT",
            SqlValue::Text(_) => "TEXT",
            SqlValue::Bytes(_) => "BYTES",
            SqlValue::Date(_) => "DATE",
            SqlValue::DateTime(_) => "TIMESTAMP",
            SqlValue::TimestampTz(_) => "TIMESTAMPTZ",
            SqlValue::Uuid(_) => "UUID",
        }
    }
}

impl std::fmt::Display for SqlValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlValue::Null => write!(f, "NULL"),
            SqlValue::Bool(b) => write!(f, "{}", b),
            SqlValue::Int(n) => write!(f, "{}", n),
            SqlValue::Float(n) => write!(f, "{}", n),
            SqlValue::Text(s) => write!(f, "'{}'", s),
            SqlValue::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            SqlValue::Date(d) => write!(f, "'{}'", d),
            SqlValue::DateTime(t) => write!(f, "'{}'", t),
            SqlValue::TimestampTz(t) => write!(f, "'{}'", t.to_rfc3339()),
            SqlValue::Uuid(u) => write!(f, "'{}'", u),
        }
    }
}

/// Mapping between a Rust scalar and its SQL representation.
///
/// `from_value` returns `None` when the dynamic value cannot be read as
/// `Self`; the caller attaches the offending column path.
pub trait SqlType: Clone + Send + Sync + 'static {
    const TYPE_CODE: TypeCode;
    /// Keyword used as the target of `CAST(x AS …)` on ANSI dialects.
    const CAST_TYPE: &'static str;

    fn to_value(&self) -> SqlValue;
    fn from_value(value: &SqlValue) -> Option<Self>;
}

/// Marker for types supporting `+ - * /` and the numeric functions.
pub trait SqlNumeric: SqlType {}

/// Marker for integer types supporting `%` and bitwise operations.
pub trait SqlIntegral: SqlNumeric {}

impl SqlType for bool {
    const TYPE_CODE: TypeCode = TypeCode::Boolean;
    const CAST_TYPE: &'static str = "BOOLEAN";

    fn to_value(&self) -> SqlValue {
        SqlValue::Bool(*self)
    }

    fn from_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Bool(b) => Some(*b),
            SqlValue::Int(n) => Some(*n != 0),
            _ => None,
        }
    }
}

macro_rules! impl_sql_int {
    ($t:ty, $code:expr, $cast:literal) => {
        impl SqlType for $t {
            const TYPE_CODE: TypeCode = $code;
            const CAST_TYPE: &'static str = $cast;

            fn to_value(&self) -> SqlValue {
                SqlValue::Int(*self as i64)
            }

            fn from_value(value: &SqlValue) -> Option<Self> {
                match value {
                    SqlValue::Int(n) => <$t>::try_from(*n).ok(),
                    _ => None,
                }
            }
        }

        impl SqlNumeric for $t {}
        impl SqlIntegral for $t {}
    };
}

impl_sql_int!(i16, TypeCode::SmallInt, "SMALLINT");
impl_sql_int!(i32, TypeCode::Integer, "INTEGER");
impl_sql_int!(i64, TypeCode::BigInt, "BIGINT");

macro_rules! impl_sql_float {
    ($t:ty, $code:expr, $cast:literal) => {
        impl SqlType for $t {
            const TYPE_CODE: TypeCode = $code;
            const CAST_TYPE: &'static str = $cast;

            fn to_value(&self) -> SqlValue {
                SqlValue::Float(*self as f64)
            }

            fn from_value(value: &SqlValue) -> Option<Self> {
                match value {
                    SqlValue::Float(n) => Some(*n as $t),
                    SqlValue::Int(n) => Some(*n as $t),
                    _ => None,
                }
            }
        }

        impl SqlNumeric for $t {}
    };
}

impl_sql_float!(f32, TypeCode::Real, "REAL");
impl_sql_float!(f64, TypeCode::Double, "DOUBLE PRECISION");

impl SqlType for String {
    const TYPE_CODE: TypeCode = TypeCode::Varchar;
    const CAST_TYPE: &'static str = "VARCHAR";

    fn to_value(&self) -> SqlValue {
        SqlValue::Text(self.clone())
    }

    fn from_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Text(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl SqlType for Vec<u8> {
    const TYPE_CODE: TypeCode = TypeCode::Binary;
    const CAST_TYPE: &'static str = "VARBINARY";

    fn to_value(&self) -> SqlValue {
        SqlValue::Bytes(self.clone())
    }

    fn from_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Bytes(b) => Some(b.clone()),
            _ => None,
        }
    }
}

impl SqlType for NaiveDate {
    const TYPE_CODE: TypeCode = TypeCode::Date;
    const CAST_TYPE: &'static str = "DATE";

    fn to_value(&self) -> SqlValue {
        SqlValue::Date(*self)
    }

    fn from_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Date(d) => Some(*d),
            SqlValue::Text(s) => s.parse().ok(),
            _ => None,
        }
    }
}

impl SqlType for NaiveDateTime {
    const TYPE_CODE: TypeCode = TypeCode::Timestamp;
    const CAST_TYPE: &'static str = "TIMESTAMP";

    fn to_value(&self) -> SqlValue {
        SqlValue::DateTime(*self)
    }

    fn from_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::DateTime(t) => Some(*t),
            _ => None,
        }
    }
}

impl SqlType for DateTime<Utc> {
    const TYPE_CODE: TypeCode = TypeCode::TimestampTz;
    const CAST_TYPE: &'static str = "TIMESTAMP WITH TIME ZONE";

    fn to_value(&self) -> SqlValue {
        SqlValue::TimestampTz(*self)
    }

    fn from_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::TimestampTz(t) => Some(*t),
            SqlValue::DateTime(t) => Some(t.and_utc()),
            _ => None,
        }
    }
}

impl SqlType for Uuid {
    const TYPE_CODE: TypeCode = TypeCode::Uuid;
    const CAST_TYPE: &'static str = "UUID";

    fn to_value(&self) -> SqlValue {
        SqlValue::Uuid(*self)
    }

    fn from_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Uuid(u) => Some(*u),
            SqlValue::Text(s) => Uuid::parse_str(s).ok(),
            _ => None,
        }
    }
}

impl<T: SqlType> SqlType for Option<T> {
    const TYPE_CODE: TypeCode = T::TYPE_CODE;
    const CAST_TYPE: &'static str = T::CAST_TYPE;

    fn to_value(&self) -> SqlValue {
        match self {
            Some(v) => v.to_value(),
            None => SqlValue::Null,
        }
    }

    fn from_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_roundtrip() {
        let v = 42i32.to_value();
        assert_eq!(v, SqlValue::Int(42));
        assert_eq!(i32::from_value(&v), Some(42));
    }

    #[test]
    fn test_narrowing_rejects_overflow() {
        assert_eq!(i16::from_value(&SqlValue::Int(100_000)), None);
    }

    #[test]
    fn test_option_null() {
        assert_eq!(<Option<i64>>::from_value(&SqlValue::Null), Some(None));
        assert_eq!(<Option<i64>>::from_value(&SqlValue::Int(5)), Some(Some(5)));
        assert_eq!(None::<String>.to_value(), SqlValue::Null);
    }

    #[test]
    fn test_mismatch_is_none() {
        assert_eq!(String::from_value(&SqlValue::Int(1)), None);
        assert_eq!(bool::from_value(&SqlValue::Text("t".into())), None);
    }
}
