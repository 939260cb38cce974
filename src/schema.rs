//! Table metadata, the [`Table`] trait, identifier mapping, and the
//! [`table!`](crate::table) macro that generates the three views of a row
//! type: the stored row, the query-side expression row, and the
//! assignment-side column handles.

use std::marker::PhantomData;

use crate::expr::{Expr, ExprNode, FromId};
use crate::query::delete::Delete;
use crate::query::insert::Insert;
use crate::query::select::Select;
use crate::query::update::Update;
use crate::queryable::Queryable;
use crate::types::{SqlType, TypeCode};

/// Static description of one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub code: TypeCode,
    pub primary_key: bool,
    pub auto_increment: bool,
}

impl ColumnDef {
    pub const fn new(name: &'static str, code: TypeCode) -> Self {
        Self {
            name,
            code,
            primary_key: false,
            auto_increment: false,
        }
    }

    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub const fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }
}

/// Static description of a table: raw name plus ordered columns. The raw
/// name still passes through the installed [`NameMapper`] at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableMeta {
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
}

/// A record type bound to a table.
///
/// `Expr` is the query-side view (each field an [`Expr`]), `Cols` the
/// assignment-side view (each field a [`Column`] handle). Both are
/// generated by [`table!`](crate::table).
pub trait Table: Sized + 'static {
    type Expr: Queryable<Output = Self>;
    type Cols;

    const META: &'static TableMeta;

    /// The expression row bound to a from-source alias.
    fn expr(table: FromId) -> Self::Expr;

    /// The assignment-side column handles.
    fn cols() -> Self::Cols;

    /// Start a select over this table.
    fn select() -> Select<Self::Expr> {
        Select::from_table::<Self>()
    }

    /// Start an insert into this table.
    fn insert() -> Insert<Self> {
        Insert::new()
    }

    /// Start an update of rows matching `pred`. Pass a constant `true`
    /// expression to update every row; it still renders as `WHERE ?` with
    /// a bound boolean, which a few drivers reject in that position.
    fn update(pred: impl FnOnce(&Self::Expr) -> Expr<bool>) -> Update<Self> {
        Update::new(pred)
    }

    /// Start a delete of rows matching `pred`; the constant-`true` caveat
    /// of [`Table::update`] applies.
    fn delete(pred: impl FnOnce(&Self::Expr) -> Expr<bool>) -> Delete<Self> {
        Delete::new(pred)
    }
}

/// Assignment-side handle for one column.
pub struct Column<T: SqlType> {
    name: &'static str,
    marker: PhantomData<fn() -> T>,
}

impl<T: SqlType> Clone for Column<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: SqlType> Copy for Column<T> {}

impl<T: SqlType> Column<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Bind a value or expression to this column.
    pub fn set(&self, value: impl Into<Expr<T>>) -> Assignment {
        Assignment {
            column: self.name,
            value: value.into().into_node(),
        }
    }
}

/// A `column = expression` pair used by INSERT and UPDATE.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: &'static str,
    pub value: ExprNode,
}

/// Identifier mapping applied to raw table and column names at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameMapper {
    /// Use names exactly as declared.
    #[default]
    Identity,
    /// Lowercase the declared name.
    LowerCase,
    /// Convert `camelCase` / `PascalCase` to `snake_case`.
    SnakeCase,
    /// Arbitrary mapping.
    Custom(fn(&str) -> String),
}

impl NameMapper {
    pub fn apply(&self, name: &str) -> String {
        match self {
            NameMapper::Identity => name.to_string(),
            NameMapper::LowerCase => name.to_lowercase(),
            NameMapper::SnakeCase => to_snake_case(name),
            NameMapper::Custom(f) => f(name),
        }
    }
}

fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Generate the row struct, its query-side expression view, its
/// assignment-side column view, and the [`Table`] / [`Queryable`] impls.
///
/// ```ignore
/// table! {
///     /// Products available for sale.
///     pub struct Product in "product" {
///         id: i64 [primary_key, auto_increment],
///         kebab_case_name: String,
///         name: String,
///         price: f64,
///     }
/// }
/// ```
///
/// This defines `Product`, `ProductExpr`, and `ProductCols`.
#[macro_export]
macro_rules! table {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident in $table:literal {
            $(
                $(#[$fmeta:meta])*
                $field:ident : $fty:ty $([ $($flag:ident),+ ])?
            ),+ $(,)?
        }
    ) => {
        $crate::paste::paste! {
            $(#[$meta])*
            #[derive(Debug, Clone, PartialEq)]
            $vis struct $name {
                $(
                    $(#[$fmeta])*
                    pub $field: $fty,
                )+
            }

            /// Query-side view: one expression per column.
            #[derive(Clone)]
            $vis struct [<$name Expr>] {
                $(pub $field: $crate::expr::Expr<$fty>,)+
            }

            /// Assignment-side view: one column handle per column.
            #[derive(Clone)]
            $vis struct [<$name Cols>] {
                $(pub $field: $crate::schema::Column<$fty>,)+
            }

            impl $crate::schema::Table for $name {
                type Expr = [<$name Expr>];
                type Cols = [<$name Cols>];

                const META: &'static $crate::schema::TableMeta = &$crate::schema::TableMeta {
                    name: $table,
                    columns: &[
                        $(
                            $crate::schema::ColumnDef::new(
                                stringify!($field),
                                <$fty as $crate::types::SqlType>::TYPE_CODE,
                            )$($(.$flag())+)?,
                        )+
                    ],
                };

                fn expr(table: $crate::expr::FromId) -> Self::Expr {
                    [<$name Expr>] {
                        $($field: $crate::expr::Expr::column(table, stringify!($field)),)+
                    }
                }

                fn cols() -> Self::Cols {
                    [<$name Cols>] {
                        $($field: $crate::schema::Column::new(stringify!($field)),)+
                    }
                }
            }

            impl $crate::queryable::Queryable for [<$name Expr>] {
                type Output = $name;

                fn walk(
                    &self,
                    path: &mut Vec<&'static str>,
                    out: &mut Vec<($crate::expr::ColumnPath, $crate::expr::ExprNode)>,
                ) {
                    $(
                        path.push(stringify!($field));
                        $crate::queryable::Queryable::walk(&self.$field, path, out);
                        path.pop();
                    )+
                }

                fn remap(
                    &self,
                    path: &mut Vec<&'static str>,
                    f: &mut dyn FnMut(&$crate::expr::ColumnPath) -> $crate::expr::ExprNode,
                ) -> Self {
                    [<$name Expr>] {
                        $(
                            $field: {
                                path.push(stringify!($field));
                                let leaf =
                                    $crate::queryable::Queryable::remap(&self.$field, path, f);
                                path.pop();
                                leaf
                            },
                        )+
                    }
                }

                fn type_codes(&self, out: &mut Vec<$crate::types::TypeCode>) {
                    $(out.push(<$fty as $crate::types::SqlType>::TYPE_CODE);)+
                }

                fn width(&self) -> usize {
                    [$(stringify!($field)),+].len()
                }

                fn decode(
                    &self,
                    row: &[$crate::types::SqlValue],
                    index: &mut usize,
                    path: &mut Vec<&'static str>,
                ) -> $crate::error::Result<Self::Output> {
                    Ok($name {
                        $(
                            $field: {
                                path.push(stringify!($field));
                                let value = $crate::queryable::Queryable::decode(
                                    &self.$field,
                                    row,
                                    index,
                                    path,
                                )?;
                                path.pop();
                                value
                            },
                        )+
                    })
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case() {
        assert_eq!(to_snake_case("kebabCaseName"), "kebab_case_name");
        assert_eq!(to_snake_case("ShippingInfo"), "shipping_info");
        assert_eq!(to_snake_case("price"), "price");
    }

    #[test]
    fn test_column_def_flags() {
        const DEF: ColumnDef =
            ColumnDef::new("id", TypeCode::BigInt).primary_key().auto_increment();
        assert!(DEF.primary_key);
        assert!(DEF.auto_increment);
        assert!(!ColumnDef::new("name", TypeCode::Varchar).primary_key);
    }

    #[test]
    fn test_mapper_identity_default() {
        assert_eq!(NameMapper::default().apply("Name"), "Name");
        assert_eq!(NameMapper::LowerCase.apply("Name"), "name");
    }
}
