//! Supported SQL dialects.

use crate::renderer::sql::h2::H2Dialect;
use crate::renderer::sql::hsqldb::HsqldbDialect;
use crate::renderer::sql::mysql::MysqlDialect;
use crate::renderer::sql::postgres::PostgresDialect;
use crate::renderer::sql::sqlite::SqliteDialect;
use crate::renderer::traits::SqlDialect;

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    H2,
    Hsqldb,
    Mysql,
    Postgres,
    Sqlite,
}

impl Default for Dialect {
    fn default() -> Self {
        Self::Postgres
    }
}

impl Dialect {
    pub fn generator(&self) -> Box<dyn SqlDialect> {
        match self {
            Dialect::H2 => Box::new(H2Dialect),
            Dialect::Hsqldb => Box::new(HsqldbDialect),
            Dialect::Mysql => Box::new(MysqlDialect),
            Dialect::Postgres => Box::new(PostgresDialect),
            Dialect::Sqlite => Box::new(SqliteDialect),
        }
    }
}
