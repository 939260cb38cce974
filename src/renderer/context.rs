//! Per-render state: alias assignment, name mapping, and the live-column
//! sets that drive projection elision.

use std::collections::{HashMap, HashSet};

use crate::error::{RelqError, Result};
use crate::expr::{ColumnPath, ExprNode, FromId};
use crate::query::{FromSource, SelectIr, SimpleSelectIr};
use crate::renderer::dialect::Dialect;
use crate::renderer::traits::SqlDialect;
use crate::schema::NameMapper;

/// Which exported columns of a subquery the enclosing scope references.
#[derive(Debug, Clone, PartialEq)]
pub enum LiveColumns {
    All,
    Columns(HashSet<ColumnPath>),
}

impl LiveColumns {
    pub fn contains(&self, path: &ColumnPath) -> bool {
        match self {
            LiveColumns::All => true,
            LiveColumns::Columns(set) => set.contains(path),
        }
    }
}

/// The bag threaded through one rendering pass.
///
/// Aliases are assigned once per from-source in encounter order, from a
/// counter shared by tables and subqueries; nested scopes extend the same
/// map, so correlated references resolve through it.
pub struct RenderContext {
    dialect: Box<dyn SqlDialect>,
    pub table_names: NameMapper,
    pub column_names: NameMapper,
    aliases: HashMap<FromId, Option<String>>,
    counter: usize,
}

impl RenderContext {
    pub fn new(dialect: Dialect, table_names: NameMapper, column_names: NameMapper) -> Self {
        RenderContext {
            dialect: dialect.generator(),
            table_names,
            column_names,
            aliases: HashMap::new(),
            counter: 0,
        }
    }

    pub fn dialect(&self) -> &dyn SqlDialect {
        self.dialect.as_ref()
    }

    /// The mapped, quoted table name of a source.
    pub fn table_name(&self, raw: &str) -> String {
        self.dialect.quote_identifier(&self.table_names.apply(raw))
    }

    /// The mapped, quoted column name.
    pub fn column_name(&self, raw: &str) -> String {
        self.dialect.quote_identifier(&self.column_names.apply(raw))
    }

    /// Assign the alias for a from-source: `<mapped-table-name><n>` for
    /// tables, `subquery<n>` otherwise, with one shared counter.
    pub fn assign_alias(&mut self, source: &FromSource) -> String {
        let alias = match source {
            FromSource::Table { meta, .. } => {
                format!("{}{}", self.table_names.apply(meta.name), self.counter)
            }
            FromSource::Subquery { .. } | FromSource::Values { .. } => {
                format!("subquery{}", self.counter)
            }
        };
        self.counter += 1;
        self.aliases.insert(source.id(), Some(alias.clone()));
        alias
    }

    /// Bind a DML target whose columns render unqualified (INSERT).
    pub fn bind_unqualified(&mut self, id: FromId) {
        self.aliases.insert(id, None);
    }

    /// Bind a DML target whose columns render qualified by the table name
    /// itself (UPDATE / DELETE).
    pub fn bind_table_qualified(&mut self, id: FromId, raw_name: &str) {
        let name = self.table_name(raw_name);
        self.aliases.insert(id, Some(name));
    }

    fn lookup(&self, id: FromId) -> Result<&Option<String>> {
        self.aliases.get(&id).ok_or_else(|| {
            RelqError::render("expression references a from-source that is not in scope")
        })
    }

    /// Rendered reference to a table column.
    pub fn column_ref(&self, table: FromId, name: &str) -> Result<String> {
        let column = self.column_name(name);
        Ok(match self.lookup(table)? {
            Some(alias) => format!("{}.{}", alias, column),
            None => column,
        })
    }

    /// Rendered reference to an exported subquery column.
    pub fn subquery_column_ref(&self, source: FromId, path: &ColumnPath) -> Result<String> {
        Ok(match self.lookup(source)? {
            Some(alias) => format!("{}.{}", alias, path.alias()),
            None => path.alias(),
        })
    }
}

/// Collect, for every subquery from-source directly inside `scope`, the set
/// of exported columns the scope references anywhere.
pub fn collect_live_columns(scope: &SimpleSelectIr) -> HashMap<FromId, LiveColumns> {
    let mut subquery_ids: HashSet<FromId> = HashSet::new();
    for source in &scope.from {
        if let FromSource::Subquery { id, .. } = source {
            subquery_ids.insert(*id);
        }
    }
    for join in &scope.joins {
        if let FromSource::Subquery { id, .. } = &join.source {
            subquery_ids.insert(*id);
        }
    }

    let mut live: HashMap<FromId, HashSet<ColumnPath>> = HashMap::new();
    scope.visit_exprs(&mut |node| {
        if let ExprNode::SubqueryColumn { source, path } = node {
            if subquery_ids.contains(source) {
                live.entry(*source).or_default().insert(path.clone());
            }
        }
    });

    subquery_ids
        .into_iter()
        .map(|id| {
            let columns = live.remove(&id).unwrap_or_default();
            (id, LiveColumns::Columns(columns))
        })
        .collect()
}

/// Whether a select's projection may be pruned to its live columns: only
/// when no compound operator in it uses columns for row equality and no
/// DISTINCT prefix does.
pub fn elision_allowed(ir: &SelectIr) -> bool {
    match ir {
        SelectIr::Simple(s) => !s.distinct,
        SelectIr::Compound(c) => {
            !c.lhs.distinct
                && c.ops
                    .iter()
                    .all(|(op, side)| op.allows_column_elision() && !side.distinct)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_columns_contains() {
        let all = LiveColumns::All;
        assert!(all.contains(&ColumnPath(vec!["x"])));
        let none = LiveColumns::Columns(HashSet::new());
        assert!(!none.contains(&ColumnPath(vec!["x"])));
    }
}
