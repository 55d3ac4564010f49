//! Full SELECT and COUNT statements composed from a specification and a pageable.
//!
//! ```
//! use folio_data::{Dialect, Pageable, SelectQuery, SortCollection, Specification};
//!
//! let filter = Specification::new().and(("status", "open"));
//! let pageable = Pageable::of(3, 10).with_sort(SortCollection::new().desc("id"));
//!
//! let select = SelectQuery::new("tickets")
//!     .dialect(Dialect::Postgres)
//!     .filter(&filter)
//!     .pageable(&pageable)
//!     .build_paged_select()
//!     .unwrap();
//! assert_eq!(
//!     select.sql,
//!     "SELECT * FROM tickets WHERE status = $1 ORDER BY id desc LIMIT 10 OFFSET 20"
//! );
//! ```

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::entity::Entity;
use crate::error::DataError;
use crate::field::{ColumnMapper, FieldPath};
use crate::page::Pageable;
use crate::render::{BoundFragment, Renderer};
use crate::sort::OrderTerm;
use crate::specification::Specification;

/// SQL flavour: placeholder style and identifier quoting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Generic SQL using `?` placeholders (default).
    #[default]
    Generic,
    /// SQLite-style `?` placeholders.
    Sqlite,
    /// MySQL-style `?` placeholders with backtick quoting.
    #[serde(rename = "mysql")]
    MySql,
    /// Postgres-style `$1, $2, ...` placeholders.
    Postgres,
}

impl Dialect {
    pub(crate) fn placeholder(self, index: usize) -> String {
        match self {
            Dialect::Postgres => format!("${index}"),
            Dialect::Generic | Dialect::Sqlite | Dialect::MySql => "?".to_string(),
        }
    }

    fn quote_char(self) -> char {
        match self {
            Dialect::MySql => '`',
            Dialect::Generic | Dialect::Sqlite | Dialect::Postgres => '"',
        }
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "generic" => Ok(Dialect::Generic),
            "sqlite" => Ok(Dialect::Sqlite),
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            other => Err(format!("unknown SQL dialect '{other}'")),
        }
    }
}

/// How table, column and join identifiers are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierPolicy {
    /// Do not validate or quote identifiers.
    #[default]
    Raw,
    /// Validate identifiers against a conservative pattern.
    Validate,
    /// Validate and quote identifiers using the dialect quoting style.
    Quote,
}

impl FromStr for IdentifierPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(IdentifierPolicy::Raw),
            "validate" => Ok(IdentifierPolicy::Validate),
            "quote" => Ok(IdentifierPolicy::Quote),
            other => Err(format!("unknown identifier policy '{other}'")),
        }
    }
}

/// Composes a table, a filter and a pageable into executable statements.
///
/// Building is pure: the same query can be built any number of times.
/// Raw filter fragments, raw sort entries and join clauses are inserted
/// verbatim under every identifier policy.
#[derive(Clone)]
pub struct SelectQuery<'a> {
    table: String,
    columns: Vec<String>,
    joins: Vec<(String, String)>,
    filter: Option<&'a Specification>,
    pageable: Option<&'a Pageable>,
    mapper: Option<&'a dyn ColumnMapper>,
    sort_whitelist: &'a [&'a str],
    dialect: Dialect,
    identifier_policy: IdentifierPolicy,
}

impl<'a> SelectQuery<'a> {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: Vec::new(),
            joins: Vec::new(),
            filter: None,
            pageable: None,
            mapper: None,
            sort_whitelist: &[],
            dialect: Dialect::Generic,
            identifier_policy: IdentifierPolicy::Raw,
        }
    }

    /// Table and column list of an entity.
    pub fn for_entity<E: Entity>() -> Self {
        Self::new(E::table_name()).columns(E::columns())
    }

    /// Selected columns; `*` when none are given.
    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Register a join clause for an association qualifier.
    ///
    /// The clause is emitted only when the filter or the sort references
    /// a field under `qualifier`.
    pub fn join(mut self, qualifier: &str, clause: &str) -> Self {
        self.joins.push((qualifier.to_string(), clause.to_string()));
        self
    }

    pub fn filter(mut self, filter: &'a Specification) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn pageable(mut self, pageable: &'a Pageable) -> Self {
        self.pageable = Some(pageable);
        self
    }

    /// Like [`pageable`](Self::pageable) for call sites holding an option.
    pub fn maybe_pageable(mut self, pageable: Option<&'a Pageable>) -> Self {
        self.pageable = pageable;
        self
    }

    /// Translate logical fields to physical columns.
    ///
    /// With a mapper set, unmapped sort fields are dropped unless listed in
    /// the [sort whitelist](Self::sort_whitelist).
    pub fn mapper(mut self, mapper: &'a dyn ColumnMapper) -> Self {
        self.mapper = Some(mapper);
        self
    }

    pub fn sort_whitelist(mut self, columns: &'a [&'a str]) -> Self {
        self.sort_whitelist = columns;
        self
    }

    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn identifier_policy(mut self, policy: IdentifierPolicy) -> Self {
        self.identifier_policy = policy;
        self
    }

    /// `SELECT ... [WHERE] [ORDER BY] [LIMIT OFFSET]`.
    ///
    /// Without a pageable the statement is unbounded and unordered.
    pub fn build_select(&self) -> Result<BoundFragment, DataError> {
        let table = self.identifier(&self.table, false, "table")?;
        let columns = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns
                .iter()
                .map(|c| self.identifier(c, true, "column"))
                .collect::<Result<Vec<_>, _>>()?
                .join(", ")
        };

        let order = self.order_by()?;
        let mut sql = format!("SELECT {columns} FROM {table}");
        self.append_joins(&mut sql, &order);
        let mut select = self.append_where(sql)?;
        if !order.sql.is_empty() {
            select.sql.push_str(" ORDER BY ");
            select.sql.push_str(&order.sql);
        }
        if let Some(pageable) = self.pageable {
            let limit = pageable.to_limit();
            select
                .sql
                .push_str(&format!(" LIMIT {} OFFSET {}", limit.limit(), limit.offset()));
        }
        tracing::debug!(sql = %select.sql, params = select.params.len(), "built select");
        Ok(select)
    }

    /// Like [`build_select`](Self::build_select), but a pageable is required.
    pub fn build_paged_select(&self) -> Result<BoundFragment, DataError> {
        if self.pageable.is_none() {
            return Err(DataError::MissingPageable("build_paged_select"));
        }
        self.build_select()
    }

    /// `SELECT COUNT(*) ... [WHERE]`, with the same joins and parameters as
    /// the select. Sorting and paging are ignored.
    pub fn build_count(&self) -> Result<BoundFragment, DataError> {
        let table = self.identifier(&self.table, false, "table")?;
        let mut sql = format!("SELECT COUNT(*) FROM {table}");
        self.append_joins(&mut sql, &OrderBy::default());
        let count = self.append_where(sql)?;
        tracing::debug!(sql = %count.sql, params = count.params.len(), "built count");
        Ok(count)
    }

    fn append_joins(&self, sql: &mut String, order: &OrderBy) {
        let filter_qualifiers = self
            .filter
            .map(|f| f.field_paths())
            .unwrap_or_default()
            .into_iter()
            .filter_map(|p| p.qualifier().map(str::to_string));
        let used: Vec<String> = filter_qualifiers.chain(order.qualifiers.iter().cloned()).collect();
        for (qualifier, clause) in &self.joins {
            if used.iter().any(|q| q == qualifier) {
                sql.push(' ');
                sql.push_str(clause.trim());
            }
        }
    }

    fn append_where(&self, sql: String) -> Result<BoundFragment, DataError> {
        let filter = match self.filter {
            Some(filter) => filter,
            None => return Ok(BoundFragment { sql, params: Vec::new() }),
        };

        if self.identifier_policy != IdentifierPolicy::Raw {
            let resolver = Renderer::inline(self.mapper);
            for path in filter.field_paths() {
                let column = resolver.column(path);
                if !is_valid_identifier(&column, false) {
                    return Err(DataError::InvalidIdentifier {
                        kind: "column",
                        ident: column,
                    });
                }
            }
        }

        let mut renderer = Renderer::bound(self.dialect, 1, self.mapper);
        if self.identifier_policy == IdentifierPolicy::Quote {
            renderer = renderer.quoted(self.dialect);
        }
        let fragment = filter.render_in(renderer);
        if fragment.is_empty() {
            return Ok(BoundFragment { sql, params: Vec::new() });
        }
        Ok(BoundFragment {
            sql: format!("{sql} WHERE {}", fragment.sql),
            params: fragment.params,
        })
    }

    fn order_by(&self) -> Result<OrderBy, DataError> {
        let sort = match self.pageable.and_then(Pageable::sort) {
            Some(sort) => sort,
            None => return Ok(OrderBy::default()),
        };
        let terms = sort.terms(self.mapper.map(|m| (m, self.sort_whitelist)));

        let mut order = OrderBy::default();
        let mut clauses = Vec::with_capacity(terms.len());
        for term in terms {
            match term {
                OrderTerm::Column { name, direction } => {
                    if let Some(qualifier) = FieldPath::parse(&name).qualifier() {
                        order.qualifiers.push(qualifier.to_string());
                    }
                    let column = self.identifier(&name, false, "column")?;
                    clauses.push(format!("{column} {direction}"));
                }
                OrderTerm::Raw(sql) => clauses.push(sql.to_string()),
            }
        }
        order.sql = clauses.join(", ");
        Ok(order)
    }

    fn identifier(&self, ident: &str, allow_star: bool, kind: &'static str) -> Result<String, DataError> {
        if self.identifier_policy == IdentifierPolicy::Raw {
            return Ok(ident.to_string());
        }
        if !is_valid_identifier(ident, allow_star) {
            return Err(DataError::InvalidIdentifier {
                kind,
                ident: ident.to_string(),
            });
        }
        match self.identifier_policy {
            IdentifierPolicy::Quote => Ok(quote_identifier(ident, self.dialect, allow_star)),
            IdentifierPolicy::Raw | IdentifierPolicy::Validate => Ok(ident.to_string()),
        }
    }
}

/// Rendered ORDER BY list and the qualifiers it references.
#[derive(Default)]
struct OrderBy {
    sql: String,
    qualifiers: Vec<String>,
}

fn is_valid_identifier(ident: &str, allow_star: bool) -> bool {
    if ident.is_empty() {
        return false;
    }
    let parts: Vec<&str> = ident.split('.').collect();
    for (idx, part) in parts.iter().enumerate() {
        if allow_star && *part == "*" {
            return idx + 1 == parts.len();
        }
        if !is_valid_segment(part) {
            return false;
        }
    }
    true
}

fn is_valid_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub(crate) fn quote_identifier(ident: &str, dialect: Dialect, allow_star: bool) -> String {
    let quote = dialect.quote_char();
    let parts: Vec<&str> = ident.split('.').collect();
    let last_idx = parts.len().saturating_sub(1);
    parts
        .into_iter()
        .enumerate()
        .map(|(idx, part)| {
            if allow_star && part == "*" && idx == last_idx {
                part.to_string()
            } else {
                format!("{quote}{part}{quote}")
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}
