//! Sort criteria and ORDER BY rendering.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DataError;
use crate::field::{ColumnMap, ColumnMapper, FieldPath};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn reverse(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for SortDirection {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            _ => Err(DataError::InvalidSortDirection(s.to_string())),
        }
    }
}

/// One `(field, direction)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortCriterion {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortCriterion {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Desc)
    }
}

impl fmt::Display for SortCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.direction)
    }
}

/// An entry of a [`SortCollection`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortEntry {
    Criterion(SortCriterion),
    /// An ORDER BY expression rendered verbatim, never mapped or dropped.
    Raw(String),
}

/// A resolved ORDER BY term, before joining.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum OrderTerm<'a> {
    Column {
        name: String,
        direction: SortDirection,
    },
    Raw(&'a str),
}

/// Ordered sort keys. The first entry is the primary key.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortCollection {
    entries: Vec<SortEntry>,
}

impl SortCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key, builder style.
    pub fn by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.push(SortCriterion::new(field, direction));
        self
    }

    pub fn asc(self, field: impl Into<String>) -> Self {
        self.by(field, SortDirection::Asc)
    }

    pub fn desc(self, field: impl Into<String>) -> Self {
        self.by(field, SortDirection::Desc)
    }

    /// Add a raw expression, builder style. Not escaped or validated.
    pub fn raw(mut self, expression: impl Into<String>) -> Self {
        self.push_raw(expression);
        self
    }

    pub fn push(&mut self, criterion: SortCriterion) {
        self.entries.push(SortEntry::Criterion(criterion));
    }

    pub fn push_raw(&mut self, expression: impl Into<String>) {
        self.entries.push(SortEntry::Raw(expression.into()));
    }

    /// Build from `(field, direction)` string pairs.
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Result<Self, DataError> {
        let mut sort = Self::new();
        for (field, direction) in pairs {
            sort.push(SortCriterion::new(*field, direction.parse()?));
        }
        Ok(sort)
    }

    /// Parse a compact list such as `name,-created`: a leading `-` sorts
    /// descending, a leading `+` or nothing ascending.
    pub fn parse(list: &str) -> Self {
        let mut sort = Self::new();
        for item in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let criterion = match item.strip_prefix('-') {
                Some(field) => SortCriterion::desc(field.trim()),
                None => SortCriterion::asc(item.trim_start_matches('+').trim()),
            };
            if !criterion.field.is_empty() {
                sort.push(criterion);
            }
        }
        sort
    }

    /// Sort requested by a client, restricted to `allowed` fields.
    ///
    /// If `requested` is a key of `allowed` the result sorts by the
    /// translated column; anything else yields `default`.
    pub fn from_request(
        requested: Option<&str>,
        direction: SortDirection,
        allowed: &ColumnMap,
        default: SortCollection,
    ) -> SortCollection {
        match requested.and_then(|field| allowed.get(field)) {
            Some(column) => Self::new().by(column, direction),
            None => {
                if let Some(field) = requested {
                    tracing::debug!(field, "sort field not allowed, using default sort");
                }
                default
            }
        }
    }

    pub fn entries(&self) -> &[SortEntry] {
        &self.entries
    }

    /// Structured criteria, skipping raw expressions.
    pub fn criteria(&self) -> impl Iterator<Item = &SortCriterion> {
        self.entries.iter().filter_map(|e| match e {
            SortEntry::Criterion(c) => Some(c),
            SortEntry::Raw(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A copy with every structured direction flipped. Raw entries are kept as is.
    pub fn reversed(&self) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .map(|e| match e {
                    SortEntry::Criterion(c) => {
                        SortEntry::Criterion(SortCriterion::new(c.field.clone(), c.direction.reverse()))
                    }
                    raw => raw.clone(),
                })
                .collect(),
        }
    }

    /// `field dir, field dir` in insertion order, unmapped.
    ///
    /// Dotted fields keep only their immediate qualifier, as in a filter.
    pub fn render(&self) -> String {
        join_terms(&self.terms(None))
    }

    /// Render through `mapper`.
    ///
    /// A mapped field uses its physical column. A qualified field must be
    /// mapped under its qualified name (`agency.name`); the bare-name
    /// fallback of [`ColumnMap`] does not apply. An unmapped field listed
    /// in `whitelist` is kept. Any other field is dropped.
    pub fn render_mapped(&self, mapper: &dyn ColumnMapper, whitelist: &[&str]) -> String {
        join_terms(&self.terms(Some((mapper, whitelist))))
    }

    pub(crate) fn terms(&self, mapping: Option<(&dyn ColumnMapper, &[&str])>) -> Vec<OrderTerm<'_>> {
        self.entries
            .iter()
            .filter_map(|entry| match entry {
                SortEntry::Raw(sql) => Some(OrderTerm::Raw(sql.as_str())),
                SortEntry::Criterion(c) => {
                    let path = FieldPath::parse(&c.field);
                    if path.field().is_empty() {
                        tracing::debug!(field = %c.field, "dropping empty sort field");
                        return None;
                    }
                    let name = match mapping {
                        None => path.column(),
                        Some((mapper, whitelist)) => match mapper.exact_column(&path) {
                            Some(physical) => path.column_named(&physical),
                            None if whitelist.contains(&c.field.as_str()) => path.column(),
                            None => {
                                tracing::debug!(field = %c.field, "dropping unmapped sort field");
                                return None;
                            }
                        },
                    };
                    Some(OrderTerm::Column {
                        name,
                        direction: c.direction,
                    })
                }
            })
            .collect()
    }
}

impl FromIterator<SortCriterion> for SortCollection {
    fn from_iter<I: IntoIterator<Item = SortCriterion>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(SortEntry::Criterion).collect(),
        }
    }
}

impl From<SortCriterion> for SortCollection {
    fn from(c: SortCriterion) -> Self {
        Self {
            entries: vec![SortEntry::Criterion(c)],
        }
    }
}

fn join_terms(terms: &[OrderTerm<'_>]) -> String {
    terms
        .iter()
        .map(|t| match t {
            OrderTerm::Column { name, direction } => format!("{name} {direction}"),
            OrderTerm::Raw(sql) => sql.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
