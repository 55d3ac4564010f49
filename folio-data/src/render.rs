//! Column and value rendering shared by specifications and sort collections.

use serde::Serialize;

use crate::field::{ColumnMapper, FieldPath};
use crate::operator::Operator;
use crate::query::{quote_identifier, Dialect};
use crate::value::Value;

/// A WHERE fragment with its bind values, in placeholder order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct BoundFragment {
    pub sql: String,
    pub params: Vec<Value>,
}

impl BoundFragment {
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }
}

#[derive(Debug)]
enum ValueMode {
    /// Values become SQL literals inside the fragment.
    Inline,
    /// Values become placeholders; the values are collected in order.
    Bound {
        dialect: Dialect,
        next_index: usize,
        params: Vec<Value>,
    },
}

/// Renders columns through an optional mapper and values either inline or
/// as bound parameters.
pub(crate) struct Renderer<'a> {
    mapper: Option<&'a dyn ColumnMapper>,
    values: ValueMode,
    quote: Option<Dialect>,
}

impl<'a> Renderer<'a> {
    pub(crate) fn inline(mapper: Option<&'a dyn ColumnMapper>) -> Self {
        Self {
            mapper,
            values: ValueMode::Inline,
            quote: None,
        }
    }

    /// Placeholders are numbered from `first_index` (only visible for
    /// dialects with numbered placeholders).
    pub(crate) fn bound(
        dialect: Dialect,
        first_index: usize,
        mapper: Option<&'a dyn ColumnMapper>,
    ) -> Self {
        Self {
            mapper,
            values: ValueMode::Bound {
                dialect,
                next_index: first_index,
                params: Vec::new(),
            },
            quote: None,
        }
    }

    /// Quote every rendered column in the style of `dialect`.
    pub(crate) fn quoted(mut self, dialect: Dialect) -> Self {
        self.quote = Some(dialect);
        self
    }

    /// Rendered column: the mapped physical name (kept under the path's
    /// qualifier) or the logical column when unmapped.
    pub(crate) fn column(&self, path: &FieldPath) -> String {
        let column = match self.mapper.and_then(|m| m.column(path)) {
            Some(physical) => path.column_named(&physical),
            None => path.column(),
        };
        match self.quote {
            Some(dialect) => quote_identifier(&column, dialect, false),
            None => column,
        }
    }

    /// Right-hand side of a comparison using `op` (already resolved).
    pub(crate) fn value(&mut self, op: Operator, value: &Value) -> String {
        match (&mut self.values, value) {
            (ValueMode::Inline, Value::List(_)) => value.to_sql_literal(),
            (ValueMode::Inline, v) if op.takes_list() => format!("({})", v.to_sql_literal()),
            (ValueMode::Inline, v) => v.to_sql_literal(),
            // Null is never bound: `is null` must stay literal.
            (ValueMode::Bound { .. }, Value::Null) => "null".to_string(),
            (
                ValueMode::Bound {
                    dialect,
                    next_index,
                    params,
                },
                Value::List(items),
            ) => {
                let placeholders: Vec<String> = items
                    .iter()
                    .flat_map(Value::flattened)
                    .map(|item| {
                        if item.is_null() {
                            return "null".to_string();
                        }
                        let p = dialect.placeholder(*next_index);
                        *next_index += 1;
                        params.push(item.clone());
                        p
                    })
                    .collect();
                format!("({})", placeholders.join(","))
            }
            (
                ValueMode::Bound {
                    dialect,
                    next_index,
                    params,
                },
                v,
            ) => {
                let p = dialect.placeholder(*next_index);
                *next_index += 1;
                params.push(v.clone());
                if op.takes_list() {
                    format!("({p})")
                } else {
                    p
                }
            }
        }
    }

    pub(crate) fn finish(self, sql: String) -> BoundFragment {
        match self.values {
            ValueMode::Inline => BoundFragment {
                sql,
                params: Vec::new(),
            },
            ValueMode::Bound { params, .. } => BoundFragment { sql, params },
        }
    }
}
