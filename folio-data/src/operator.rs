//! Comparison operators, logical connectors and operator resolution.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value::Value;

/// A comparison operator.
///
/// `Eq` and `NotEq` are intents: [`Operator::resolve`] rewrites them
/// according to the compared value's shape. Every other operator is taken
/// as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Eq,
    NotEq,
    Is,
    IsNot,
    In,
    NotIn,
    Like,
    NotLike,
    Lt,
    Gt,
    Lte,
    Gte,
}

impl Operator {
    /// Resolve an intent against the value it will be compared with.
    ///
    /// | intent  | `Null`  | `List`  | scalar  |
    /// |---------|---------|---------|---------|
    /// | `Eq`    | `Is`    | `In`    | `Eq`    |
    /// | `NotEq` | `IsNot` | `NotIn` | `NotEq` |
    ///
    /// There is no inference for any other operator (e.g. `Like` never
    /// becomes `NotLike`).
    pub fn resolve(self, value: &Value) -> Operator {
        match (self, value) {
            (Operator::Eq, Value::Null) => Operator::Is,
            (Operator::Eq, Value::List(_)) => Operator::In,
            (Operator::NotEq, Value::Null) => Operator::IsNot,
            (Operator::NotEq, Value::List(_)) => Operator::NotIn,
            (op, _) => op,
        }
    }

    /// SQL token for this operator.
    pub fn as_sql(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::NotEq => "!=",
            Operator::Is => "is",
            Operator::IsNot => "is not",
            Operator::In => "in",
            Operator::NotIn => "not in",
            Operator::Like => "like",
            Operator::NotLike => "not like",
            Operator::Lt => "<",
            Operator::Gt => ">",
            Operator::Lte => "<=",
            Operator::Gte => ">=",
        }
    }

    /// Whether the right-hand side is a parenthesized list.
    pub fn takes_list(self) -> bool {
        matches!(self, Operator::In | Operator::NotIn)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Logical connector joining a node to its preceding siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connector {
    #[default]
    And,
    Or,
}

impl Connector {
    pub fn as_sql(self) -> &'static str {
        match self {
            Connector::And => "AND",
            Connector::Or => "OR",
        }
    }
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}
