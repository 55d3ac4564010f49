//! Leaf conditions of a [`Specification`](crate::Specification).

use serde::{Deserialize, Serialize};

use crate::field::FieldPath;
use crate::operator::{Connector, Operator};
use crate::render::Renderer;
use crate::value::Value;

/// One comparison: `<field> <operator> <value>`.
///
/// The stored operator is an intent. It is resolved against the value
/// only when rendering, so the value may be replaced after construction
/// without leaving a stale operator behind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    path: FieldPath,
    operator: Operator,
    value: Value,
    #[serde(default)]
    connector: Connector,
}

impl Predicate {
    pub fn new(path: impl Into<FieldPath>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            path: path.into(),
            operator,
            value: value.into(),
            connector: Connector::And,
        }
    }

    /// Equality intent: becomes `is` for null and `in` for lists.
    pub fn equals(path: impl Into<FieldPath>, value: impl Into<Value>) -> Self {
        Self::new(path, Operator::Eq, value)
    }

    /// Inequality intent: becomes `is not` for null and `not in` for lists.
    pub fn not_equals(path: impl Into<FieldPath>, value: impl Into<Value>) -> Self {
        Self::new(path, Operator::NotEq, value)
    }

    pub fn is_null(path: impl Into<FieldPath>) -> Self {
        Self::new(path, Operator::Eq, Value::Null)
    }

    pub fn is_not_null(path: impl Into<FieldPath>) -> Self {
        Self::new(path, Operator::NotEq, Value::Null)
    }

    pub fn is_in<V: Into<Value>>(
        path: impl Into<FieldPath>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let list = Value::List(values.into_iter().map(Into::into).collect());
        Self::new(path, Operator::In, list)
    }

    pub fn not_in<V: Into<Value>>(
        path: impl Into<FieldPath>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let list = Value::List(values.into_iter().map(Into::into).collect());
        Self::new(path, Operator::NotIn, list)
    }

    /// `like` with a caller-supplied pattern.
    pub fn like(path: impl Into<FieldPath>, pattern: impl Into<String>) -> Self {
        let pattern: String = pattern.into();
        Self::new(path, Operator::Like, pattern)
    }

    pub fn not_like(path: impl Into<FieldPath>, pattern: impl Into<String>) -> Self {
        let pattern: String = pattern.into();
        Self::new(path, Operator::NotLike, pattern)
    }

    /// `like '%needle%'`. Wildcards inside `needle` are not escaped.
    pub fn contains(path: impl Into<FieldPath>, needle: &str) -> Self {
        Self::like(path, format!("%{needle}%"))
    }

    pub fn starts_with(path: impl Into<FieldPath>, prefix: &str) -> Self {
        Self::like(path, format!("{prefix}%"))
    }

    pub fn ends_with(path: impl Into<FieldPath>, suffix: &str) -> Self {
        Self::like(path, format!("%{suffix}"))
    }

    pub fn lt(path: impl Into<FieldPath>, value: impl Into<Value>) -> Self {
        Self::new(path, Operator::Lt, value)
    }

    pub fn gt(path: impl Into<FieldPath>, value: impl Into<Value>) -> Self {
        Self::new(path, Operator::Gt, value)
    }

    pub fn lte(path: impl Into<FieldPath>, value: impl Into<Value>) -> Self {
        Self::new(path, Operator::Lte, value)
    }

    pub fn gte(path: impl Into<FieldPath>, value: impl Into<Value>) -> Self {
        Self::new(path, Operator::Gte, value)
    }

    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// The operator as constructed, before resolution.
    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// The operator that will be rendered for the current value.
    pub fn resolved_operator(&self) -> Operator {
        self.operator.resolve(&self.value)
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut Value {
        &mut self.value
    }

    pub fn set_value(&mut self, value: impl Into<Value>) {
        self.value = value.into();
    }

    pub fn connector(&self) -> Connector {
        self.connector
    }

    /// Only a specification sets the connector, when the predicate is added.
    pub(crate) fn with_connector(mut self, connector: Connector) -> Self {
        self.connector = connector;
        self
    }

    /// Inline rendering without a column mapper.
    pub fn render(&self) -> String {
        self.render_with(&mut Renderer::inline(None))
    }

    pub(crate) fn render_with(&self, r: &mut Renderer<'_>) -> String {
        if self.path.field().is_empty() {
            tracing::warn!(path = %self.path, "predicate has no field, rendering as false");
            return "1=0".to_string();
        }
        let op = self.resolved_operator();
        if self.value.is_list() && op.takes_list() && self.value.flattened().is_empty() {
            // `x in ()` is not valid SQL; an empty set matches nothing.
            return match op {
                Operator::NotIn => "1=1".to_string(),
                _ => "1=0".to_string(),
            };
        }
        let column = r.column(&self.path);
        let rhs = r.value(op, &self.value);
        format!("{column} {op} {rhs}")
    }
}
