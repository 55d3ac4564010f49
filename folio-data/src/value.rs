//! Comparison values.
//!
//! [`Value`] is a closed tagged union. The shape of a value (null, scalar,
//! list) is what drives operator resolution, so conversions never guess:
//! an `Option::None` becomes [`Value::Null`], a `Vec` becomes
//! [`Value::List`], and everything else is a [`Scalar`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single non-null, non-list value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Scalar {
    /// SQL literal for this scalar. Strings are single-quoted with embedded
    /// quotes doubled. NaN and infinities have no SQL literal and render
    /// as `null`.
    pub fn to_sql_literal(&self) -> String {
        match self {
            Scalar::Bool(b) => b.to_string(),
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) if !f.is_finite() => "null".to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Str(s) => quote_str(s),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::Float(v) => write!(f, "{v}"),
            Scalar::Str(s) => f.write_str(s),
        }
    }
}

/// A value compared against a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Scalar(Scalar),
    List(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Members of a list with nested lists expanded in place. A null or a
    /// scalar yields itself.
    pub fn flattened(&self) -> Vec<&Value> {
        let mut out = Vec::new();
        collect_leaves(self, &mut out);
        out
    }

    /// Inline SQL literal: `null`, a scalar literal, or `(a,b,c)` for lists.
    /// Nested lists are flattened into the outer one.
    pub fn to_sql_literal(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Scalar(s) => s.to_sql_literal(),
            Value::List(_) => {
                let parts: Vec<String> =
                    self.flattened().into_iter().map(Value::to_sql_literal).collect();
                format!("({})", parts.join(","))
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql_literal())
    }
}

fn collect_leaves<'a>(value: &'a Value, out: &mut Vec<&'a Value>) {
    match value {
        Value::List(items) => items.iter().for_each(|item| collect_leaves(item, out)),
        leaf => out.push(leaf),
    }
}

fn quote_str(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        Value::Scalar(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Scalar(Scalar::Str(s.to_string()))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Scalar(Scalar::Str(s))
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Scalar(Scalar::Str(s.clone()))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Scalar(Scalar::Bool(b))
    }
}

/// Non-finite floats become [`Value::Null`].
impl From<f64> for Value {
    fn from(f: f64) -> Self {
        if f.is_finite() {
            Value::Scalar(Scalar::Float(f))
        } else {
            Value::Null
        }
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for Value {
                fn from(i: $ty) -> Self {
                    Value::Scalar(Scalar::Int(i64::from(i)))
                }
            }
        )+
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(v: [T; N]) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals() {
        assert_eq!(Value::from("asdf").to_sql_literal(), "'asdf'");
        assert_eq!(Value::from(true).to_sql_literal(), "true");
        assert_eq!(Value::from(0).to_sql_literal(), "0");
        assert_eq!(Value::from(1.5).to_sql_literal(), "1.5");
        assert_eq!(Value::Null.to_sql_literal(), "null");
    }

    #[test]
    fn non_finite_floats_are_null() {
        assert!(Value::from(f64::NAN).is_null());
        assert!(Value::from(f64::INFINITY).is_null());
        assert_eq!(Scalar::Float(f64::NEG_INFINITY).to_sql_literal(), "null");
        assert_eq!(Value::Scalar(Scalar::Float(f64::NAN)).to_sql_literal(), "null");
    }

    #[test]
    fn quotes_are_doubled() {
        assert_eq!(Value::from("O'Brien").to_sql_literal(), "'O''Brien'");
    }

    #[test]
    fn lists_have_no_spaces() {
        assert_eq!(Value::from(["A", "B"]).to_sql_literal(), "('A','B')");
        assert_eq!(Value::from(vec![1, 2, 3]).to_sql_literal(), "(1,2,3)");
    }

    #[test]
    fn nested_lists_flatten() {
        let v = Value::List(vec![Value::from(1), Value::from([2, 3]), Value::Null]);
        assert_eq!(v.flattened().len(), 4);
        assert_eq!(v.to_sql_literal(), "(1,2,3,null)");
        assert!(Value::List(vec![Value::List(Vec::new())]).flattened().is_empty());
    }

    #[test]
    fn option_none_is_null() {
        let v: Value = Option::<i64>::None.into();
        assert!(v.is_null());
        let v: Value = Some("x").into();
        assert_eq!(v, Value::from("x"));
    }

    #[test]
    fn deserializes_by_shape() {
        let v: Value = serde_json::from_str("null").unwrap();
        assert!(v.is_null());
        let v: Value = serde_json::from_str("[1, \"a\"]").unwrap();
        assert_eq!(v, Value::List(vec![Value::from(1), Value::from("a")]));
        let v: Value = serde_json::from_str("42").unwrap();
        assert_eq!(v, Value::from(42));
    }
}
