//! Dynamic values for heterogeneous keys and cached data.
//!
//! [`Value`] is an owned superset of the JSON data model: it adds calendar
//! dates (compared by instant) and big integers, the two non-JSON-native
//! shapes the serialized storage codec knows how to round-trip. Caches that
//! need uniform keys across call sites — the memoization wrapper derives its
//! lookup key from an argument list, the serialized storage persists whole
//! item lists — use `Cache<Value, Value>`.
//!
//! Equality is structural: object entries compare independently of their
//! insertion order, arrays compare by index, and no numeric coercion happens
//! across variants (`Int(1)` is not `Float(1.0)`).
//!
//! ```
//! use cache_manager::Value;
//!
//! let a = Value::object([("x", Value::from(1)), ("y", Value::from(2))]);
//! let b = Value::object([("y", Value::from(2)), ("x", Value::from(1))]);
//! assert_eq!(a, b);
//!
//! assert_ne!(Value::array([1.into(), 2.into()]), Value::array([2.into(), 1.into()]));
//! ```

use std::fmt;

use chrono::{DateTime, Utc};

use crate::structural::StructuralEq;

/// An owned dynamic value: JSON plus dates and big integers.
///
/// Being a tree of owned data, `Value` cannot form reference cycles, so
/// cloning and comparison always terminate. Duplicated substructure in a
/// source object graph arrives here as independent copies.
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    BigInt(i128),
    Float(f64),
    Str(String),
    Date(DateTime<Utc>),
    Array(Vec<Value>),
    /// Object entries in insertion order. Comparison ignores the order;
    /// the serialized form sorts keys.
    Object(Vec<(String, Value)>),
}

impl Value {
    /// Builds an object value from `(key, value)` entries.
    pub fn object<I, S>(entries: I) -> Value
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        Value::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Builds an array value.
    pub fn array<I>(items: I) -> Value
    where
        I: IntoIterator<Item = Value>,
    {
        Value::Array(items.into_iter().collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Looks up an object entry by key. Returns `None` for non-objects.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }
}

impl StructuralEq for Value {
    fn structural_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            // NaN stays unequal to everything, including itself.
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.structural_eq(y))
            }
            (Value::Object(a), Value::Object(b)) => {
                if a.len() != b.len() {
                    return false;
                }
                let mut left: Vec<&(String, Value)> = a.iter().collect();
                let mut right: Vec<&(String, Value)> = b.iter().collect();
                left.sort_by(|x, y| x.0.cmp(&y.0));
                right.sort_by(|x, y| x.0.cmp(&y.0));
                left.iter()
                    .zip(right.iter())
                    .all(|(x, y)| x.0 == y.0 && x.1.structural_eq(&y.1))
            }
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.structural_eq(other)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::BigInt(b) => write!(f, "{b}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Date(d) => write!(f, "{}", d.to_rfc3339()),
            Value::Array(items) => f.debug_list().entries(items.iter()).finish(),
            Value::Object(entries) => f
                .debug_map()
                .entries(entries.iter().map(|(k, v)| (k, v)))
                .finish(),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i128> for Value {
    fn from(i: i128) -> Self {
        Value::BigInt(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(d: DateTime<Utc>) -> Self {
        Value::Date(d)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}
