//! Database Value Types
//!
//! This module provides the `DatabaseValue` enum, the single dynamic value type
//! that flows through records, query arguments and result rows, and the `Row`
//! mapping the executor hands back for every fetched row.
//!
//! ## Features
//!
//! - **Null Support**: `DatabaseValue::Null` binds as SQL `NULL`
//! - **Automatic Conversion**: `From` implementations for common Rust types
//! - **Truthiness**: the falsy test used when resolving field defaults
//! - **Serde Integration**: values serialize untagged, so records render as plain JSON

use serde::Serialize;
use std::fmt::{self, Display};

/// Represents a dynamically typed database value.
///
/// # Variants
///
/// - `Null` - SQL `NULL`
/// - `Boolean(bool)` - `boolean` / `tinyint(1)` columns
/// - `Int(i64)` - any integer column
/// - `Float(f64)` - `real`, `float` and `double` columns
/// - `String(String)` - `varchar` and friends
/// - `Text(String)` - large `text` columns (binds exactly like `String`)
///
/// # Examples
///
/// ```rust
/// use tablemodel::DatabaseValue;
///
/// let value: DatabaseValue = "hello".into();
/// let value: DatabaseValue = 42i64.into();
/// let value: DatabaseValue = 3.14f64.into();
/// let value: DatabaseValue = true.into();
/// let value: DatabaseValue = None::<String>.into();
/// assert_eq!(value, DatabaseValue::Null);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum DatabaseValue {
    #[default]
    Null,
    Boolean(bool),
    Int(i64),
    Float(f64),
    String(String),
    Text(String),
}

impl DatabaseValue {
    pub fn is_null(&self) -> bool {
        matches!(self, DatabaseValue::Null)
    }

    /// Whether the value counts as "set" when resolving defaults.
    ///
    /// `Null`, empty strings, zero and `false` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            DatabaseValue::Null => false,
            DatabaseValue::Boolean(b) => *b,
            DatabaseValue::Int(i) => *i != 0,
            DatabaseValue::Float(f) => *f != 0.0,
            DatabaseValue::String(s) | DatabaseValue::Text(s) => !s.is_empty(),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DatabaseValue::Int(i) => Some(*i),
            DatabaseValue::Boolean(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DatabaseValue::Float(f) => Some(*f),
            DatabaseValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DatabaseValue::String(s) | DatabaseValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DatabaseValue::Boolean(b) => Some(*b),
            DatabaseValue::Int(i) => Some(*i != 0),
            _ => None,
        }
    }
}

impl Display for DatabaseValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseValue::Null => f.write_str("NULL"),
            DatabaseValue::Boolean(b) => write!(f, "{}", b),
            DatabaseValue::Int(i) => write!(f, "{}", i),
            DatabaseValue::Float(x) => write!(f, "{}", x),
            DatabaseValue::String(s) | DatabaseValue::Text(s) => write!(f, "{:?}", s),
        }
    }
}

impl From<&str> for DatabaseValue {
    fn from(s: &str) -> Self {
        DatabaseValue::String(s.to_string())
    }
}

impl From<String> for DatabaseValue {
    fn from(s: String) -> Self {
        DatabaseValue::String(s)
    }
}

impl From<&'_ String> for DatabaseValue {
    fn from(s: &'_ String) -> Self {
        DatabaseValue::String(s.clone())
    }
}

impl From<bool> for DatabaseValue {
    fn from(b: bool) -> Self {
        DatabaseValue::Boolean(b)
    }
}

impl From<i32> for DatabaseValue {
    fn from(i: i32) -> Self {
        DatabaseValue::Int(i64::from(i))
    }
}

impl From<i64> for DatabaseValue {
    fn from(i: i64) -> Self {
        DatabaseValue::Int(i)
    }
}

impl From<u32> for DatabaseValue {
    fn from(i: u32) -> Self {
        DatabaseValue::Int(i64::from(i))
    }
}

impl From<f32> for DatabaseValue {
    fn from(f: f32) -> Self {
        DatabaseValue::Float(f64::from(f))
    }
}

impl From<f64> for DatabaseValue {
    fn from(f: f64) -> Self {
        DatabaseValue::Float(f)
    }
}

impl<T> From<Option<T>> for DatabaseValue
where
    T: Into<DatabaseValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(DatabaseValue::Null)
    }
}

/// One fetched row: column name to value, in the order the driver reported
/// the columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    columns: Vec<(String, DatabaseValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column, replacing the value if the name is already present.
    pub fn push(&mut self, column: impl Into<String>, value: impl Into<DatabaseValue>) {
        let column = column.into();
        let value = value.into();
        match self.columns.iter_mut().find(|(name, _)| *name == column) {
            Some((_, existing)) => *existing = value,
            None => self.columns.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&DatabaseValue> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DatabaseValue)> {
        self.columns
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<String>,
    V: Into<DatabaseValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (column, value) in iter {
            row.push(column, value);
        }
        row
    }
}

impl IntoIterator for Row {
    type Item = (String, DatabaseValue);
    type IntoIter = std::vec::IntoIter<(String, DatabaseValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.into_iter()
    }
}
