//! In-memory tabular data consumed by the inference engine.
//!
//! Tables are owned by the caller. The engine only reads them, so a single
//! snapshot can be shared across concurrent detection runs.
//!
//! Cells are compared through their canonical text rendering (see
//! [`Value::render`]), which keeps every signal independent of how the
//! collaborator that produced the table typed its values.

use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single scalar cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// A datetime in its textual (usually ISO 8601) form.
    Timestamp(String),
    Text(String),
}

impl Value {
    /// True for `Null` and for floating-point NaN.
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// Canonical text rendering, or `None` for nulls.
    ///
    /// Floats always carry a fractional part (`5.0`), booleans render as
    /// `True`/`False`.
    pub fn render(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::Null => None,
            Value::Float(f) if f.is_nan() => None,
            Value::Bool(true) => Some(Cow::Borrowed("True")),
            Value::Bool(false) => Some(Cow::Borrowed("False")),
            Value::Int(i) => Some(Cow::Owned(i.to_string())),
            Value::Float(f) => Some(Cow::Owned(render_float(*f))),
            Value::Timestamp(s) | Value::Text(s) => Some(Cow::Borrowed(s.as_str())),
        }
    }

    /// Type class of a non-null value.
    fn type_class(&self) -> Option<TypeClass> {
        match self {
            _ if self.is_null() => None,
            Value::Bool(_) | Value::Int(_) | Value::Float(_) => Some(TypeClass::Numeric),
            Value::Timestamp(_) => Some(TypeClass::Datetime),
            _ => Some(TypeClass::String),
        }
    }
}

fn render_float(f: f64) -> String {
    if f.is_infinite() {
        return if f > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let mut buf = ryu::Buffer::new();
    buf.format_finite(f).to_string()
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// The three comparability classes of a column.
///
/// Value-based signals only compare columns of the same class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeClass {
    Numeric,
    Datetime,
    String,
}

impl fmt::Display for TypeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric => write!(f, "numeric"),
            Self::Datetime => write!(f, "datetime"),
            Self::String => write!(f, "string"),
        }
    }
}

/// A named column of values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(
        name: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Self {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Derive the type class from the non-null values.
    ///
    /// All numeric (including booleans) → numeric, all timestamps → datetime.
    /// Mixed, empty and all-null columns are strings.
    pub fn type_class(&self) -> TypeClass {
        let mut classes = self.values.iter().filter_map(Value::type_class);
        let Some(first) = classes.next() else {
            return TypeClass::String;
        };
        if classes.all(|c| c == first) {
            first
        } else {
            TypeClass::String
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }

    /// Number of distinct non-null values, compared by rendering.
    pub fn distinct_count(&self) -> usize {
        self.values
            .iter()
            .filter_map(Value::render)
            .collect::<HashSet<_>>()
            .len()
    }

    /// Rendered non-null values in row order.
    pub fn rendered(&self) -> impl Iterator<Item = Cow<'_, str>> {
        self.values.iter().filter_map(Value::render)
    }
}

/// A named, ordered set of columns.
///
/// Column names are expected to be unique and all columns to have the same
/// length; neither is checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Builder: append a column.
    pub fn with_column(
        mut self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Self {
        self.columns.push(Column::new(name, values));
        self
    }

    pub fn push_column(&mut self, column: Column) {
        self.columns.push(column);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Row count, taken from the first column.
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_values() {
        assert_eq!(Value::Int(42).render().as_deref(), Some("42"));
        assert_eq!(Value::Float(5.0).render().as_deref(), Some("5.0"));
        assert_eq!(Value::Float(0.25).render().as_deref(), Some("0.25"));
        assert_eq!(Value::Bool(true).render().as_deref(), Some("True"));
        assert_eq!(Value::from("abc").render().as_deref(), Some("abc"));
        assert_eq!(Value::Null.render(), None);
        assert_eq!(Value::Float(f64::NAN).render(), None);
    }

    #[test]
    fn test_nan_is_null() {
        assert!(Value::Float(f64::NAN).is_null());
        assert!(!Value::Float(1.0).is_null());
    }

    #[test]
    fn test_type_class_derivation() {
        let ints = Column::new("a", [Some(1), None, Some(3)]);
        assert_eq!(ints.type_class(), TypeClass::Numeric);

        let mixed_numeric = Column::new(
            "b",
            vec![Value::Int(1), Value::Float(2.5), Value::Bool(true)],
        );
        assert_eq!(mixed_numeric.type_class(), TypeClass::Numeric);

        let stamps = Column::new("c", vec![Value::Timestamp("2024-01-01".into()), Value::Null]);
        assert_eq!(stamps.type_class(), TypeClass::Datetime);

        let mixed = Column::new("d", vec![Value::Int(1), Value::from("x")]);
        assert_eq!(mixed.type_class(), TypeClass::String);

        let empty = Column::new("e", Vec::<Value>::new());
        assert_eq!(empty.type_class(), TypeClass::String);

        let all_null = Column::new("f", vec![Value::Null, Value::Null]);
        assert_eq!(all_null.type_class(), TypeClass::String);
    }

    #[test]
    fn test_distinct_and_nulls() {
        let col = Column::new("x", [Some("a"), Some("b"), None, Some("a")]);
        assert_eq!(col.distinct_count(), 2);
        assert_eq!(col.null_count(), 1);
        assert_eq!(col.len(), 4);
    }

    #[test]
    fn test_table_builder() {
        let table = Table::new("orders")
            .with_column("order_id", [1, 2, 3])
            .with_column("amount", [9.5, 3.0, 1.25]);

        assert_eq!(table.name(), "orders");
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column_count(), 2);
        assert!(table.column("amount").is_some());
        assert!(table.column("missing").is_none());
        assert_eq!(Table::new("empty").row_count(), 0);
    }
}
