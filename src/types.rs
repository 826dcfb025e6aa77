//! Core tabular types shared by the normalizer, matcher and reconciler.
//!
//! Both catalogs reach the crate as an in-memory [`DataSet`]: a [`Schema`] (a list of typed
//! [`Field`]s) plus row-major [`Value`] storage. Cells keep whatever type the upstream reader
//! produced; [`Value::coerce_text`] is the single place where a cell turns into text.

use std::borrow::Cow;

/// Logical data type for a schema field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point number.
    Float64,
    /// Boolean.
    Bool,
    /// UTF-8 string.
    Utf8,
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field/column name.
    pub name: String,
    /// Field data type.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// A list of fields describing the shape of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// A single cell value.
///
/// Spreadsheet cells arrive as text, numbers or nothing at all; `Null` is the only value
/// treated as absent.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
}

impl Value {
    /// Shorthand for `Value::Utf8(s.into())`.
    pub fn text(s: impl Into<String>) -> Self {
        Self::Utf8(s.into())
    }

    /// `true` only for [`Value::Null`]; an empty string is a present value.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Textual form of the cell. Never fails.
    ///
    /// Integral floats render without a fractional part, so a numeric spreadsheet cell
    /// holding `1001.0` reads the same as the text `"1001"`. Booleans render as `True` and
    /// `False`; `Null` renders as `""`.
    pub fn coerce_text(&self) -> Cow<'_, str> {
        match self {
            Self::Null => Cow::Borrowed(""),
            Self::Utf8(s) => Cow::Borrowed(s.as_str()),
            Self::Int64(v) => Cow::Owned(v.to_string()),
            Self::Bool(true) => Cow::Borrowed("True"),
            Self::Bool(false) => Cow::Borrowed("False"),
            Self::Float64(v) => Cow::Owned(float_text(*v)),
        }
    }

    /// `Some(self)` unless the value is `Null`.
    pub fn present(&self) -> Option<&Self> {
        if self.is_null() { None } else { Some(self) }
    }
}

fn float_text(v: f64) -> String {
    // Beyond 2^53 an f64 no longer holds every integer exactly.
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 9_007_199_254_740_992.0 {
        format!("{}", v as i64)
    } else {
        v.to_string()
    }
}

/// In-memory tabular dataset.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as the [`Schema`] fields.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl DataSet {
    /// Create a dataset from schema and rows.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    /// Build an all-`Utf8` dataset from column names and string rows.
    ///
    /// `None` cells become [`Value::Null`]. Handy for tests and for callers that already hold
    /// stringly-typed sheets.
    pub fn from_text_rows(columns: &[&str], rows: &[Vec<Option<&str>>]) -> Self {
        let schema = Schema::new(
            columns
                .iter()
                .map(|c| Field::new(*c, DataType::Utf8))
                .collect(),
        );
        let rows = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.map(Value::text).unwrap_or(Value::Null))
                    .collect()
            })
            .collect();
        Self { schema, rows }
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Cell at (`row`, `col`); out-of-range reads yield `Null`.
    pub fn value(&self, row: usize, col: usize) -> &Value {
        const NULL: &Value = &Value::Null;
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(NULL)
    }
}
