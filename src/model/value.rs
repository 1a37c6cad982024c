//! Typed cell values
//!
//! A [`Value`] is one cell of a query result. The set of variants mirrors
//! what the relational engine can hand back for the analytical queries,
//! plus binary data, which some formats cannot represent.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

/// A single typed value aligned to a result column
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Signed integer (INT, BIGINT, COUNT results, ...)
    Integer(i64),

    /// Binary floating point (FLOAT, DOUBLE)
    Float(f64),

    /// Character data
    Text(String),

    /// Calendar date without time
    Date(NaiveDate),

    /// Date and time without zone
    DateTime(NaiveDateTime),

    /// Exact base-10 fixed-point number (DECIMAL, AVG results)
    Decimal(Decimal),

    /// Raw binary data
    Bytes(Vec<u8>),

    /// SQL NULL
    Null,
}

impl Value {
    /// Stable lowercase type name, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "string",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::Decimal(_) => "decimal",
            Value::Bytes(_) => "bytes",
            Value::Null => "null",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Decimal(d)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}
