//! Value conversion strategies for export formats
//!
//! - [`PlainTextConverter`]: universal to-string rule used by markup output
//! - [`JsonConverter`]: structured-document rule, fallible for values JSON
//!   cannot represent
//!
//! Both implement [`ValueConverter`] so writers can be written against the
//! trait and swapped per format.

use serde_json::{Number, Value as JsonValue};

use crate::error::ExportError;
use crate::model::Value;

/// Core trait for value conversion
pub trait ValueConverter {
    /// Output type of the conversion
    type Output;

    /// Convert a value to the output type
    fn convert(&self, value: &Value) -> Self::Output;
}

/// Plain text converter
///
/// Conversion rules:
/// - integers and decimals: canonical text, decimal scale kept (`22.5000`)
/// - floats: shortest round-trip text with at least one fractional digit (`3.0`)
/// - dates: `YYYY-MM-DD`, datetimes: `YYYY-MM-DD HH:MM:SS`
/// - bytes: lowercase hex
/// - null: the configured placeholder, empty by default
///
/// The null rule is lossy: an empty string and NULL render identically.
#[derive(Debug, Clone, Default)]
pub struct PlainTextConverter {
    null_placeholder: String,
}

impl PlainTextConverter {
    /// Create a converter rendering NULL as an empty string
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a converter rendering NULL as `placeholder`
    pub fn with_null_placeholder(placeholder: impl Into<String>) -> Self {
        Self {
            null_placeholder: placeholder.into(),
        }
    }

    fn format_float(f: f64) -> String {
        if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e16 {
            format!("{f:.1}")
        } else {
            f.to_string()
        }
    }
}

impl ValueConverter for PlainTextConverter {
    type Output = String;

    fn convert(&self, value: &Value) -> String {
        match value {
            Value::Integer(n) => n.to_string(),
            Value::Float(f) => Self::format_float(*f),
            Value::Text(s) => s.clone(),
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
            Value::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            Value::Decimal(d) => d.to_string(),
            Value::Bytes(b) => hex::encode(b),
            Value::Null => self.null_placeholder.clone(),
        }
    }
}

/// JSON value converter
///
/// Decimals become the nearest binary float, because JSON has no
/// fixed-point type. The conversion parses the decimal's exact text, which
/// is correctly rounded. Precision beyond ~17 significant digits is lost.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonConverter;

impl JsonConverter {
    const FORMAT: &'static str = "json";

    pub fn new() -> Self {
        Self
    }

    fn float(value: &Value, f: f64) -> Result<JsonValue, ExportError> {
        Number::from_f64(f).map(JsonValue::Number).ok_or_else(|| {
            ExportError::encoding(Self::FORMAT, value.type_name(), format!("{f} is not finite"))
        })
    }

    fn unsupported(value: &Value) -> ExportError {
        ExportError::encoding(
            Self::FORMAT,
            value.type_name(),
            "no JSON representation for this type",
        )
    }
}

impl ValueConverter for JsonConverter {
    type Output = Result<JsonValue, ExportError>;

    fn convert(&self, value: &Value) -> Self::Output {
        match value {
            Value::Integer(n) => Ok(JsonValue::Number((*n).into())),
            Value::Float(f) => Self::float(value, *f),
            Value::Text(s) => Ok(JsonValue::String(s.clone())),
            Value::Decimal(d) => {
                let f: f64 = d.to_string().parse().map_err(|e| {
                    ExportError::encoding(Self::FORMAT, value.type_name(), format!("{e}"))
                })?;
                Self::float(value, f)
            }
            Value::Null => Ok(JsonValue::Null),
            Value::Date(_) | Value::DateTime(_) | Value::Bytes(_) => Err(Self::unsupported(value)),
        }
    }
}
