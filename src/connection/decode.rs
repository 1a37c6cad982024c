//! MySQL row decoding into [`Value`]s

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use sqlx::mysql::MySqlRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};

use crate::error::{QueryError, Result};
use crate::model::Value;

/// Storage class of a MySQL column, derived from its type name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ColumnKind {
    Boolean,
    Signed,
    Unsigned,
    Decimal,
    Float,
    Date,
    DateTime,
    Text,
    Binary,
}

impl ColumnKind {
    /// Classify a MySQL type name as reported by the driver
    pub(crate) fn from_type_name(name: &str) -> Option<Self> {
        let upper = name.to_ascii_uppercase();
        let kind = match upper.as_str() {
            "BOOLEAN" => ColumnKind::Boolean,
            "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => ColumnKind::Signed,
            "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
            | "BIGINT UNSIGNED" => ColumnKind::Unsigned,
            "DECIMAL" => ColumnKind::Decimal,
            "FLOAT" | "DOUBLE" => ColumnKind::Float,
            "DATE" => ColumnKind::Date,
            "DATETIME" | "TIMESTAMP" => ColumnKind::DateTime,
            "CHAR" | "VARCHAR" | "TEXT" | "TINYTEXT" | "MEDIUMTEXT" | "LONGTEXT" | "ENUM" => {
                ColumnKind::Text
            }
            "BINARY" | "VARBINARY" | "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" => {
                ColumnKind::Binary
            }
            _ => return None,
        };
        Some(kind)
    }
}

/// Decode every column of a row, in column order
pub(crate) fn decode_row(row: &MySqlRow) -> Result<Vec<Value>> {
    (0..row.columns().len())
        .map(|idx| decode_column(row, idx))
        .collect()
}

fn decode_column(row: &MySqlRow, idx: usize) -> Result<Value> {
    let raw = row.try_get_raw(idx)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let type_name = raw.type_info().name().to_string();

    let kind = ColumnKind::from_type_name(&type_name).ok_or_else(|| {
        QueryError::UnsupportedColumnType {
            column: row.columns()[idx].name().to_string(),
            type_name: type_name.clone(),
        }
    })?;

    let value = match kind {
        ColumnKind::Boolean => Value::Integer(i64::from(row.try_get::<bool, _>(idx)?)),
        ColumnKind::Signed => Value::Integer(row.try_get::<i64, _>(idx)?),
        ColumnKind::Unsigned => {
            let n = row.try_get::<u64, _>(idx)?;
            i64::try_from(n)
                .map(Value::Integer)
                .unwrap_or_else(|_| Value::Decimal(Decimal::from(n)))
        }
        ColumnKind::Decimal => Value::Decimal(row.try_get::<Decimal, _>(idx)?),
        ColumnKind::Float => Value::Float(row.try_get::<f64, _>(idx)?),
        ColumnKind::Date => Value::Date(row.try_get::<NaiveDate, _>(idx)?),
        ColumnKind::DateTime => Value::DateTime(row.try_get::<NaiveDateTime, _>(idx)?),
        ColumnKind::Text => Value::Text(row.try_get::<String, _>(idx)?),
        ColumnKind::Binary => Value::Bytes(row.try_get::<Vec<u8>, _>(idx)?),
    };

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_result_types() {
        // COUNT(...) and TIMESTAMPDIFF(...) report BIGINT, AVG(...) reports DECIMAL
        assert_eq!(ColumnKind::from_type_name("BIGINT"), Some(ColumnKind::Signed));
        assert_eq!(ColumnKind::from_type_name("DECIMAL"), Some(ColumnKind::Decimal));
    }

    #[test]
    fn test_schema_column_types() {
        assert_eq!(ColumnKind::from_type_name("INT"), Some(ColumnKind::Signed));
        assert_eq!(ColumnKind::from_type_name("VARCHAR"), Some(ColumnKind::Text));
        assert_eq!(ColumnKind::from_type_name("CHAR"), Some(ColumnKind::Text));
        assert_eq!(ColumnKind::from_type_name("DATE"), Some(ColumnKind::Date));
    }

    #[test]
    fn test_type_name_case_insensitive() {
        assert_eq!(
            ColumnKind::from_type_name("bigint unsigned"),
            Some(ColumnKind::Unsigned)
        );
        assert_eq!(ColumnKind::from_type_name("blob"), Some(ColumnKind::Binary));
    }

    #[test]
    fn test_unknown_type() {
        assert_eq!(ColumnKind::from_type_name("VECTOR"), None);
    }
}
