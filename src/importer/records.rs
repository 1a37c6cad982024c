//! Input records and dataset loading

use std::fs;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::error::{ImportError, Result};
use crate::model::Value;

/// A row type that can be inserted with a positional statement
pub trait InsertRow {
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];

    /// Values in `COLUMNS` order
    fn params(&self) -> Vec<Value>;
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Room {
    pub id: i64,
    pub name: String,
}

impl InsertRow for Room {
    const TABLE: &'static str = "rooms";
    const COLUMNS: &'static [&'static str] = &["id", "name"];

    fn params(&self) -> Vec<Value> {
        vec![Value::Integer(self.id), Value::Text(self.name.clone())]
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Student {
    #[serde(deserialize_with = "deserialize_birthday")]
    pub birthday: NaiveDate,
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub room: Option<i64>,
    pub sex: String,
}

impl InsertRow for Student {
    const TABLE: &'static str = "students";
    const COLUMNS: &'static [&'static str] = &["birthday", "id", "name", "room", "sex"];

    fn params(&self) -> Vec<Value> {
        vec![
            Value::Date(self.birthday),
            Value::Integer(self.id),
            Value::Text(self.name.clone()),
            self.room.into(),
            Value::Text(self.sex.clone()),
        ]
    }
}

/// Parse a birthday given as `YYYY-MM-DD` or an ISO datetime
///
/// The time part, if any, is dropped.
pub(crate) fn parse_birthday(text: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|dt| dt.date())
}

fn deserialize_birthday<'de, D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    parse_birthday(&text)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid birthday '{text}'")))
}

fn load<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>> {
    let content = fs::read_to_string(path).map_err(|source| ImportError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let records: Vec<T> = serde_json::from_str(&content).map_err(|source| ImportError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Load the rooms dataset, a JSON array of `{id, name}` objects
pub fn load_rooms(path: impl AsRef<Path>) -> Result<Vec<Room>> {
    load(path.as_ref())
}

/// Load the students dataset
pub fn load_students(path: impl AsRef<Path>) -> Result<Vec<Student>> {
    load(path.as_ref())
}
