//! Query results and their export-ready record form

use super::Value;

/// Column names plus positionally aligned rows, as produced by one query
///
/// Every row is expected to hold exactly one value per column; the query
/// layer guarantees this and nothing here re-checks it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    /// Column names in declaration order
    pub columns: Vec<String>,
    /// Rows in engine order
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    /// Result with columns but no rows
    pub fn empty(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Zip column names with each row, one record per row, row order kept
    pub fn to_records(&self) -> Vec<ExportRecord> {
        self.rows
            .iter()
            .map(|row| ExportRecord::zip(&self.columns, row.iter().cloned()))
            .collect()
    }

    /// Consuming variant of [`ResultSet::to_records`]
    pub fn into_records(self) -> Vec<ExportRecord> {
        let columns = self.columns;
        self.rows
            .into_iter()
            .map(|row| ExportRecord::zip(&columns, row))
            .collect()
    }
}

/// One row as an ordered key/value structure
///
/// Keys keep column order, which is the serialization order of every
/// format strategy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportRecord {
    fields: Vec<(String, Value)>,
}

impl ExportRecord {
    fn zip(columns: &[String], values: impl IntoIterator<Item = Value>) -> Self {
        Self {
            fields: columns.iter().cloned().zip(values).collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
