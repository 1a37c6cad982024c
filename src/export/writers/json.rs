//! JSON writer for export operations
//!
//! Writes the whole record sequence as one pretty-printed JSON array of
//! objects. Keys keep column order.

use std::path::Path;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::{Map, Value as JsonValue};
use tracing::debug;

use crate::error::{ExportError, Result};
use crate::export::convert::{JsonConverter, ValueConverter};
use crate::model::ExportRecord;

use super::{write_document, FormatStrategy};

/// Structured-document strategy
///
/// Every record is encoded before the destination is opened, so an
/// encoding failure leaves the destination untouched.
#[derive(Debug, Clone)]
pub struct JsonFormat {
    /// Indentation width in spaces
    indent: usize,
    /// Converter for values to JSON
    converter: JsonConverter,
}

impl JsonFormat {
    /// Create a JSON strategy with 2-space indentation
    pub fn new() -> Self {
        Self::with_indent(2)
    }

    pub fn with_indent(indent: usize) -> Self {
        Self {
            indent,
            converter: JsonConverter::new(),
        }
    }

    /// Convert records to a JSON array value
    fn to_json(&self, records: &[ExportRecord]) -> std::result::Result<JsonValue, ExportError> {
        records
            .iter()
            .map(|record| {
                record
                    .iter()
                    .map(|(key, value)| Ok((key.to_string(), self.converter.convert(value)?)))
                    .collect::<std::result::Result<Map<String, JsonValue>, ExportError>>()
                    .map(JsonValue::Object)
            })
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(JsonValue::Array)
    }

    /// Encode records to pretty-printed JSON text
    pub fn encode(&self, records: &[ExportRecord]) -> Result<Vec<u8>> {
        let document = self.to_json(records)?;

        let indent = " ".repeat(self.indent);
        let mut buf = Vec::new();
        let mut serializer =
            Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(indent.as_bytes()));
        document.serialize(&mut serializer).map_err(|e| {
            ExportError::encoding("json", "document", format!("serialization failed: {e}"))
        })?;
        buf.push(b'\n');

        Ok(buf)
    }
}

impl Default for JsonFormat {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatStrategy for JsonFormat {
    fn name(&self) -> &'static str {
        "json"
    }

    fn save(&self, records: &[ExportRecord], path: &Path) -> Result<()> {
        let bytes = self.encode(records)?;
        write_document(path, &bytes)?;

        debug!("Saved {} records as JSON to {}", records.len(), path.display());
        Ok(())
    }
}
