//! Export module for writing query results to files
//!
//! The export system is built on three parts:
//!
//! 1. **Exporter**: turns a [`ResultSet`] into [`ExportRecord`]s once, at
//!    construction, and drives the write
//! 2. **FormatStrategy**: serializes records to one on-disk format
//!    ([`JsonFormat`], [`XmlFormat`])
//! 3. **ValueConverter**: per-format value rules used by the strategies
//!
//! # Example
//!
//! ```no_run
//! use roomstat::export::{Exporter, JsonFormat};
//! use roomstat::model::ResultSet;
//!
//! # fn main() -> roomstat::Result<()> {
//! let result = ResultSet::new(
//!     vec!["id".into(), "name".into()],
//!     vec![vec![1i64.into(), "Red".into()]],
//! );
//! let exporter = Exporter::new(result, Box::new(JsonFormat::new()));
//! let report = exporter.export("rooms.json")?;
//! println!("{} records written", report.records);
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info};

use crate::error::Result;
use crate::model::{ExportRecord, ResultSet, Value};

pub mod convert;
pub mod writers;

pub use convert::{JsonConverter, PlainTextConverter, ValueConverter};
pub use writers::{ExportFormat, FormatStrategy, JsonFormat, XmlFormat};

/// Result of an export operation
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    /// Destination file
    pub path: PathBuf,
    /// Number of records written
    pub records: usize,
    /// File size in bytes
    pub bytes: u64,
    /// Time taken for export
    pub elapsed_ms: u64,
}

/// Binds export records to a format strategy
///
/// Records are built eagerly so the same data can be written again with a
/// different strategy via [`Exporter::with_strategy`].
pub struct Exporter {
    records: Vec<ExportRecord>,
    strategy: Box<dyn FormatStrategy>,
}

impl Exporter {
    /// Create an exporter from a query result
    pub fn new(result: ResultSet, strategy: Box<dyn FormatStrategy>) -> Self {
        let records = result.into_records();
        debug!("Prepared {} export records", records.len());
        Self { records, strategy }
    }

    /// Create an exporter from column names and rows
    pub fn from_parts(
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
        strategy: Box<dyn FormatStrategy>,
    ) -> Self {
        Self::new(ResultSet::new(columns, rows), strategy)
    }

    /// Swap the strategy, keeping the already built records
    pub fn with_strategy(self, strategy: Box<dyn FormatStrategy>) -> Self {
        Self {
            records: self.records,
            strategy,
        }
    }

    pub fn records(&self) -> &[ExportRecord] {
        &self.records
    }

    /// Write the records to `path` with the bound strategy
    ///
    /// Errors from the strategy are returned unchanged.
    pub fn export(&self, path: impl AsRef<Path>) -> Result<ExportReport> {
        let path = path.as_ref();
        let start_time = Instant::now();

        self.strategy.save(&self.records, path)?;

        let elapsed_ms = start_time.elapsed().as_millis() as u64;
        let bytes = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);

        info!(
            "Exported {} records to {} ({}, {} bytes, {} ms)",
            self.records.len(),
            path.display(),
            self.strategy.name(),
            bytes,
            elapsed_ms
        );

        Ok(ExportReport {
            path: path.to_path_buf(),
            records: self.records.len(),
            bytes,
            elapsed_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ExportError, RoomstatError};
    use std::sync::{Arc, Mutex};

    // Mock strategy recording what it was asked to save
    struct RecordingFormat {
        saved: Arc<Mutex<Vec<(usize, PathBuf)>>>,
        fail: bool,
    }

    impl FormatStrategy for RecordingFormat {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn save(&self, records: &[ExportRecord], path: &Path) -> Result<()> {
            if self.fail {
                return Err(ExportError::encoding("recording", "bytes", "refused").into());
            }
            self.saved
                .lock()
                .unwrap()
                .push((records.len(), path.to_path_buf()));
            Ok(())
        }
    }

    fn result() -> ResultSet {
        ResultSet::new(
            vec!["id".into(), "name".into()],
            vec![vec![1i64.into(), "Red".into()], vec![2i64.into(), "Blue".into()]],
        )
    }

    #[test]
    fn test_records_built_at_construction() {
        let saved = Arc::new(Mutex::new(Vec::new()));
        let exporter = Exporter::new(
            result(),
            Box::new(RecordingFormat {
                saved: saved.clone(),
                fail: false,
            }),
        );

        assert_eq!(exporter.records().len(), 2);
        assert!(saved.lock().unwrap().is_empty());
    }

    #[test]
    fn test_export_delegates_to_strategy() {
        let saved = Arc::new(Mutex::new(Vec::new()));
        let exporter = Exporter::from_parts(
            vec!["id".into()],
            vec![vec![7i64.into()]],
            Box::new(RecordingFormat {
                saved: saved.clone(),
                fail: false,
            }),
        );

        let report = exporter.export("ignored.out").unwrap();
        assert_eq!(report.records, 1);
        assert_eq!(report.bytes, 0);
        assert_eq!(*saved.lock().unwrap(), vec![(1, PathBuf::from("ignored.out"))]);
    }

    #[test]
    fn test_strategy_error_propagates_unchanged() {
        let exporter = Exporter::new(
            result(),
            Box::new(RecordingFormat {
                saved: Arc::new(Mutex::new(Vec::new())),
                fail: true,
            }),
        );

        match exporter.export("x.out") {
            Err(RoomstatError::Export(ExportError::Encoding { format, .. })) => {
                assert_eq!(format, "recording")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_same_records_exported_in_both_formats() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("rooms.json");
        let xml_path = dir.path().join("rooms.xml");

        let exporter = Exporter::new(result(), Box::new(JsonFormat::new()));
        let json_report = exporter.export(&json_path).unwrap();
        let exporter = exporter.with_strategy(Box::new(XmlFormat::new()));
        let xml_report = exporter.export(&xml_path).unwrap();

        assert_eq!(json_report.records, 2);
        assert_eq!(xml_report.records, 2);
        assert!(json_report.bytes > 0);
        let xml = std::fs::read_to_string(&xml_path).unwrap();
        assert_eq!(xml.matches("<item>").count(), 2);
    }
}
