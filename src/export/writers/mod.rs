//! Format strategies for export operations
//!
//! This module provides a unified interface for writing export records to
//! different file formats (JSON documents, XML trees).

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ExportConfig;
use crate::error::{ExportError, Result};
use crate::model::ExportRecord;

pub mod json;
pub mod xml;

pub use json::JsonFormat;
pub use xml::XmlFormat;

/// Trait for serializing export records to a destination file
///
/// The output format is decided by the implementation alone; the
/// destination's extension is never consulted.
pub trait FormatStrategy: Send + Sync {
    /// Short format name used in logs and errors
    fn name(&self) -> &'static str;

    /// Serialize `records` and write them to `path`, replacing any existing file
    ///
    /// # Arguments
    /// * `records` - Records to write, in output order
    /// * `path` - Destination file path
    ///
    /// # Returns
    /// * `Result<()>` - Success or I/O / encoding error
    fn save(&self, records: &[ExportRecord], path: &Path) -> Result<()>;
}

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Pretty-printed JSON array of objects
    Json,
    /// XML document with `<results>` root and `<item>` children
    Xml,
}

impl ExportFormat {
    /// Conventional file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Xml => "xml",
        }
    }

    /// Build the strategy for this format from export settings
    pub fn strategy(&self, config: &ExportConfig) -> Box<dyn FormatStrategy> {
        match self {
            ExportFormat::Json => Box::new(JsonFormat::with_indent(config.json_indent)),
            ExportFormat::Xml => Box::new(XmlFormat::with_null_placeholder(
                config.xml_null_placeholder.clone(),
            )),
        }
    }
}

/// Helper function to validate the destination's parent directory
///
/// # Arguments
/// * `path` - File path to validate
///
/// # Returns
/// * `Result<()>` - Success or error
pub(crate) fn validate_path(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(ExportError::InvalidPath("empty destination path".to_string()).into());
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            let source = io::Error::new(
                io::ErrorKind::NotFound,
                format!("directory {} does not exist", parent.display()),
            );
            return Err(ExportError::io(path, source).into());
        }
    }

    Ok(())
}

/// Write a fully encoded document to `path` (truncate, then write)
///
/// A failure after the file was opened can leave a partially written file.
pub(crate) fn write_document(path: &Path, bytes: &[u8]) -> Result<()> {
    validate_path(path)?;

    let file = File::create(path).map_err(|e| ExportError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    writer.write_all(bytes).map_err(|e| ExportError::io(path, e))?;
    writer.flush().map_err(|e| ExportError::io(path, e))?;

    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
