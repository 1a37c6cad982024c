//! Room statistics library
//!
//! Loads room and student datasets into MySQL, runs a fixed set of
//! analytical queries and exports each result as JSON or XML.
//!
//! # Modules
//!
//! - `cli`: Command-line interface and argument parsing
//! - `config`: Configuration management
//! - `connection`: MySQL connection, sessions and the query-execution interface
//! - `error`: Error types and handling
//! - `executor`: The batch pipeline
//! - `export`: Result serialization (JSON, XML)
//! - `importer`: Dataset loading and insertion
//! - `model`: Result sets, export records and values
//! - `queries`: The analytical query catalog
//! - `schema`: Table and index creation
//!
//! # Example
//!
//! ```no_run
//! use roomstat::config::Config;
//! use roomstat::executor::{BatchExecutor, BatchInputs};
//! use roomstat::export::ExportFormat;
//!
//! #[tokio::main]
//! async fn main() -> roomstat::Result<()> {
//!     let inputs = BatchInputs {
//!         rooms: "rooms.json".into(),
//!         students: "students.json".into(),
//!         format: ExportFormat::Json,
//!     };
//!     let exports = BatchExecutor::new(Config::default()).run(&inputs).await?;
//!     println!("{} files written", exports.len());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod connection;
pub mod error;
pub mod executor;
pub mod export;
pub mod importer;
pub mod model;
pub mod queries;
pub mod schema;

// Re-export commonly used types
pub use config::Config;
pub use connection::{ConnectionManager, Session, SqlExecutor};
pub use error::{Result, RoomstatError};
pub use executor::{BatchExecutor, BatchInputs};
pub use export::{ExportFormat, Exporter, FormatStrategy};
pub use model::{ExportRecord, ResultSet, Value};
pub use queries::{NamedQuery, QueryCatalog};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
