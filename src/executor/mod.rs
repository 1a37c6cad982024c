//! Batch pipeline: schema, import, queries, export
//!
//! Each stage runs in its own [`Session`](crate::connection::Session) so a
//! failing stage is rolled back on its own. The schema stage gets a session
//! of its own because MySQL commits DDL implicitly.

use std::fs;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::config::{Config, ExportConfig};
use crate::connection::{ConnectionManager, SqlExecutor};
use crate::error::{ExportError, Result};
use crate::export::{ExportFormat, ExportReport, Exporter};
use crate::importer::{load_rooms, load_students, Importer, Room, Student};
use crate::queries::{NamedQuery, QueryCatalog};
use crate::schema::Schema;

mod summary;

pub use summary::render_summary;

/// Input files and output format of one batch run
#[derive(Debug, Clone)]
pub struct BatchInputs {
    pub rooms: PathBuf,
    pub students: PathBuf,
    pub format: ExportFormat,
}

/// One exported query result
#[derive(Debug, Clone, PartialEq)]
pub struct QueryExport {
    pub query: NamedQuery,
    pub report: ExportReport,
}

/// Runs the whole batch against a MySQL server
pub struct BatchExecutor {
    config: Config,
    quiet: bool,
}

impl BatchExecutor {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            quiet: false,
        }
    }

    /// Suppress the summary table
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Run the batch
    ///
    /// Datasets are parsed before connecting. The pool is closed on every
    /// exit path once connected.
    ///
    /// # Returns
    /// * `Result<Vec<QueryExport>>` - One entry per exported file
    pub async fn run(&self, inputs: &BatchInputs) -> Result<Vec<QueryExport>> {
        let rooms = load_rooms(&inputs.rooms)?;
        let students = load_students(&inputs.students)?;

        let mut manager = ConnectionManager::new(self.config.connection.clone());
        manager.connect().await?;

        let outcome = self
            .run_stages(&manager, &rooms, &students, inputs.format)
            .await;
        manager.disconnect().await;

        let exports = outcome?;
        if !self.quiet {
            println!("{}", render_summary(&exports));
        }
        Ok(exports)
    }

    async fn run_stages(
        &self,
        manager: &ConnectionManager,
        rooms: &[Room],
        students: &[Student],
        format: ExportFormat,
    ) -> Result<Vec<QueryExport>> {
        let mut session = manager.begin("schema").await?;
        let outcome = Schema::create(&mut session).await;
        session.finish(outcome).await?;

        let importer = Importer::new(self.config.import.batch_size, self.config.export.progress);
        let mut session = manager.begin("import").await?;
        let outcome = import_datasets(&importer, &mut session, rooms, students).await;
        if outcome.is_err() {
            warn!("Import failed, discarding imported rows");
        }
        session.finish(outcome).await?;

        let mut session = manager.begin("queries").await?;
        let outcome = export_all(&mut session, format, &self.config.export).await;
        session.finish(outcome).await
    }
}

/// Rooms first, since students reference them
async fn import_datasets<E: SqlExecutor + ?Sized>(
    importer: &Importer,
    executor: &mut E,
    rooms: &[Room],
    students: &[Student],
) -> Result<u64> {
    let rooms_imported = importer.import_rooms(executor, rooms).await?;
    let students_imported = importer.import_students(executor, students).await?;
    Ok(rooms_imported + students_imported)
}

/// Run every named query and export each result to `output_dir`
///
/// Files are named `<file_stem>.<extension>`. The first failure aborts the
/// remaining exports; files already written are kept.
pub async fn export_all<E: SqlExecutor + ?Sized>(
    executor: &mut E,
    format: ExportFormat,
    config: &ExportConfig,
) -> Result<Vec<QueryExport>> {
    fs::create_dir_all(&config.output_dir)
        .map_err(|e| ExportError::io(config.output_dir.clone(), e))?;

    let mut catalog = QueryCatalog::new(executor);
    let mut exports = Vec::with_capacity(NamedQuery::ALL.len());

    for query in NamedQuery::ALL {
        let result = catalog.run(query).await?;
        let file_name = format!("{}.{}", query.file_stem(), format.extension());
        let path = config.output_dir.join(&file_name);

        let report = Exporter::new(result, format.strategy(config)).export(&path)?;
        println!("Exported to file {} successfully.", file_name);

        exports.push(QueryExport { query, report });
    }

    info!("Exported {} query results as {}", exports.len(), format.extension());
    Ok(exports)
}
