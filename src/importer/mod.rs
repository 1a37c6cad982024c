//! Dataset import into the relational schema
//!
//! Rooms and students are read from JSON arrays and inserted with
//! multi-row `INSERT IGNORE` statements, so rows whose primary key already
//! exists are skipped rather than failing the import.

use tracing::{debug, info};

use crate::connection::SqlExecutor;
use crate::error::Result;
use crate::model::Value;

mod progress;
mod records;

pub use progress::ProgressTracker;
pub use records::{load_rooms, load_students, InsertRow, Room, Student};

/// Placeholder limit of a single MySQL prepared statement
pub const MAX_PLACEHOLDERS: usize = u16::MAX as usize;

/// Largest batch size every dataset can be inserted with
pub fn max_batch_size() -> usize {
    let widest = Room::COLUMNS.len().max(Student::COLUMNS.len());
    MAX_PLACEHOLDERS / widest
}

/// Inserts datasets in fixed-size batches
#[derive(Debug, Clone)]
pub struct Importer {
    batch_size: usize,
    show_progress: bool,
}

impl Importer {
    /// Create an importer
    ///
    /// # Arguments
    /// * `batch_size` - Rows per `INSERT` statement (at least 1)
    /// * `show_progress` - Whether to draw a progress bar
    pub fn new(batch_size: usize, show_progress: bool) -> Self {
        Self {
            batch_size: batch_size.max(1),
            show_progress,
        }
    }

    /// Insert rooms, returning the number of rows processed
    pub async fn import_rooms<E: SqlExecutor + ?Sized>(
        &self,
        executor: &mut E,
        rooms: &[Room],
    ) -> Result<u64> {
        self.insert_all(executor, rooms).await
    }

    /// Insert students, returning the number of rows processed
    ///
    /// Rooms must be imported first since `students.room` references them.
    pub async fn import_students<E: SqlExecutor + ?Sized>(
        &self,
        executor: &mut E,
        students: &[Student],
    ) -> Result<u64> {
        self.insert_all(executor, students).await
    }

    async fn insert_all<E, T>(&self, executor: &mut E, rows: &[T]) -> Result<u64>
    where
        E: SqlExecutor + ?Sized,
        T: InsertRow + Sync,
    {
        let mut tracker = ProgressTracker::new(T::TABLE, rows.len() as u64, self.show_progress);
        let mut affected = 0u64;
        let batch_size = self.batch_size.min(MAX_PLACEHOLDERS / T::COLUMNS.len());

        for chunk in rows.chunks(batch_size) {
            let sql = insert_statement(T::TABLE, T::COLUMNS, chunk.len());
            let params: Vec<Value> = chunk.iter().flat_map(|row| row.params()).collect();

            match executor.execute(&sql, &params).await {
                Ok(n) => affected += n,
                Err(e) => {
                    tracker.finish();
                    return Err(e);
                }
            }
            tracker.advance(chunk.len() as u64);
            debug!("Inserted batch of {} rows into {}", chunk.len(), T::TABLE);
        }

        tracker.finish();
        info!(
            "Imported {} rows into {} ({} new)",
            tracker.processed(),
            T::TABLE,
            affected
        );
        Ok(tracker.processed())
    }
}

/// Build `INSERT IGNORE INTO table (cols) VALUES (?, ..), (?, ..)`
fn insert_statement(table: &str, columns: &[&str], rows: usize) -> String {
    let placeholders = format!("({})", vec!["?"; columns.len()].join(", "));
    format!(
        "INSERT IGNORE INTO {} ({}) VALUES {}",
        table,
        columns.join(", "),
        vec![placeholders; rows].join(", ")
    )
}
