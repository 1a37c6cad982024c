//! Relational schema for rooms and students

use tracing::{debug, info};

use crate::connection::SqlExecutor;
use crate::error::Result;

/// DDL statements in execution order
///
/// `students` references `rooms`, so it is dropped first and created last.
pub const STATEMENTS: &[&str] = &[
    "DROP TABLE IF EXISTS students",
    "DROP TABLE IF EXISTS rooms",
    "CREATE TABLE rooms (\
        id INT PRIMARY KEY, \
        name VARCHAR(255) NOT NULL\
    )",
    "CREATE TABLE students (\
        birthday DATE NOT NULL, \
        id INT PRIMARY KEY, \
        name VARCHAR(255) NOT NULL, \
        room INTEGER, \
        sex CHAR(1) NOT NULL, \
        FOREIGN KEY (room) REFERENCES rooms(id)\
    )",
    "CREATE INDEX idx_students_room_sex ON students(room, sex)",
    "CREATE INDEX idx_students_birthday ON students(birthday)",
];

pub struct Schema;

impl Schema {
    /// Recreate both tables and their indexes
    ///
    /// Existing data is discarded.
    pub async fn create<E: SqlExecutor + ?Sized>(executor: &mut E) -> Result<()> {
        for statement in STATEMENTS {
            debug!("Executing DDL: {}", statement);
            executor.execute(statement, &[]).await?;
        }
        info!("Schema created ({} statements)", STATEMENTS.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::mock::MockExecutor;
    use crate::error::RoomstatError;

    #[tokio::test]
    async fn test_create_runs_statements_in_order() {
        let mut executor = MockExecutor::new();
        Schema::create(&mut executor).await.unwrap();

        let executed: Vec<&str> = executor.statements.iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(executed, STATEMENTS);
        assert!(executed[0].contains("students"));
        assert!(executed[1].contains("rooms"));
        assert!(executed[3].contains("FOREIGN KEY (room) REFERENCES rooms(id)"));
    }

    #[tokio::test]
    async fn test_create_stops_on_first_failure() {
        let mut executor = MockExecutor::new().failing_on("CREATE TABLE students");
        let result = Schema::create(&mut executor).await;

        assert!(matches!(
            result,
            Err(RoomstatError::Database(sqlx::Error::RowNotFound))
        ));
        assert_eq!(executor.statements.len(), 3);
    }
}
