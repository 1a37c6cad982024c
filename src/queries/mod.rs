//! Analytical queries over rooms and students
//!
//! Each query returns a fresh [`ResultSet`]. Ordering among ties in the
//! top-N queries is whatever the engine returns and may differ between runs.

use std::fmt;

use tracing::debug;

use crate::connection::SqlExecutor;
use crate::error::Result;
use crate::model::ResultSet;

/// Number of rooms returned by the ranking queries
pub const TOP_N: u32 = 5;

/// The fixed set of analytical queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedQuery {
    /// Students per room, rooms without students included
    CountPerGroup,
    /// Rooms with the youngest average student age
    SmallestAverageAge,
    /// Rooms with the widest age range among their students
    LargestAgeSpread,
    /// Rooms housing more than one sex
    MixedGroups,
}

impl NamedQuery {
    /// All queries in export order
    pub const ALL: [NamedQuery; 4] = [
        NamedQuery::CountPerGroup,
        NamedQuery::SmallestAverageAge,
        NamedQuery::LargestAgeSpread,
        NamedQuery::MixedGroups,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            NamedQuery::CountPerGroup => "count_per_group",
            NamedQuery::SmallestAverageAge => "smallest_average_age",
            NamedQuery::LargestAgeSpread => "largest_age_spread",
            NamedQuery::MixedGroups => "mixed_groups",
        }
    }

    /// Output file name without extension
    pub fn file_stem(&self) -> &'static str {
        match self {
            NamedQuery::CountPerGroup => "student_count",
            NamedQuery::SmallestAverageAge => "smallest_avg_age",
            NamedQuery::LargestAgeSpread => "largest_age_diff",
            NamedQuery::MixedGroups => "mixed_sex_rooms",
        }
    }

    pub fn sql(&self) -> String {
        match self {
            NamedQuery::CountPerGroup => "SELECT r.id, r.name, COUNT(s.id) AS student_count \
                 FROM rooms r \
                 LEFT JOIN students s ON r.id = s.room \
                 GROUP BY r.id, r.name"
                .to_string(),
            NamedQuery::SmallestAverageAge => format!(
                "SELECT r.id, r.name, \
                 CAST(FLOOR(AVG(TIMESTAMPDIFF(YEAR, s.birthday, CURDATE()))) AS SIGNED) AS avg_age \
                 FROM rooms r \
                 JOIN students s ON r.id = s.room \
                 GROUP BY r.id, r.name \
                 ORDER BY AVG(TIMESTAMPDIFF(YEAR, s.birthday, CURDATE())) ASC \
                 LIMIT {TOP_N}"
            ),
            NamedQuery::LargestAgeSpread => format!(
                "SELECT r.id, r.name, \
                 TIMESTAMPDIFF(YEAR, MIN(s.birthday), MAX(s.birthday)) AS age_diff \
                 FROM rooms r \
                 JOIN students s ON r.id = s.room \
                 GROUP BY r.id, r.name \
                 ORDER BY age_diff DESC \
                 LIMIT {TOP_N}"
            ),
            NamedQuery::MixedGroups => "SELECT r.id, r.name \
                 FROM rooms r \
                 JOIN students s ON r.id = s.room \
                 GROUP BY r.id, r.name \
                 HAVING COUNT(DISTINCT s.sex) > 1"
                .to_string(),
        }
    }
}

impl fmt::Display for NamedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Runs the named queries through a borrowed executor
pub struct QueryCatalog<'a, E: SqlExecutor + ?Sized> {
    executor: &'a mut E,
}

impl<'a, E: SqlExecutor + ?Sized> QueryCatalog<'a, E> {
    pub fn new(executor: &'a mut E) -> Self {
        Self { executor }
    }

    /// Columns `(id, name, student_count)`, one row per room
    pub async fn count_per_group(&mut self) -> Result<ResultSet> {
        self.run(NamedQuery::CountPerGroup).await
    }

    /// Columns `(id, name, avg_age)`, youngest rooms first
    ///
    /// `avg_age` is the mean of whole-year ages, floored to whole years.
    pub async fn smallest_average_age(&mut self) -> Result<ResultSet> {
        self.run(NamedQuery::SmallestAverageAge).await
    }

    /// Columns `(id, name, age_diff)`, widest spread first
    pub async fn largest_age_spread(&mut self) -> Result<ResultSet> {
        self.run(NamedQuery::LargestAgeSpread).await
    }

    /// Columns `(id, name)`
    pub async fn mixed_groups(&mut self) -> Result<ResultSet> {
        self.run(NamedQuery::MixedGroups).await
    }

    /// Run one query; engine errors are returned unchanged
    pub async fn run(&mut self, query: NamedQuery) -> Result<ResultSet> {
        debug!("Running query {}", query);
        let result = self.executor.query(&query.sql()).await?;
        debug!("Query {} returned {} rows", query, result.row_count());
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::mock::MockExecutor;
    use crate::error::RoomstatError;
    use crate::model::Value;

    #[test]
    fn test_file_stems() {
        let stems: Vec<&str> = NamedQuery::ALL.iter().map(NamedQuery::file_stem).collect();
        assert_eq!(
            stems,
            vec!["student_count", "smallest_avg_age", "largest_age_diff", "mixed_sex_rooms"]
        );
    }

    #[test]
    fn test_query_shapes() {
        let count = NamedQuery::CountPerGroup.sql();
        assert!(count.contains("LEFT JOIN students"));
        assert!(count.contains("AS student_count"));

        let avg = NamedQuery::SmallestAverageAge.sql();
        assert!(avg.contains("CAST(FLOOR(AVG(TIMESTAMPDIFF(YEAR, s.birthday, CURDATE()))) AS SIGNED) AS avg_age"));
        assert!(avg.contains("ORDER BY AVG(TIMESTAMPDIFF(YEAR, s.birthday, CURDATE())) ASC"));
        assert!(avg.ends_with("LIMIT 5"));
        assert!(!avg.contains("LEFT JOIN"));

        let spread = NamedQuery::LargestAgeSpread.sql();
        assert!(spread.contains("ORDER BY age_diff DESC"));
        assert!(spread.ends_with("LIMIT 5"));

        assert!(NamedQuery::MixedGroups
            .sql()
            .contains("HAVING COUNT(DISTINCT s.sex) > 1"));
    }

    #[tokio::test]
    async fn test_catalog_returns_executor_result() {
        let expected = ResultSet::new(
            vec!["id".into(), "name".into(), "student_count".into()],
            vec![vec![Value::Integer(1), "Red".into(), Value::Integer(3)]],
        );
        let mut executor = MockExecutor::with_responses(vec![expected.clone()]);

        let result = QueryCatalog::new(&mut executor)
            .count_per_group()
            .await
            .unwrap();

        assert_eq!(result, expected);
        assert_eq!(executor.queries, vec![NamedQuery::CountPerGroup.sql()]);
    }

    #[tokio::test]
    async fn test_each_operation_runs_its_query() {
        let mut executor = MockExecutor::new();
        {
            let mut catalog = QueryCatalog::new(&mut executor);
            catalog.count_per_group().await.unwrap();
            catalog.smallest_average_age().await.unwrap();
            catalog.largest_age_spread().await.unwrap();
            catalog.mixed_groups().await.unwrap();
        }

        let expected: Vec<String> = NamedQuery::ALL.iter().map(NamedQuery::sql).collect();
        assert_eq!(executor.queries, expected);
    }

    #[tokio::test]
    async fn test_upstream_error_unchanged() {
        let mut executor = MockExecutor::new().failing_on("HAVING");
        let result = QueryCatalog::new(&mut executor).mixed_groups().await;

        assert!(matches!(
            result,
            Err(RoomstatError::Database(sqlx::Error::RowNotFound))
        ));
    }
}
