//! In-memory [`SqlExecutor`] for tests

use std::collections::VecDeque;

use async_trait::async_trait;

use super::SqlExecutor;
use crate::error::Result;
use crate::model::{ResultSet, Value};

/// Records every statement and answers queries from a queue
#[derive(Default)]
pub(crate) struct MockExecutor {
    /// Executed statements with their parameters, in order
    pub statements: Vec<(String, Vec<Value>)>,
    /// Query texts, in order
    pub queries: Vec<String>,
    responses: VecDeque<ResultSet>,
    fail_when_contains: Option<String>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue results returned by successive `query` calls
    pub fn with_responses(responses: Vec<ResultSet>) -> Self {
        Self {
            responses: responses.into(),
            ..Self::default()
        }
    }

    /// Fail any statement or query whose text contains `fragment`
    pub fn failing_on(mut self, fragment: &str) -> Self {
        self.fail_when_contains = Some(fragment.to_string());
        self
    }

    fn check(&self, sql: &str) -> Result<()> {
        match &self.fail_when_contains {
            Some(fragment) if sql.contains(fragment.as_str()) => Err(sqlx::Error::RowNotFound.into()),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl SqlExecutor for MockExecutor {
    async fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64> {
        self.check(sql)?;
        self.statements.push((sql.to_string(), params.to_vec()));
        Ok(1)
    }

    async fn query(&mut self, sql: &str) -> Result<ResultSet> {
        self.check(sql)?;
        self.queries.push(sql.to_string());
        Ok(self.responses.pop_front().unwrap_or_default())
    }
}
