//! Connection management for MySQL
//!
//! This module provides:
//! - [`SqlExecutor`]: the query-execution interface used by the schema,
//!   import and query layers
//! - [`ConnectionManager`]: pool establishment with retries and shutdown
//! - [`Session`]: one transaction, released by commit or rollback on every
//!   exit path

use std::time::Duration;

use async_trait::async_trait;
use sqlx::mysql::{MySqlArguments, MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use sqlx::query::Query;
use sqlx::{Column, Executor, MySql, Transaction};
use tracing::{debug, info, warn};

use crate::config::ConnectionConfig;
use crate::error::{ConnectionError, Result};
use crate::model::{ResultSet, Value};

mod decode;
#[cfg(test)]
pub(crate) mod mock;

/// Query-execution interface
///
/// Implementations run SQL text against a relational engine. Engine
/// failures are returned as-is and never reinterpreted by callers.
#[async_trait]
pub trait SqlExecutor: Send {
    /// Execute a statement with positional `?` parameters
    ///
    /// # Returns
    /// * `Result<u64>` - Number of rows affected
    async fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64>;

    /// Run a query and materialize its full result
    ///
    /// Column names are available even when no row matched.
    async fn query(&mut self, sql: &str) -> Result<ResultSet>;
}

/// MySQL connection manager
///
/// Owns the connection pool. Call [`ConnectionManager::disconnect`] when
/// the batch is done, whatever its outcome.
pub struct ConnectionManager {
    /// Connection pool, present while connected
    pool: Option<MySqlPool>,

    /// Connection configuration
    config: ConnectionConfig,
}

impl ConnectionManager {
    /// Create a new connection manager
    ///
    /// # Arguments
    /// * `config` - Connection configuration
    ///
    /// # Returns
    /// * `Self` - New connection manager instance
    pub fn new(config: ConnectionConfig) -> Self {
        Self { pool: None, config }
    }

    /// Get the connection configuration
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Check if currently connected
    pub fn is_connected(&self) -> bool {
        self.pool.is_some()
    }

    /// Build driver connect options from configuration
    fn connect_options(&self) -> MySqlConnectOptions {
        let mut options = MySqlConnectOptions::new()
            .host(&self.config.host)
            .port(self.config.port)
            .username(&self.config.user)
            .database(&self.config.database);
        if !self.config.password.is_empty() {
            options = options.password(&self.config.password);
        }
        options
    }

    /// Establish the connection pool
    ///
    /// # Returns
    /// * `Result<()>` - Success or connection error
    pub async fn connect(&mut self) -> Result<()> {
        if self.pool.is_some() {
            return Ok(());
        }

        let pool = self.connect_with_retry().await?;
        info!("Connected to {}", self.config.sanitized_uri());
        self.pool = Some(pool);
        Ok(())
    }

    /// Attempt connection with retries
    ///
    /// The first attempt is followed by up to `retry_attempts` retries with
    /// a linearly growing pause.
    async fn connect_with_retry(&self) -> Result<MySqlPool> {
        let total_attempts = self.config.retry_attempts + 1;
        let mut last_error = String::new();

        for attempt in 1..=total_attempts {
            debug!("Connection attempt {}/{}", attempt, total_attempts);

            let result = MySqlPoolOptions::new()
                .max_connections(self.config.max_pool_size)
                .acquire_timeout(self.config.acquire_timeout())
                .connect_with(self.connect_options())
                .await;

            match result {
                Ok(pool) => return Ok(pool),
                Err(e) => {
                    warn!("Connection attempt {} failed: {}", attempt, e);
                    last_error = e.to_string();
                    if attempt < total_attempts {
                        tokio::time::sleep(Duration::from_millis(500 * u64::from(attempt))).await;
                    }
                }
            }
        }

        Err(ConnectionError::ConnectionFailed(format!(
            "{} after {} attempt(s): {}",
            self.config.sanitized_uri(),
            total_attempts,
            last_error
        ))
        .into())
    }

    /// Close the pool and all of its connections
    pub async fn disconnect(&mut self) {
        if let Some(pool) = self.pool.take() {
            pool.close().await;
            info!("Disconnected from {}", self.config.sanitized_uri());
        }
    }

    /// Start a new transactional session
    ///
    /// # Arguments
    /// * `label` - Name used in logs for this session
    ///
    /// # Returns
    /// * `Result<Session>` - Open session or error
    pub async fn begin(&self, label: &'static str) -> Result<Session> {
        let pool = self.pool.as_ref().ok_or(ConnectionError::NotConnected)?;
        let tx = pool.begin().await?;
        debug!("Session '{}' started", label);
        Ok(Session {
            tx: Some(tx),
            label,
        })
    }
}

/// A transaction on one pooled connection
///
/// Finish it with [`Session::commit`], [`Session::rollback`] or
/// [`Session::finish`]. Dropping an unfinished session rolls the
/// transaction back.
pub struct Session {
    tx: Option<Transaction<'static, MySql>>,
    label: &'static str,
}

impl Session {
    fn transaction(&mut self) -> Result<&mut Transaction<'static, MySql>> {
        self.tx
            .as_mut()
            .ok_or_else(|| ConnectionError::SessionClosed.into())
    }

    /// Commit the transaction and release the connection
    pub async fn commit(mut self) -> Result<()> {
        let tx = self.tx.take().ok_or(ConnectionError::SessionClosed)?;
        tx.commit().await?;
        debug!("Session '{}' committed", self.label);
        Ok(())
    }

    /// Roll the transaction back and release the connection
    pub async fn rollback(mut self) -> Result<()> {
        let tx = self.tx.take().ok_or(ConnectionError::SessionClosed)?;
        tx.rollback().await?;
        warn!("Session '{}' rolled back", self.label);
        Ok(())
    }

    /// Commit on success, roll back on failure
    ///
    /// The outcome's error wins over a failing rollback, which is only logged.
    pub async fn finish<T>(self, outcome: Result<T>) -> Result<T> {
        match outcome {
            Ok(value) => {
                self.commit().await?;
                Ok(value)
            }
            Err(e) => {
                let label = self.label;
                if let Err(rollback_err) = self.rollback().await {
                    warn!("Rollback of session '{}' failed: {}", label, rollback_err);
                }
                Err(e)
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.tx.is_some() {
            warn!(
                "Session '{}' dropped without commit or rollback, rolling back",
                self.label
            );
        }
    }
}

/// Bind positional parameters to a prepared query
fn bind_params<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    params: &'q [Value],
) -> Query<'q, MySql, MySqlArguments> {
    for param in params {
        query = match param {
            Value::Integer(n) => query.bind(*n),
            Value::Float(f) => query.bind(*f),
            Value::Text(s) => query.bind(s.as_str()),
            Value::Date(d) => query.bind(*d),
            Value::DateTime(dt) => query.bind(*dt),
            Value::Decimal(d) => query.bind(*d),
            Value::Bytes(b) => query.bind(b.as_slice()),
            Value::Null => query.bind(None::<String>),
        };
    }
    query
}

#[async_trait]
impl SqlExecutor for Session {
    async fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64> {
        let tx = self.transaction()?;
        let result = bind_params(sqlx::query(sql), params)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn query(&mut self, sql: &str) -> Result<ResultSet> {
        let tx = self.transaction()?;
        let rows = sqlx::query(sql).fetch_all(&mut **tx).await?;

        let columns: Vec<String> = match rows.first() {
            Some(row) => sqlx::Row::columns(row)
                .iter()
                .map(|c| c.name().to_string())
                .collect(),
            None => {
                let described = (&mut **tx).describe(sql).await?;
                described
                    .columns()
                    .iter()
                    .map(|c| c.name().to_string())
                    .collect()
            }
        };

        let rows = rows
            .iter()
            .map(decode::decode_row)
            .collect::<Result<Vec<_>>>()?;

        debug!("Query returned {} rows x {} columns", rows.len(), columns.len());
        Ok(ResultSet::new(columns, rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manager_starts_disconnected() {
        let manager = ConnectionManager::new(ConnectionConfig::default());
        assert!(!manager.is_connected());
        assert_eq!(manager.config().port, 3306);
    }

    #[tokio::test]
    async fn test_begin_requires_connection() {
        let manager = ConnectionManager::new(ConnectionConfig::default());
        let result = manager.begin("test").await;
        assert!(matches!(
            result,
            Err(crate::error::RoomstatError::Connection(ConnectionError::NotConnected))
        ));
    }

    #[tokio::test]
    async fn test_disconnect_without_pool_is_noop() {
        let mut manager = ConnectionManager::new(ConnectionConfig::default());
        manager.disconnect().await;
        assert!(!manager.is_connected());
    }

    #[test]
    fn test_session_is_an_executor() {
        fn _accepts_executor<E: SqlExecutor>(_executor: &mut E) {}
        fn _check(session: &mut Session) {
            _accepts_executor(session);
        }
    }
}
