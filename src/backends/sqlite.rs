//! SQLite database backend implementation
//!
//! Every engine call runs on the blocking thread pool and is raced against the
//! configured operation timeout.

#[cfg(feature = "sqlite")]
use crate::core::{
    config::Config,
    database::{Database, ExecResult},
    database_types::DatabaseType,
    error::DatabaseError,
    error::Result,
    value::{DatabaseValue, RawValue, RowSet},
};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

#[cfg(feature = "sqlite")]
use rusqlite::{params_from_iter, types::ValueRef, Connection, Row};
use std::time::Duration;

/// SQLite database implementation
#[cfg(feature = "sqlite")]
pub struct SqliteDatabase {
    connection: Arc<Mutex<Option<Connection>>>,
    in_transaction: Arc<Mutex<bool>>,
    operation_timeout: Duration,
    foreign_keys: bool,
}

#[cfg(feature = "sqlite")]
impl SqliteDatabase {
    /// Create a new SQLite database instance with default settings
    pub fn new() -> Self {
        let defaults = Config::default();
        Self::from_settings(defaults.operation_timeout(), defaults.foreign_keys)
    }

    /// Create a new SQLite database instance from a configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` fails [`Config::validate`].
    pub fn with_config(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_settings(
            config.operation_timeout(),
            config.foreign_keys,
        ))
    }

    fn from_settings(operation_timeout: Duration, foreign_keys: bool) -> Self {
        Self {
            connection: Arc::new(Mutex::new(None)),
            in_transaction: Arc::new(Mutex::new(false)),
            operation_timeout,
            foreign_keys,
        }
    }

    pub fn operation_timeout(&self) -> Duration {
        self.operation_timeout
    }

    /// Run `op` on the blocking pool, giving up on it once the timeout elapses
    ///
    /// A blocking job cannot be cancelled: after a timeout the statement keeps
    /// running to completion and a write may still commit. Later calls wait for
    /// it on the connection lock.
    async fn run_blocking<T, F>(&self, op: F, on_timeout: fn(u64) -> DatabaseError) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        let timeout = self.operation_timeout;
        let mut task = tokio::task::spawn_blocking(op);

        tokio::select! {
            result = &mut task => {
                result.map_err(|e| DatabaseError::other(format!("Task join error: {}", e)))?
            }
            _ = tokio::time::sleep(timeout) => {
                log::warn!("engine call exceeded {:?}, it keeps running in the background", timeout);
                Err(on_timeout(timeout.as_millis() as u64))
            }
        }
    }

    /// Convert a rusqlite Row to raw text buffers
    ///
    /// Numbers are rendered as decimal text; NULL becomes `None`.
    fn row_to_raw(row: &Row, column_count: usize) -> rusqlite::Result<Vec<RawValue>> {
        let mut values = Vec::with_capacity(column_count);

        for i in 0..column_count {
            let value = match row.get_ref(i)? {
                ValueRef::Null => None,
                ValueRef::Integer(v) => Some(v.to_string().into_bytes()),
                ValueRef::Real(v) => Some(v.to_string().into_bytes()),
                ValueRef::Text(v) | ValueRef::Blob(v) => Some(v.to_vec()),
            };
            values.push(value);
        }

        Ok(values)
    }

    /// Convert DatabaseValue to rusqlite parameter
    fn value_to_param(value: &DatabaseValue) -> Box<dyn rusqlite::ToSql> {
        match value {
            DatabaseValue::Null => Box::new(None::<i64>),
            DatabaseValue::Bool(v) => Box::new(*v),
            DatabaseValue::Int(v) => Box::new(*v),
            DatabaseValue::Long(v) => Box::new(*v),
            DatabaseValue::Float(v) => Box::new(*v),
            DatabaseValue::Double(v) => Box::new(*v),
            DatabaseValue::String(v) => Box::new(v.clone()),
        }
    }
}

#[cfg(feature = "sqlite")]
impl Default for SqliteDatabase {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "sqlite")]
#[async_trait]
impl Database for SqliteDatabase {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Sqlite
    }

    async fn connect(&self, target: &str) -> Result<()> {
        // Clean up any existing connection first
        {
            let mut connection = self.connection.lock().await;
            *connection = None;
        }

        // Reset transaction flag to handle failed/aborted attempts
        {
            let mut in_transaction = self.in_transaction.lock().await;
            *in_transaction = false;
        }

        let target = target.to_string();
        let foreign_keys = self.foreign_keys;
        let connection_arc = Arc::clone(&self.connection);

        self.run_blocking(
            move || -> Result<()> {
                let conn = Connection::open(&target)?;

                if foreign_keys {
                    conn.execute("PRAGMA foreign_keys = ON", [])?;
                }

                let mut connection = connection_arc.blocking_lock();
                *connection = Some(conn);

                Ok(())
            },
            DatabaseError::connection_timeout,
        )
        .await
    }

    fn is_connected(&self) -> bool {
        self.connection
            .try_lock()
            .map(|conn| conn.is_some())
            .unwrap_or(false)
    }

    async fn disconnect(&self) -> Result<()> {
        // Clear transaction flag to prevent stale state after reconnect
        {
            let mut in_transaction = self.in_transaction.lock().await;
            *in_transaction = false;
        }

        let mut connection = self.connection.lock().await;
        *connection = None;
        Ok(())
    }

    async fn execute(&self, sql: &str) -> Result<u64> {
        let sql = sql.to_string();
        let connection_arc = Arc::clone(&self.connection);

        self.run_blocking(
            move || -> Result<u64> {
                let connection = connection_arc.blocking_lock();
                let conn = connection
                    .as_ref()
                    .ok_or_else(|| DatabaseError::connection("Not connected to database"))?;

                let affected = conn.execute(&sql, [])?;
                Ok(affected as u64)
            },
            DatabaseError::query_timeout,
        )
        .await
    }

    async fn execute_with_params(&self, sql: &str, params: &[DatabaseValue]) -> Result<ExecResult> {
        let sql = sql.to_string();
        let params = params.to_vec();
        let connection_arc = Arc::clone(&self.connection);

        self.run_blocking(
            move || -> Result<ExecResult> {
                let connection = connection_arc.blocking_lock();
                let conn = connection
                    .as_ref()
                    .ok_or_else(|| DatabaseError::connection("Not connected to database"))?;

                let rusqlite_params: Vec<Box<dyn rusqlite::ToSql>> =
                    params.iter().map(Self::value_to_param).collect();

                let mut stmt = conn.prepare(&sql)?;
                let affected = stmt.execute(params_from_iter(rusqlite_params.iter()))?;

                Ok(ExecResult {
                    rows_affected: affected as u64,
                    last_insert_id: conn.last_insert_rowid(),
                })
            },
            DatabaseError::query_timeout,
        )
        .await
    }

    async fn query_with_params(&self, sql: &str, params: &[DatabaseValue]) -> Result<RowSet> {
        let sql = sql.to_string();
        let params = params.to_vec();
        let connection_arc = Arc::clone(&self.connection);

        self.run_blocking(
            move || -> Result<RowSet> {
                let connection = connection_arc.blocking_lock();
                let conn = connection
                    .as_ref()
                    .ok_or_else(|| DatabaseError::connection("Not connected to database"))?;

                let rusqlite_params: Vec<Box<dyn rusqlite::ToSql>> =
                    params.iter().map(Self::value_to_param).collect();

                let mut stmt = conn.prepare(&sql)?;
                let columns: Vec<String> =
                    stmt.column_names().into_iter().map(String::from).collect();
                let column_count = columns.len();
                let mut result = RowSet::new(columns);

                // A failing row ends the scan; rows read so far are kept
                let mut rows = stmt.query(params_from_iter(rusqlite_params.iter()))?;
                loop {
                    match rows.next() {
                        Ok(Some(row)) => match Self::row_to_raw(row, column_count) {
                            Ok(values) => result.rows.push(values),
                            Err(e) => {
                                log::warn!("stopped reading rows: {}", e);
                                break;
                            }
                        },
                        Ok(None) => break,
                        Err(e) => {
                            log::warn!("stopped reading rows: {}", e);
                            break;
                        }
                    }
                }

                Ok(result)
            },
            DatabaseError::query_timeout,
        )
        .await
    }

    async fn begin_transaction(&self) -> Result<()> {
        let connection_arc = Arc::clone(&self.connection);
        let in_transaction_arc = Arc::clone(&self.in_transaction);

        self.run_blocking(
            move || -> Result<()> {
                // Acquire both locks atomically to prevent race conditions
                let mut in_transaction = in_transaction_arc.blocking_lock();
                let connection = connection_arc.blocking_lock();

                let conn = connection
                    .as_ref()
                    .ok_or_else(|| DatabaseError::connection("Not connected to database"))?;

                if *in_transaction {
                    return Err(DatabaseError::transaction("Already in a transaction"));
                }

                // Execute SQL first, only set flag on success
                conn.execute("BEGIN TRANSACTION", [])?;
                *in_transaction = true;

                Ok(())
            },
            DatabaseError::query_timeout,
        )
        .await
    }

    async fn commit(&self) -> Result<()> {
        self.finish_transaction("COMMIT").await
    }

    async fn rollback(&self) -> Result<()> {
        self.finish_transaction("ROLLBACK").await
    }

    fn in_transaction(&self) -> bool {
        self.in_transaction
            .try_lock()
            .map(|guard| *guard)
            .unwrap_or(false)
    }
}

#[cfg(feature = "sqlite")]
impl SqliteDatabase {
    /// Issue `COMMIT` or `ROLLBACK` for the open transaction
    async fn finish_transaction(&self, sql: &'static str) -> Result<()> {
        let connection_arc = Arc::clone(&self.connection);
        let in_transaction_arc = Arc::clone(&self.in_transaction);

        self.run_blocking(
            move || -> Result<()> {
                let mut in_transaction = in_transaction_arc.blocking_lock();
                let connection = connection_arc.blocking_lock();

                let conn = connection
                    .as_ref()
                    .ok_or_else(|| DatabaseError::connection("Not connected to database"))?;

                if !*in_transaction {
                    return Err(DatabaseError::transaction("Not in a transaction"));
                }

                // Execute SQL first, only clear flag on success
                conn.execute(sql, [])?;
                *in_transaction = false;

                Ok(())
            },
            DatabaseError::query_timeout,
        )
        .await
    }
}

#[cfg(feature = "sqlite")]
impl Drop for SqliteDatabase {
    fn drop(&mut self) {
        // Best-effort rollback; Drop cannot be async
        if let Ok(in_trans) = self.in_transaction.try_lock() {
            if *in_trans {
                if let Ok(connection) = self.connection.try_lock() {
                    if let Some(conn) = connection.as_ref() {
                        let _ = conn.execute("ROLLBACK", []);
                    }
                }
            }
        }
    }
}

#[cfg(all(test, feature = "sqlite"))]
mod tests {
    use super::*;

    async fn connected() -> Result<SqliteDatabase> {
        let db = SqliteDatabase::new();
        db.connect(":memory:").await?;
        db.execute("CREATE TABLE test (id INTEGER PRIMARY KEY, name TEXT, score REAL)")
            .await?;
        Ok(db)
    }

    #[tokio::test]
    async fn test_sqlite_connect() {
        let db = SqliteDatabase::new();
        assert!(db.connect(":memory:").await.is_ok());
        assert!(db.is_connected());
        assert!(db.disconnect().await.is_ok());
        assert!(!db.is_connected());
    }

    #[tokio::test]
    async fn test_not_connected() {
        let db = SqliteDatabase::new();
        let err = db.execute("SELECT 1").await.unwrap_err();
        assert!(matches!(err, DatabaseError::ConnectionError(_)));
    }

    #[tokio::test]
    async fn test_execute_with_params_reports_rowid() -> Result<()> {
        let db = connected().await?;

        let first = db
            .execute_with_params("INSERT INTO test (name) VALUES (?)", &["Alice".into()])
            .await?;
        assert_eq!(first.rows_affected, 1);
        assert_eq!(first.last_insert_id, 1);

        let second = db
            .execute_with_params("INSERT INTO test (name) VALUES (?)", &["Bob".into()])
            .await?;
        assert_eq!(second.last_insert_id, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_query_returns_raw_text() -> Result<()> {
        let db = connected().await?;
        db.execute("INSERT INTO test (name, score) VALUES ('Alice', 2.5)")
            .await?;
        db.execute("INSERT INTO test (name) VALUES (NULL)").await?;

        let rows = db
            .query_with_params("SELECT id, name, score FROM test ORDER BY id", &[])
            .await?;
        assert_eq!(rows.columns, vec!["id", "name", "score"]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows.rows[0][0], Some(b"1".to_vec()));
        assert_eq!(rows.rows[0][1], Some(b"Alice".to_vec()));
        assert_eq!(rows.rows[0][2], Some(b"2.5".to_vec()));
        assert_eq!(rows.rows[1][1], None);
        Ok(())
    }

    #[tokio::test]
    async fn test_query_with_params_binds_in_order() -> Result<()> {
        let db = connected().await?;
        db.execute("INSERT INTO test (name) VALUES ('Alice')").await?;
        db.execute("INSERT INTO test (name) VALUES ('Bob')").await?;

        let rows = db
            .query_with_params(
                "SELECT name FROM test WHERE id = ? AND name = ?",
                &[DatabaseValue::Long(2), "Bob".into()],
            )
            .await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows.rows[0][0], Some(b"Bob".to_vec()));
        Ok(())
    }

    #[tokio::test]
    async fn test_prepare_error_propagates() -> Result<()> {
        let db = connected().await?;
        let err = db
            .query_with_params("SELECT nope FROM missing", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::SqliteError(_)));
        Ok(())
    }

    #[tokio::test]
    async fn test_sqlite_transaction() -> Result<()> {
        let db = connected().await?;

        db.begin_transaction().await?;
        assert!(db.in_transaction());
        db.execute("INSERT INTO test (name) VALUES ('Alice')").await?;
        db.commit().await?;
        assert!(!db.in_transaction());

        db.begin_transaction().await?;
        db.execute("INSERT INTO test (name) VALUES ('Bob')").await?;
        db.rollback().await?;
        assert!(!db.in_transaction());

        let rows = db.query_with_params("SELECT * FROM test", &[]).await?;
        assert_eq!(rows.len(), 1); // Still only Alice
        Ok(())
    }

    #[tokio::test]
    async fn test_transaction_misuse() -> Result<()> {
        let db = connected().await?;

        let err = db.commit().await.unwrap_err();
        assert_eq!(err.to_string(), "Transaction error: Not in a transaction");

        db.begin_transaction().await?;
        let err = db.begin_transaction().await.unwrap_err();
        assert_eq!(err.to_string(), "Transaction error: Already in a transaction");
        assert!(db.in_transaction());
        Ok(())
    }

    #[tokio::test]
    async fn test_with_config() -> Result<()> {
        let config = Config {
            operation_timeout_ms: 1500,
            ..Default::default()
        };
        let db = SqliteDatabase::with_config(&config)?;
        assert_eq!(db.operation_timeout(), Duration::from_millis(1500));

        let zero = Config {
            operation_timeout_ms: 0,
            ..Default::default()
        };
        assert!(matches!(
            SqliteDatabase::with_config(&zero),
            Err(DatabaseError::Config(_))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_timed_out_write_still_commits() -> Result<()> {
        let config = Config {
            operation_timeout_ms: 50,
            ..Default::default()
        };
        let db = SqliteDatabase::with_config(&config)?;
        db.connect(":memory:").await?;
        db.execute("CREATE TABLE t (n INTEGER)").await?;

        let err = db
            .execute(
                "INSERT INTO t (n) SELECT count(*) FROM (WITH RECURSIVE c(x) AS \
                 (SELECT 1 UNION ALL SELECT x + 1 FROM c WHERE x < 10000000) SELECT x FROM c)",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::QueryTimeout { timeout_ms: 50 }));

        // The insert finishes in the background; wait until the connection is free again
        let mut rows = None;
        for _ in 0..100 {
            tokio::time::sleep(Duration::from_millis(200)).await;
            if let Ok(result) = db.query_with_params("SELECT count(*) FROM t", &[]).await {
                rows = Some(result);
                break;
            }
        }

        let rows = rows.expect("connection never became free");
        assert_eq!(rows.rows[0][0], Some(b"1".to_vec()));
        Ok(())
    }

    #[tokio::test]
    async fn test_row_scan_failure_keeps_earlier_rows() -> Result<()> {
        let db = SqliteDatabase::new();
        db.connect(":memory:").await?;
        db.execute("CREATE TABLE s (v INTEGER)").await?;
        db.execute("INSERT INTO s (v) VALUES (1), (-2), (-9223372036854775808), (4)")
            .await?;

        // abs() overflows on the third row
        let rows = db
            .query_with_params("SELECT abs(v) FROM s ORDER BY rowid", &[])
            .await?;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows.rows[0][0], Some(b"1".to_vec()));
        assert_eq!(rows.rows[1][0], Some(b"2".to_vec()));
        Ok(())
    }
}
