//! CRUD engine
//!
//! [`Connection`] owns one engine connection and its transaction state. Each
//! operation runs the model's hooks, plans one statement, logs it, and issues
//! exactly one prepare + execute/query; nothing is retried.

use super::decoder::decode_rows;
use super::plan::{delete_statement, insert_statement, select_query, update_statement};
use crate::core::config::Config;
use crate::core::database::{Database, ExecResult};
use crate::core::error::Result;
use crate::core::value::{DatabaseValue, RowSet};
use crate::model::{FieldKind, HookEvent, Model};
use std::future::Future;
use std::pin::Pin;

#[cfg(feature = "sqlite")]
use crate::backends::SqliteDatabase;
#[cfg(feature = "sqlite")]
use crate::core::config::parse_connection_string;

/// Open a SQLite connection with default settings
///
/// Accepts `sqlite://<target>` or a bare target such as `:memory:`.
#[cfg(feature = "sqlite")]
pub async fn open(connection_string: &str) -> Result<Connection<SqliteDatabase>> {
    open_with_config(Config::new(connection_string)).await
}

/// Open a SQLite connection from a full configuration
#[cfg(feature = "sqlite")]
pub async fn open_with_config(config: Config) -> Result<Connection<SqliteDatabase>> {
    let (_, target) = parse_connection_string(&config.connection_string)?;

    let db = SqliteDatabase::with_config(&config)?;
    db.connect(&target).await?;

    log::debug!("opened {}", config.connection_string);
    Ok(Connection::new(db, config))
}

/// Close a connection
pub async fn close<D: Database>(connection: Connection<D>) -> Result<()> {
    connection.close().await
}

/// A model-aware connection
///
/// Not meant to be shared between concurrent units of work: the transaction
/// state belongs to the connection, so every call made through it while a
/// transaction is open runs inside that transaction.
pub struct Connection<D: Database> {
    db: D,
    config: Config,
}

impl<D: Database> Connection<D> {
    /// Wrap an already connected engine
    pub fn new(db: D, config: Config) -> Self {
        Self { db, config }
    }

    /// Underlying engine
    pub fn database(&self) -> &D {
        &self.db
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Disconnect from the engine
    pub async fn close(self) -> Result<()> {
        self.db.disconnect().await
    }

    /// Begin a transaction
    ///
    /// # Errors
    ///
    /// Returns a transaction error if one is already open.
    pub async fn begin(&self) -> Result<()> {
        self.db.begin_transaction().await
    }

    /// Commit the open transaction
    ///
    /// # Errors
    ///
    /// Returns a transaction error if none is open.
    pub async fn commit(&self) -> Result<()> {
        self.db.commit().await
    }

    /// Roll back the open transaction
    ///
    /// # Errors
    ///
    /// Returns a transaction error if none is open.
    pub async fn rollback(&self) -> Result<()> {
        self.db.rollback().await
    }

    pub fn in_transaction(&self) -> bool {
        self.db.in_transaction()
    }

    /// Run `f` inside a transaction
    ///
    /// Commits when `f` returns `Ok`, rolls back when it returns `Err`.
    pub async fn transaction<F, T>(&self, f: F) -> Result<T>
    where
        F: for<'a> FnOnce(&'a Self) -> Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>
            + Send,
        T: Send,
    {
        self.begin().await?;

        match f(self).await {
            Ok(result) => {
                self.commit().await?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = self.rollback().await {
                    log::warn!("rollback after failed transaction body failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }

    /// Find up to 20 rows matching every non-blank field of `model`
    ///
    /// A zero-valued model matches every row. Rows beyond the limit are
    /// silently dropped.
    pub async fn find<M: Model>(&self, model: &mut M) -> Result<Vec<M>> {
        let schema = M::schema();
        schema.hooks().run(HookEvent::BeforeFind, model);

        let query = select_query(&schema, model);
        let rows = self.fetch(&query.sql(), &query.args()).await?;

        Ok(decode_rows(&rows))
    }

    /// First row matching `model`, or `None` when nothing matches
    pub async fn first<M: Model>(&self, model: &mut M) -> Result<Option<M>> {
        Ok(self.find(model).await?.into_iter().next())
    }

    /// Insert `model`, back-filling its primary key from the engine
    ///
    /// Only integer keys are back-filled; other key kinds keep the value the
    /// caller set. Returns the number of rows affected.
    pub async fn create<M: Model>(&self, model: &mut M) -> Result<u64> {
        let schema = M::schema();
        schema.hooks().run(HookEvent::BeforeCreate, model);

        let stmt = insert_statement(&schema, model);
        let result = self.exec(&stmt.sql(), &stmt.args()).await?;

        if let Some(primary_key) = schema
            .primary_key()
            .filter(|f| f.kind() == FieldKind::Integer)
        {
            primary_key.set(model, &DatabaseValue::Long(result.last_insert_id))?;
        }

        Ok(result.rows_affected)
    }

    /// Update the row identified by the primary key of `model`
    ///
    /// Only non-blank, non-key fields are written. Without a non-blank primary
    /// key the update has no `WHERE` clause and touches every row.
    pub async fn save<M: Model>(&self, model: &mut M) -> Result<u64> {
        let schema = M::schema();
        schema.hooks().run(HookEvent::BeforeSave, model);

        let stmt = update_statement(&schema, model);
        if !stmt.has_conditions() {
            log::warn!("update on {} has no condition, every row is affected", M::table_name());
        }

        Ok(self.exec(&stmt.sql(), &stmt.args()).await?.rows_affected)
    }

    /// Delete rows matching every non-blank field of `model`
    ///
    /// A zero-valued model deletes the whole table.
    pub async fn delete<M: Model>(&self, model: &mut M) -> Result<u64> {
        let schema = M::schema();
        schema.hooks().run(HookEvent::BeforeDelete, model);

        let stmt = delete_statement(&schema, model);
        if !stmt.has_conditions() {
            log::warn!("delete on {} has no condition, every row is affected", M::table_name());
        }

        Ok(self.exec(&stmt.sql(), &stmt.args()).await?.rows_affected)
    }

    /// Run hand-written SQL with bound arguments through the same logged path
    pub async fn execute_raw(&self, sql: &str, args: &[DatabaseValue]) -> Result<ExecResult> {
        self.exec(sql, args).await
    }

    async fn exec(&self, sql: &str, args: &[DatabaseValue]) -> Result<ExecResult> {
        self.log_statement(sql, args);
        self.db.execute_with_params(sql, args).await
    }

    async fn fetch(&self, sql: &str, args: &[DatabaseValue]) -> Result<RowSet> {
        self.log_statement(sql, args);
        self.db.query_with_params(sql, args).await
    }

    fn log_statement(&self, sql: &str, args: &[DatabaseValue]) {
        if self.config.log_statements {
            log::info!(target: "swallow::sql", "{} {:?}", sql, args);
        }
    }
}
