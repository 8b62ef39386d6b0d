//! Database trait
//!
//! This module defines the SQL engine seam the CRUD engine talks to. Every
//! backend prepares and runs one statement per call and owns the connection's
//! transaction state.

use super::database_types::DatabaseType;
use super::error::Result;
use super::value::{DatabaseValue, RowSet};
use async_trait::async_trait;

/// Outcome of a data-modifying statement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    /// Number of rows changed by the statement
    pub rows_affected: u64,
    /// Row id the engine assigned to the last inserted row
    pub last_insert_id: i64,
}

/// Core database trait that all database backends must implement
#[async_trait]
pub trait Database: Send + Sync {
    /// Get the database type
    fn database_type(&self) -> DatabaseType;

    /// Connect to the database with the given connection target
    async fn connect(&self, connection_string: &str) -> Result<()>;

    /// Check if connected to the database
    fn is_connected(&self) -> bool;

    /// Disconnect from the database
    async fn disconnect(&self) -> Result<()>;

    /// Execute raw SQL text without parameters (schema setup, batches)
    ///
    /// # Security Warning
    ///
    /// **SQL Injection Risk**: This method executes raw SQL without parameter binding.
    /// Never pass user input through it.
    async fn execute(&self, query: &str) -> Result<u64>;

    /// Prepare and execute a data-modifying statement with bound parameters
    async fn execute_with_params(
        &self,
        query: &str,
        params: &[DatabaseValue],
    ) -> Result<ExecResult>;

    /// Prepare and run a query with bound parameters, materializing every row
    ///
    /// A failure while reading an individual row ends the result early; the
    /// rows read before it are still returned.
    async fn query_with_params(&self, query: &str, params: &[DatabaseValue]) -> Result<RowSet>;

    /// Begin a transaction
    ///
    /// Fails if a transaction is already open on this connection.
    async fn begin_transaction(&self) -> Result<()>;

    /// Commit the current transaction
    ///
    /// Fails if no transaction is open.
    async fn commit(&self) -> Result<()>;

    /// Rollback the current transaction
    ///
    /// Fails if no transaction is open.
    async fn rollback(&self) -> Result<()>;

    /// Check if currently in a transaction
    fn in_transaction(&self) -> bool;
}
