//! Connection configuration
//!
//! A connection string is either `<driver>://<target>` or a bare SQLite target
//! (`:memory:` or a file path).

use super::database_types::DatabaseType;
use super::error::{DatabaseError, Result};
use serde::Deserialize;
use std::time::Duration;

/// Default timeout for database operations (30 seconds)
pub const DEFAULT_OPERATION_TIMEOUT_MS: u64 = 30_000;

/// Runtime configuration for a connection
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Connection string handed to [`parse_connection_string`]
    pub connection_string: String,
    /// Upper bound for a single engine call, in milliseconds; must be non-zero
    ///
    /// The caller stops waiting once it elapses, but the engine call itself
    /// cannot be interrupted: a write reported as timed out may still commit.
    pub operation_timeout_ms: u64,
    /// Enable SQLite foreign key enforcement on connect
    pub foreign_keys: bool,
    /// Log every generated statement and its arguments before execution
    pub log_statements: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            connection_string: ":memory:".to_string(),
            operation_timeout_ms: DEFAULT_OPERATION_TIMEOUT_MS,
            foreign_keys: true,
            log_statements: true,
        }
    }
}

impl Config {
    /// Create a configuration for the given connection string
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
            ..Default::default()
        }
    }

    /// Load a configuration from JSON; missing keys fall back to defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration before it is used to open a connection
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a zero operation timeout.
    pub fn validate(&self) -> Result<()> {
        if self.operation_timeout_ms == 0 {
            return Err(DatabaseError::config(
                "operation_timeout_ms must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Operation timeout as a [`Duration`]
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }
}

/// Split a connection string into the engine type and the engine target
pub fn parse_connection_string(connection_string: &str) -> Result<(DatabaseType, String)> {
    let (db_type, target) = match connection_string.split_once("://") {
        Some((driver, target)) => {
            let db_type = driver
                .parse::<DatabaseType>()
                .map_err(DatabaseError::invalid_connection_string)?;
            (db_type, target)
        }
        None => (DatabaseType::Sqlite, connection_string),
    };

    if target.is_empty() {
        return Err(DatabaseError::invalid_connection_string(
            "missing database target",
        ));
    }

    Ok((db_type, target.to_string()))
}

/// Database connection builder
pub struct ConnectionBuilder {
    db_type: DatabaseType,
    database: Option<String>,
    operation_timeout_ms: Option<u64>,
    foreign_keys: Option<bool>,
    log_statements: Option<bool>,
}

impl ConnectionBuilder {
    /// Create a new connection builder for the specified database type
    pub fn new(db_type: DatabaseType) -> Self {
        Self {
            db_type,
            database: None,
            operation_timeout_ms: None,
            foreign_keys: None,
            log_statements: None,
        }
    }

    /// Set the database file (defaults to an in-memory database)
    pub fn database<S: Into<String>>(mut self, database: S) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Set the per-operation timeout
    pub fn operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// Enable or disable foreign key enforcement
    pub fn foreign_keys(mut self, enabled: bool) -> Self {
        self.foreign_keys = Some(enabled);
        self
    }

    /// Enable or disable statement logging
    pub fn log_statements(mut self, enabled: bool) -> Self {
        self.log_statements = Some(enabled);
        self
    }

    /// Build the connection string
    pub fn build_connection_string(&self) -> String {
        let database = self
            .database
            .clone()
            .unwrap_or_else(|| ":memory:".to_string());
        format!("{}://{}", self.db_type, database)
    }

    /// Build the full configuration
    pub fn build(&self) -> Config {
        let defaults = Config::default();
        Config {
            connection_string: self.build_connection_string(),
            operation_timeout_ms: self
                .operation_timeout_ms
                .unwrap_or(defaults.operation_timeout_ms),
            foreign_keys: self.foreign_keys.unwrap_or(defaults.foreign_keys),
            log_statements: self.log_statements.unwrap_or(defaults.log_statements),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_builder_sqlite() {
        let builder = ConnectionBuilder::new(DatabaseType::Sqlite).database("test.db");
        assert_eq!(builder.build_connection_string(), "sqlite://test.db");

        let builder = ConnectionBuilder::new(DatabaseType::Sqlite);
        assert_eq!(builder.build_connection_string(), "sqlite://:memory:");
    }

    #[test]
    fn test_connection_builder_config() {
        let config = ConnectionBuilder::new(DatabaseType::Sqlite)
            .operation_timeout(Duration::from_secs(2))
            .log_statements(false)
            .build();

        assert_eq!(config.operation_timeout_ms, 2000);
        assert!(!config.log_statements);
        assert!(config.foreign_keys);
    }

    #[test]
    fn test_parse_connection_string() {
        let (db_type, target) = parse_connection_string("sqlite://app.db").unwrap();
        assert_eq!(db_type, DatabaseType::Sqlite);
        assert_eq!(target, "app.db");

        let (db_type, target) = parse_connection_string(":memory:").unwrap();
        assert_eq!(db_type, DatabaseType::Sqlite);
        assert_eq!(target, ":memory:");
    }

    #[test]
    fn test_parse_connection_string_rejects_unknown_driver() {
        let err = parse_connection_string("mysql://root@localhost/db").unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidConnectionString(_)));

        let err = parse_connection_string("sqlite://").unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidConnectionString(_)));
    }

    #[test]
    fn test_config_from_json() {
        let config = Config::from_json(
            r#"{ "connection_string": "sqlite://data.db", "operation_timeout_ms": 500 }"#,
        )
        .unwrap();

        assert_eq!(config.connection_string, "sqlite://data.db");
        assert_eq!(config.operation_timeout(), Duration::from_millis(500));
        assert!(config.log_statements);

        assert!(Config::from_json("not json").is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = Config::from_json(r#"{ "operation_timeout_ms": 0 }"#).unwrap_err();
        assert!(matches!(err, DatabaseError::Config(_)));

        let config = ConnectionBuilder::new(DatabaseType::Sqlite)
            .operation_timeout(Duration::ZERO)
            .build();
        assert!(matches!(config.validate(), Err(DatabaseError::Config(_))));

        assert!(Config::default().validate().is_ok());
    }
}
