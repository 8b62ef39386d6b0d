//! Core types and traits
//!
//! Error types, the engine trait, values, configuration and the statement
//! context the planners build on.

pub mod config;
pub mod database;
pub mod database_types;
pub mod error;
pub mod statement;
pub mod value;

// Re-export commonly used types
pub use config::{parse_connection_string, Config, ConnectionBuilder};
pub use database::{Database, ExecResult};
pub use database_types::DatabaseType;
pub use error::{DatabaseError, Result};
pub use statement::{Query, Statement, ROW_LIMIT};
pub use value::{DatabaseValue, RawValue, RowSet};
