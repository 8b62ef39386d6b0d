//! Database backend implementations
//!
//! Concrete implementations of the [`Database`](crate::core::Database) trait.

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
