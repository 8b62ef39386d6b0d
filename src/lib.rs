//! # Swallow
//!
//! A small ORM that maps plain Rust structs to relational tables. Each model
//! registers its fields, column tags and lifecycle hooks once; the library
//! turns Find/First/Create/Save/Delete calls into single parameterized SQL
//! statements and decodes result rows back into fresh model instances.
//!
//! ## Features
//!
//! - **Field tags**: `column:<name>;`, `PRIMARY_KEY;` and `-;` (ignore)
//! - **Zero means unset**: blank fields never become filters or written columns
//! - **Lifecycle hooks**: before find, save, create and delete
//! - **Transactions**: begin/commit/rollback plus a closure helper
//! - **Async Support**: Tokio async/await, blocking engine calls offloaded
//! - **Statement logging**: every generated statement is logged through `log`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use swallow::prelude::*;
//!
//! #[derive(Debug, Default)]
//! struct User {
//!     id: i64,
//!     name: String,
//!     base: BaseModel,
//! }
//!
//! impl Model for User {
//!     fn schema() -> Schema<Self> {
//!         Schema::builder()
//!             .field("id", "PRIMARY_KEY;", |u: &User| &u.id, |u: &mut User| &mut u.id)
//!             .field("name", "column:name;", |u: &User| &u.name, |u: &mut User| &mut u.name)
//!             .embed(BaseModel::schema(), |u: &User| &u.base, |u: &mut User| &mut u.base)
//!             .build()
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let conn = open(":memory:").await?;
//!     conn.database()
//!         .execute(
//!             "CREATE TABLE User (id INTEGER PRIMARY KEY, name TEXT, insert_at INTEGER, \
//!              update_at INTEGER, delete_at INTEGER, is_deleted BOOLEAN)",
//!         )
//!         .await?;
//!
//!     let mut user = User {
//!         name: "Alice".to_string(),
//!         ..Default::default()
//!     };
//!     conn.create(&mut user).await?;
//!
//!     let mut lookup = User {
//!         name: "Alice".to_string(),
//!         ..Default::default()
//!     };
//!     if let Some(found) = conn.first(&mut lookup).await? {
//!         println!("User {}: {}", found.id, found.name);
//!     }
//!
//!     close(conn).await
//! }
//! ```
//!
//! ### Working with Transactions
//!
//! ```rust,no_run
//! use swallow::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let conn = open("sqlite://:memory:").await?;
//!     conn.database()
//!         .execute("CREATE TABLE accounts (id INTEGER PRIMARY KEY, balance REAL)")
//!         .await?;
//!
//!     conn.begin().await?;
//!     match conn
//!         .execute_raw("INSERT INTO accounts (balance) VALUES (?)", &[100.0.into()])
//!         .await
//!     {
//!         Ok(_) => conn.commit().await?,
//!         Err(e) => {
//!             conn.rollback().await?;
//!             return Err(e);
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Project Structure
//!
//! ```text
//! swallow/
//! ├── src/
//! │   ├── core/              # Errors, values, engine trait, config, statements
//! │   ├── model/             # Tags, field descriptors, schemas, hooks, BaseModel
//! │   ├── orm/               # Planners, row decoder, Connection
//! │   ├── backends/          # SQLite implementation
//! │   └── lib.rs
//! ├── tests/                 # Integration and property tests
//! ├── benches/               # Criterion benchmarks
//! └── Cargo.toml
//! ```

pub mod backends;
pub mod core;
pub mod model;
pub mod orm;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        Config, ConnectionBuilder, Database, DatabaseError, DatabaseType, DatabaseValue, Result,
    };
    pub use crate::model::{BaseModel, HookEvent, Model, Schema};
    pub use crate::orm::{close, Connection};

    #[cfg(feature = "sqlite")]
    pub use crate::backends::SqliteDatabase;
    #[cfg(feature = "sqlite")]
    pub use crate::orm::{open, open_with_config};
}

// Re-export at root level for convenience
pub use self::core::{Config, Database, DatabaseError, DatabaseType, DatabaseValue, Result};
pub use model::{BaseModel, Model, Schema};
pub use orm::{close, Connection};

#[cfg(feature = "sqlite")]
pub use backends::SqliteDatabase;
#[cfg(feature = "sqlite")]
pub use orm::{open, open_with_config};
