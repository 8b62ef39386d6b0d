//! Model-aware CRUD on top of a [`Database`](crate::core::Database)

pub mod connection;
pub mod decoder;
pub mod plan;

pub use connection::{close, Connection};
#[cfg(feature = "sqlite")]
pub use connection::{open, open_with_config};
pub use decoder::{decode_raw, decode_row, decode_rows};
pub use plan::{delete_statement, insert_statement, select_query, update_statement};
