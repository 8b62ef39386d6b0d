//! Audit base shared by models
//!
//! Embed [`BaseModel`] with [`SchemaBuilder::embed`](super::SchemaBuilder::embed)
//! to get insertion/update/deletion timestamps, the soft-delete flag and the
//! hooks that maintain them.

use super::schema::Schema;
use serde::{Deserialize, Serialize};

/// Audit columns and soft-delete state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseModel {
    /// Insertion time, epoch milliseconds
    pub insert_at: i64,
    /// Last update time, epoch milliseconds
    pub update_at: i64,
    /// Deletion time, epoch milliseconds
    pub delete_at: i64,
    /// Soft-delete flag
    #[serde(skip)]
    pub is_deleted: bool,
    /// Not persisted
    #[serde(skip)]
    pub is_new_record: bool,
}

impl BaseModel {
    /// Field descriptors and hooks of the audit base
    ///
    /// - before find: resets `is_deleted`, and since booleans are never blank
    ///   every find filters on `is_deleted = false`
    /// - before save: stamps `update_at`
    /// - before create: stamps `insert_at`
    /// - before delete: nothing; soft delete is not wired up
    pub fn schema() -> Schema<BaseModel> {
        Schema::builder()
            .field(
                "insert_at",
                "column:insert_at;",
                |m: &BaseModel| &m.insert_at,
                |m: &mut BaseModel| &mut m.insert_at,
            )
            .field(
                "update_at",
                "column:update_at;",
                |m: &BaseModel| &m.update_at,
                |m: &mut BaseModel| &mut m.update_at,
            )
            .field(
                "delete_at",
                "column:delete_at;",
                |m: &BaseModel| &m.delete_at,
                |m: &mut BaseModel| &mut m.delete_at,
            )
            .field(
                "is_deleted",
                "column:is_deleted;",
                |m: &BaseModel| &m.is_deleted,
                |m: &mut BaseModel| &mut m.is_deleted,
            )
            .field(
                "is_new_record",
                "-;",
                |m: &BaseModel| &m.is_new_record,
                |m: &mut BaseModel| &mut m.is_new_record,
            )
            .before_find(|m: &mut BaseModel| m.is_deleted = false)
            .before_save(|m: &mut BaseModel| m.update_at = now_millis())
            .before_create(|m: &mut BaseModel| m.insert_at = now_millis())
            .build()
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
