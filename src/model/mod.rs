//! Model metadata
//!
//! Models register their fields, column tags and lifecycle hooks once through
//! [`Schema::builder`]; the CRUD engine asks for a fresh [`Schema`] on every
//! operation and never inspects types at runtime.

pub mod base;
pub mod field;
pub mod hooks;
pub mod schema;
pub mod tag;

pub use base::BaseModel;
pub use field::{Field, FieldKind, FieldType};
pub use hooks::{Hook, HookEvent, Hooks};
pub use schema::{Schema, SchemaBuilder};
pub use tag::{parse_tag, TagMeta};

/// An application record mapped to one table
///
/// # Example
///
/// ```
/// use swallow::model::{Model, Schema};
///
/// #[derive(Debug, Default)]
/// struct Student {
///     id: i64,
///     name: String,
/// }
///
/// impl Model for Student {
///     fn schema() -> Schema<Self> {
///         Schema::builder()
///             .field("id", "PRIMARY_KEY;", |s: &Student| &s.id, |s: &mut Student| &mut s.id)
///             .field("name", "column:name;", |s: &Student| &s.name, |s: &mut Student| &mut s.name)
///             .build()
///     }
/// }
///
/// assert_eq!(Student::table_name(), "Student");
/// ```
pub trait Model: Default + Send + Sync + 'static {
    /// Field descriptors and hooks for this type
    fn schema() -> Schema<Self>;

    /// Table name; defaults to the type's own name
    fn table_name() -> String {
        default_table_name::<Self>()
    }
}

/// The bare type name of `T`, without module path or generic arguments
pub fn default_table_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Order;

    #[allow(dead_code)]
    struct Page<T>(T);

    #[test]
    fn test_default_table_name() {
        assert_eq!(default_table_name::<Order>(), "Order");
        assert_eq!(default_table_name::<Page<Order>>(), "Page");
        assert_eq!(default_table_name::<BaseModel>(), "BaseModel");
    }
}
