//! Model schema registration
//!
//! A [`Schema`] is the ordered list of field descriptors for a model type plus
//! its lifecycle hooks. Embedded structures contribute their fields and hooks
//! in place, so their columns flatten into the parent's column list.

use super::field::{Field, FieldType};
use super::hooks::{HookEvent, Hooks};

/// Field descriptors and lifecycle hooks of one model type
pub struct Schema<M> {
    fields: Vec<Field<M>>,
    hooks: Hooks<M>,
}

impl<M: 'static> Schema<M> {
    /// Start registering a schema
    pub fn builder() -> SchemaBuilder<M> {
        SchemaBuilder {
            fields: Vec::new(),
            hooks: Hooks::new(),
        }
    }

    /// All descriptors in registration order, ignored fields included
    pub fn fields(&self) -> &[Field<M>] {
        &self.fields
    }

    /// Look up a descriptor by attribute name
    pub fn field(&self, name: &str) -> Option<&Field<M>> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Look up a descriptor by column name
    pub fn column(&self, column: &str) -> Option<&Field<M>> {
        self.fields.iter().find(|f| f.column_name() == column)
    }

    /// Column names of every field that takes part in SQL generation
    pub fn columns(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| !f.is_ignore())
            .map(|f| f.column_name())
            .collect()
    }

    /// First descriptor flagged as primary key
    pub fn primary_key(&self) -> Option<&Field<M>> {
        self.fields.iter().find(|f| f.is_primary_key())
    }

    pub fn hooks(&self) -> &Hooks<M> {
        &self.hooks
    }

    /// Re-root this schema onto a structure that embeds `M`
    pub fn lift<P: 'static>(self, get: fn(&P) -> &M, get_mut: fn(&mut P) -> &mut M) -> Schema<P> {
        Schema {
            fields: self
                .fields
                .into_iter()
                .map(|f| f.lift(get, get_mut))
                .collect(),
            hooks: self.hooks.lift(get_mut),
        }
    }
}

impl<M> std::fmt::Debug for Schema<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("fields", &self.fields)
            .field("hooks", &self.hooks)
            .finish()
    }
}

/// Fluent schema registration
///
/// # Example
///
/// ```
/// use swallow::model::{BaseModel, Schema};
///
/// #[derive(Default)]
/// struct User {
///     id: i64,
///     name: String,
///     base: BaseModel,
/// }
///
/// let schema = Schema::builder()
///     .field("id", "PRIMARY_KEY;", |u: &User| &u.id, |u: &mut User| &mut u.id)
///     .field("name", "", |u: &User| &u.name, |u: &mut User| &mut u.name)
///     .embed(BaseModel::schema(), |u: &User| &u.base, |u: &mut User| &mut u.base)
///     .build();
///
/// assert_eq!(schema.primary_key().map(|f| f.column_name()), Some("id"));
/// assert!(schema.columns().contains(&"insert_at"));
/// ```
pub struct SchemaBuilder<M> {
    fields: Vec<Field<M>>,
    hooks: Hooks<M>,
}

impl<M: 'static> SchemaBuilder<M> {
    /// Register a settable field
    #[must_use]
    pub fn field<T: FieldType>(
        mut self,
        name: &str,
        tag: &str,
        get: fn(&M) -> &T,
        get_mut: fn(&mut M) -> &mut T,
    ) -> Self {
        self.fields.push(Field::new(name, tag, get, get_mut));
        self
    }

    /// Register a field the decoder never writes
    #[must_use]
    pub fn read_only<T: FieldType>(mut self, name: &str, tag: &str, get: fn(&M) -> &T) -> Self {
        self.fields.push(Field::read_only(name, tag, get));
        self
    }

    /// Flatten an embedded structure's fields and hooks into this schema
    #[must_use]
    pub fn embed<E: 'static>(
        mut self,
        schema: Schema<E>,
        get: fn(&M) -> &E,
        get_mut: fn(&mut M) -> &mut E,
    ) -> Self {
        let lifted = schema.lift(get, get_mut);
        self.fields.extend(lifted.fields);
        self.hooks.extend(lifted.hooks);
        self
    }

    /// Register a callback for `event`
    #[must_use]
    pub fn hook(mut self, event: HookEvent, hook: impl Fn(&mut M) + Send + Sync + 'static) -> Self {
        self.hooks.register(event, hook);
        self
    }

    #[must_use]
    pub fn before_find(self, hook: impl Fn(&mut M) + Send + Sync + 'static) -> Self {
        self.hook(HookEvent::BeforeFind, hook)
    }

    #[must_use]
    pub fn before_save(self, hook: impl Fn(&mut M) + Send + Sync + 'static) -> Self {
        self.hook(HookEvent::BeforeSave, hook)
    }

    #[must_use]
    pub fn before_create(self, hook: impl Fn(&mut M) + Send + Sync + 'static) -> Self {
        self.hook(HookEvent::BeforeCreate, hook)
    }

    #[must_use]
    pub fn before_delete(self, hook: impl Fn(&mut M) + Send + Sync + 'static) -> Self {
        self.hook(HookEvent::BeforeDelete, hook)
    }

    /// Finish registration
    pub fn build(self) -> Schema<M> {
        Schema {
            fields: self.fields,
            hooks: self.hooks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Audit {
        created: i64,
        touched: u32,
    }

    #[derive(Default)]
    struct Post {
        id: i64,
        title: String,
        draft: bool,
        audit: Audit,
    }

    fn audit_schema() -> Schema<Audit> {
        Schema::builder()
            .field("created", "column:created_at;", |a: &Audit| &a.created, |a: &mut Audit| &mut a.created)
            .before_save(|a: &mut Audit| a.touched += 1)
            .build()
    }

    fn post_schema() -> Schema<Post> {
        Schema::builder()
            .field("id", "PRIMARY_KEY;", |p: &Post| &p.id, |p: &mut Post| &mut p.id)
            .field("title", "", |p: &Post| &p.title, |p: &mut Post| &mut p.title)
            .field("draft", "-;", |p: &Post| &p.draft, |p: &mut Post| &mut p.draft)
            .embed(audit_schema(), |p: &Post| &p.audit, |p: &mut Post| &mut p.audit)
            .build()
    }

    #[test]
    fn test_fields_flatten_in_order() {
        let schema = post_schema();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["id", "title", "draft", "created"]);
    }

    #[test]
    fn test_columns_skip_ignored() {
        let schema = post_schema();
        assert_eq!(schema.columns(), vec!["id", "title", "created_at"]);
        // ignored descriptors are still produced
        assert!(schema.field("draft").is_some_and(|f| f.is_ignore()));
    }

    #[test]
    fn test_primary_key_lookup() {
        let schema = post_schema();
        assert_eq!(schema.primary_key().map(|f| f.name()), Some("id"));

        let schema = audit_schema();
        assert!(schema.primary_key().is_none());
    }

    #[test]
    fn test_embedded_fields_write_through() {
        let schema = post_schema();
        let mut post = Post::default();

        let created = schema.column("created_at").unwrap();
        created
            .set(&mut post, &crate::core::value::DatabaseValue::Long(99))
            .unwrap();
        assert_eq!(post.audit.created, 99);
    }

    #[test]
    fn test_embedded_hooks_are_lifted() {
        let schema = post_schema();
        let mut post = Post::default();

        schema.hooks().run(HookEvent::BeforeSave, &mut post);
        assert_eq!(post.audit.touched, 1);
        assert_eq!(schema.hooks().count(HookEvent::BeforeFind), 0);
    }
}
