//! Field descriptors
//!
//! A [`Field`] is the resolved metadata for one model attribute plus a handle
//! to read and write its current value.

use super::tag::{parse_tag, TagMeta};
use crate::core::error::{DatabaseError, Result};
use crate::core::value::DatabaseValue;
use std::fmt;
use std::sync::Arc;

/// Storage kind of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Text
    String,
    /// Signed integer
    Integer,
    /// Boolean
    Boolean,
    /// Floating point
    Float,
}

/// Rust types that can back a model field
pub trait FieldType: Sized + Send + Sync + 'static {
    /// Storage kind of this type
    const KIND: FieldKind;

    /// Convert the current value into a bindable value
    fn to_value(&self) -> DatabaseValue;

    /// Convert a decoded value back into this type
    fn from_value(value: &DatabaseValue) -> Result<Self>;
}

impl FieldType for String {
    const KIND: FieldKind = FieldKind::String;

    fn to_value(&self) -> DatabaseValue {
        DatabaseValue::String(self.clone())
    }

    fn from_value(value: &DatabaseValue) -> Result<Self> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| DatabaseError::type_mismatch("string", value.type_name()))
    }
}

impl FieldType for i32 {
    const KIND: FieldKind = FieldKind::Integer;

    fn to_value(&self) -> DatabaseValue {
        DatabaseValue::Int(*self)
    }

    fn from_value(value: &DatabaseValue) -> Result<Self> {
        value
            .as_int()
            .ok_or_else(|| DatabaseError::type_mismatch("int", value.type_name()))
    }
}

impl FieldType for i64 {
    const KIND: FieldKind = FieldKind::Integer;

    fn to_value(&self) -> DatabaseValue {
        DatabaseValue::Long(*self)
    }

    fn from_value(value: &DatabaseValue) -> Result<Self> {
        value
            .as_long()
            .ok_or_else(|| DatabaseError::type_mismatch("long", value.type_name()))
    }
}

impl FieldType for bool {
    const KIND: FieldKind = FieldKind::Boolean;

    fn to_value(&self) -> DatabaseValue {
        DatabaseValue::Bool(*self)
    }

    fn from_value(value: &DatabaseValue) -> Result<Self> {
        value
            .as_bool()
            .ok_or_else(|| DatabaseError::type_mismatch("bool", value.type_name()))
    }
}

impl FieldType for f32 {
    const KIND: FieldKind = FieldKind::Float;

    fn to_value(&self) -> DatabaseValue {
        DatabaseValue::Float(*self)
    }

    fn from_value(value: &DatabaseValue) -> Result<Self> {
        value
            .as_float()
            .ok_or_else(|| DatabaseError::type_mismatch("float", value.type_name()))
    }
}

impl FieldType for f64 {
    const KIND: FieldKind = FieldKind::Float;

    fn to_value(&self) -> DatabaseValue {
        DatabaseValue::Double(*self)
    }

    fn from_value(value: &DatabaseValue) -> Result<Self> {
        value
            .as_double()
            .ok_or_else(|| DatabaseError::type_mismatch("double", value.type_name()))
    }
}

type Getter<M> = Arc<dyn Fn(&M) -> DatabaseValue + Send + Sync>;
type Setter<M> = Arc<dyn Fn(&mut M, &DatabaseValue) -> Result<()> + Send + Sync>;

/// Resolved metadata and value handle for one model attribute
pub struct Field<M> {
    name: String,
    tag: TagMeta,
    kind: FieldKind,
    getter: Getter<M>,
    setter: Option<Setter<M>>,
}

impl<M: 'static> Field<M> {
    /// Describe a settable field
    pub fn new<T: FieldType>(
        name: impl Into<String>,
        tag: &str,
        get: fn(&M) -> &T,
        get_mut: fn(&mut M) -> &mut T,
    ) -> Self {
        Self {
            name: name.into(),
            tag: parse_tag(tag),
            kind: T::KIND,
            getter: Arc::new(move |model: &M| get(model).to_value()),
            setter: Some(Arc::new(
                move |model: &mut M, value: &DatabaseValue| -> Result<()> {
                    *get_mut(model) = T::from_value(value)?;
                    Ok(())
                },
            )),
        }
    }

    /// Describe a field that can be read but never written back
    pub fn read_only<T: FieldType>(name: impl Into<String>, tag: &str, get: fn(&M) -> &T) -> Self {
        Self {
            name: name.into(),
            tag: parse_tag(tag),
            kind: T::KIND,
            getter: Arc::new(move |model: &M| get(model).to_value()),
            setter: None,
        }
    }

    /// Re-root this descriptor onto a structure that embeds `M`
    pub fn lift<P: 'static>(self, get: fn(&P) -> &M, get_mut: fn(&mut P) -> &mut M) -> Field<P> {
        let getter = self.getter;
        let setter = self.setter;

        Field {
            name: self.name,
            tag: self.tag,
            kind: self.kind,
            getter: Arc::new(move |parent: &P| getter(get(parent))),
            setter: setter.map(|setter| -> Setter<P> {
                Arc::new(move |parent: &mut P, value: &DatabaseValue| {
                    setter(get_mut(parent), value)
                })
            }),
        }
    }
}

impl<M> Field<M> {
    /// Attribute name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column name: the tag override, or the attribute name
    pub fn column_name(&self) -> &str {
        self.tag.column.as_deref().unwrap_or(&self.name)
    }

    /// Parsed tag metadata
    pub fn tag(&self) -> &TagMeta {
        &self.tag
    }

    /// Storage kind
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn is_primary_key(&self) -> bool {
        self.tag.primary_key
    }

    pub fn is_ignore(&self) -> bool {
        self.tag.ignore
    }

    pub fn is_settable(&self) -> bool {
        self.setter.is_some()
    }

    /// Current value of this field on `model`
    pub fn value(&self, model: &M) -> DatabaseValue {
        (self.getter)(model)
    }

    /// Check if the current value is the zero value of its kind
    pub fn is_blank(&self, model: &M) -> bool {
        self.value(model).is_blank()
    }

    /// Write a value into `model`
    ///
    /// Returns `Ok(false)` without touching the model when the field is read-only.
    pub fn set(&self, model: &mut M, value: &DatabaseValue) -> Result<bool> {
        match &self.setter {
            Some(setter) => {
                setter(model, value)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl<M> Clone for Field<M> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            tag: self.tag.clone(),
            kind: self.kind,
            getter: Arc::clone(&self.getter),
            setter: self.setter.clone(),
        }
    }
}

impl<M> fmt::Debug for Field<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("column", &self.column_name())
            .field("kind", &self.kind)
            .field("primary_key", &self.is_primary_key())
            .field("ignore", &self.is_ignore())
            .field("settable", &self.is_settable())
            .finish()
    }
}
