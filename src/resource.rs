//! # Resource Module
//!
//! Business values exposed through the API, and the startup-built type
//! descriptors the projectors use to read them.
//!
//! ## Resource shapes
//!
//! A handler hands back a [`Resource`], a tagged variant:
//!
//! - [`Resource::Struct`] - a native Rust value wrapped in a [`StructValue`]
//! - [`Resource::Map`] - a generic string-keyed [`Payload`]
//! - [`Resource::List`] - a sequence of resources
//! - [`Resource::Value`] - anything else; passed through without projection
//!
//! ## Type descriptors
//!
//! Instead of inspecting types at request time, each resource type gets a
//! [`TypeDescriptor`] built once at startup. For structs it lists every
//! field with its declared [`Type`] and an accessor:
//!
//! ```rust
//! use crudrules::coerce::Type;
//! use crudrules::resource::{Resource, TypeDescriptor};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Widget {
//!     name: String,
//!     size: i64,
//! }
//!
//! let widget = TypeDescriptor::record::<Widget>("Widget")
//!     .field("Name", Type::String, |w: &Widget| w.name.clone())
//!     .field("Size", Type::Int, |w: &Widget| w.size)
//!     .build();
//!
//! let value = Resource::record(Widget { name: "gear".into(), size: 3 });
//! assert!(widget.describes(&value));
//! ```

use crate::coerce::Type;
use crate::value::{Payload, Value};
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

type Erased = dyn Any + Send + Sync;

/// Type-erased native struct that still knows how to reach the wire.
#[derive(Clone)]
pub struct StructValue {
    inner: Arc<Erased>,
    type_name: &'static str,
    to_value: fn(&Erased) -> Value,
}

fn erased_to_value<T: Serialize + 'static>(any: &Erased) -> Value {
    any.downcast_ref::<T>()
        .and_then(|v| serde_json::to_value(v).ok())
        .map_or(Value::Null, Value::from)
}

impl StructValue {
    pub fn new<T>(value: T) -> Self
    where
        T: Serialize + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(value),
            type_name: std::any::type_name::<T>(),
            to_value: erased_to_value::<T>,
        }
    }

    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// `TypeId` of the wrapped value.
    #[must_use]
    pub fn value_type_id(&self) -> TypeId {
        <Erased as Any>::type_id(self.inner.as_ref())
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Serializes the wrapped struct as-is, without projection.
    #[must_use]
    pub fn to_value(&self) -> Value {
        (self.to_value)(self.inner.as_ref())
    }
}

impl fmt::Debug for StructValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructValue")
            .field("type", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Business value returned by a resource handler.
#[derive(Debug, Clone)]
pub enum Resource {
    Struct(StructValue),
    Map(Payload),
    List(Vec<Resource>),
    Value(Value),
}

impl Resource {
    /// Wraps a native struct.
    pub fn record<T>(value: T) -> Self
    where
        T: Serialize + Send + Sync + 'static,
    {
        Resource::Struct(StructValue::new(value))
    }

    pub fn list<I, R>(items: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Resource>,
    {
        Resource::List(items.into_iter().map(Into::into).collect())
    }

    /// True for values that project to themselves: `null`, an empty map and an
    /// empty list.
    #[must_use]
    pub fn is_empty_equivalent(&self) -> bool {
        match self {
            Resource::Value(v) => v.is_null(),
            Resource::Map(map) => map.is_empty(),
            Resource::List(items) => items.is_empty(),
            Resource::Struct(_) => false,
        }
    }

    /// Lowers the resource to a wire value. Structs serialize unprojected.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Resource::Struct(s) => s.to_value(),
            Resource::Map(map) => Value::Object(map),
            Resource::List(items) => {
                Value::Array(items.into_iter().map(Resource::into_value).collect())
            }
            Resource::Value(v) => v,
        }
    }
}

impl From<Value> for Resource {
    fn from(v: Value) -> Self {
        Resource::Value(v)
    }
}

impl From<Payload> for Resource {
    fn from(v: Payload) -> Self {
        Resource::Map(v)
    }
}

impl From<StructValue> for Resource {
    fn from(v: StructValue) -> Self {
        Resource::Struct(v)
    }
}

impl From<Vec<Resource>> for Resource {
    fn from(v: Vec<Resource>) -> Self {
        Resource::List(v)
    }
}

macro_rules! resource_from_scalar {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for Resource {
                fn from(v: $ty) -> Self {
                    Resource::Value(Value::from(v))
                }
            }
        )+
    };
}

resource_from_scalar!(bool, &str, String, i32, i64, u64, f32, f64, TimeDelta, DateTime<Utc>);

/// Reads one field off a type-erased struct.
pub type Accessor = Arc<dyn Fn(&Erased) -> Option<Resource> + Send + Sync>;

/// One entry of a struct's field table.
#[derive(Clone)]
pub struct FieldDescriptor {
    name: String,
    ty: Type,
    accessor: Accessor,
}

impl FieldDescriptor {
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type of the field. [`Type::Unspecified`] marks a dynamic field.
    #[inline]
    #[must_use]
    pub fn ty(&self) -> Type {
        self.ty
    }

    /// Reads the field; `None` if `value` is not of the described type.
    #[must_use]
    pub fn read(&self, value: &StructValue) -> Option<Resource> {
        (self.accessor)(value.inner.as_ref())
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .finish_non_exhaustive()
    }
}

/// What kind of value a [`TypeDescriptor`] describes.
#[derive(Debug, Clone)]
pub enum Shape {
    Record {
        type_id: TypeId,
        fields: Vec<FieldDescriptor>,
    },
    Map,
    Opaque { type_id: TypeId },
}

/// Startup-built description of a resource type.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    name: String,
    shape: Shape,
}

impl TypeDescriptor {
    /// Starts the field table for struct `T`.
    pub fn record<T: Any + Send + Sync>(name: impl Into<String>) -> RecordBuilder<T> {
        RecordBuilder {
            name: name.into(),
            fields: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Generic string-keyed map resource. Any key is a resolvable field.
    pub fn map(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shape: Shape::Map,
        }
    }

    /// A type that is neither struct nor map. Rules cannot be declared on it.
    pub fn opaque<T: Any>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shape: Shape::Opaque {
                type_id: TypeId::of::<T>(),
            },
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    #[must_use]
    pub fn is_map(&self) -> bool {
        matches!(self.shape, Shape::Map)
    }

    /// Looks up a struct field by name. Always `None` for maps and opaque types.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        match &self.shape {
            Shape::Record { fields, .. } => fields.iter().find(|f| f.name == name),
            _ => None,
        }
    }

    /// True when `resource` has the shape this descriptor describes.
    #[must_use]
    pub fn describes(&self, resource: &Resource) -> bool {
        match (&self.shape, resource) {
            (Shape::Record { .. }, Resource::Struct(s)) => self.describes_struct(s),
            (Shape::Map, Resource::Map(_)) => true,
            _ => false,
        }
    }

    /// True when `value` is the struct type this descriptor was built for.
    #[must_use]
    pub fn describes_struct(&self, value: &StructValue) -> bool {
        match &self.shape {
            Shape::Record { type_id, .. } => value.value_type_id() == *type_id,
            _ => false,
        }
    }

    /// Identity used to tell descriptors apart.
    #[must_use]
    pub(crate) fn same_type(&self, other: &TypeDescriptor) -> bool {
        match (&self.shape, &other.shape) {
            (Shape::Record { type_id: a, .. }, Shape::Record { type_id: b, .. })
            | (Shape::Opaque { type_id: a }, Shape::Opaque { type_id: b }) => a == b,
            (Shape::Map, Shape::Map) => self.name == other.name,
            _ => false,
        }
    }
}

/// Builder for a struct's field table. See [`TypeDescriptor::record`].
pub struct RecordBuilder<T> {
    name: String,
    fields: Vec<FieldDescriptor>,
    _marker: PhantomData<fn(&T)>,
}

impl<T: Any + Send + Sync> RecordBuilder<T> {
    /// Adds a field with its declared type and accessor.
    #[must_use]
    pub fn field<F, R>(mut self, name: impl Into<String>, ty: Type, get: F) -> Self
    where
        F: Fn(&T) -> R + Send + Sync + 'static,
        R: Into<Resource>,
    {
        let accessor: Accessor =
            Arc::new(move |any: &Erased| any.downcast_ref::<T>().map(|v| get(v).into()));
        self.fields.push(FieldDescriptor {
            name: name.into(),
            ty,
            accessor,
        });
        self
    }

    #[must_use]
    pub fn build(self) -> TypeDescriptor {
        TypeDescriptor {
            name: self.name,
            shape: Shape::Record {
                type_id: TypeId::of::<T>(),
                fields: self.fields,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Gadget {
        label: String,
        parts: Vec<String>,
    }

    fn gadget_type() -> TypeDescriptor {
        TypeDescriptor::record::<Gadget>("Gadget")
            .field("Label", Type::String, |g: &Gadget| g.label.clone())
            .field("Parts", Type::Array, |g: &Gadget| {
                Resource::list(g.parts.iter().map(String::as_str))
            })
            .build()
    }

    #[test]
    fn test_field_accessor_reads_value() {
        let ty = gadget_type();
        let gadget = StructValue::new(Gadget {
            label: "sprocket".into(),
            parts: vec!["a".into()],
        });
        let label = ty.field("Label").unwrap().read(&gadget).unwrap();
        assert_eq!(label.into_value(), Value::from("sprocket"));
        assert!(ty.field("Missing").is_none());
    }

    #[test]
    fn test_describes_checks_type_identity() {
        let ty = gadget_type();
        assert!(ty.describes(&Resource::record(Gadget {
            label: String::new(),
            parts: vec![],
        })));
        assert!(!ty.describes(&Resource::record(42_u8)));
        assert!(!ty.describes(&Resource::Map(Payload::new())));
        assert!(TypeDescriptor::map("Any").describes(&Resource::Map(Payload::new())));
    }

    #[test]
    fn test_unprojected_struct_serializes() {
        let r = Resource::record(Gadget {
            label: "x".into(),
            parts: vec!["p".into()],
        });
        let v = r.into_value();
        assert_eq!(v.to_json(), serde_json::json!({"label": "x", "parts": ["p"]}));
    }
}
