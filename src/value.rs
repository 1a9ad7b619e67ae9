//! # Value Module
//!
//! Dynamic values flowing between the wire and resource handlers.
//!
//! A decoded request body is a [`Payload`]: a string-keyed map of field alias to
//! [`Value`]. Values produced by the JSON decoder only ever use the "wire"
//! variants (`Null`, `Bool`, `Float64`, `String`, `Array`, `Object`); the
//! remaining variants appear once the coercion engine has converted a value to
//! the type a rule declares.
//!
//! ## Numbers
//!
//! Every decoded JSON number is a [`Value::Float64`], exactly like a generic
//! JSON decoder would hand it over. Integer widths only appear after coercion.
//!
//! ## Serialization
//!
//! [`Value`] implements [`Serialize`] so a projected payload can be handed to
//! any serializer:
//!
//! - integers and floats serialize as JSON numbers
//! - [`Value::Duration`] serializes as integer nanoseconds
//! - [`Value::Time`] serializes using the `2006-01-02T15:04:05Z` layout

use chrono::{DateTime, TimeDelta, Utc};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Layout used to parse and render [`Value::Time`] (RFC 3339, UTC, `Z` suffix).
pub const TIME_LAYOUT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Decoded body or projected output: field alias → value.
///
/// Keys are kept sorted so serialized output is deterministic.
pub type Payload = BTreeMap<String, Value>;

/// A dynamically typed value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Uint(u64),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    Float32(f32),
    Float64(f64),
    String(String),
    /// Signed duration, nanosecond precision.
    Duration(TimeDelta),
    Time(DateTime<Utc>),
    Array(Vec<Value>),
    Object(Payload),
}

impl Value {
    /// Runtime type name used in coercion error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Int8(_) => "int8",
            Value::Int16(_) => "int16",
            Value::Int32(_) => "int32",
            Value::Int64(_) => "int64",
            Value::Uint(_) => "uint",
            Value::Uint8(_) => "uint8",
            Value::Uint16(_) => "uint16",
            Value::Uint32(_) => "uint32",
            Value::Uint64(_) => "uint64",
            Value::Float32(_) => "float32",
            Value::Float64(_) => "float64",
            Value::String(_) => "string",
            Value::Duration(_) => "duration",
            Value::Time(_) => "time",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&Payload> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Numeric view of any integer or float variant.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Int(v) | Value::Int64(v) => Some(v as f64),
            Value::Int8(v) => Some(f64::from(v)),
            Value::Int16(v) => Some(f64::from(v)),
            Value::Int32(v) => Some(f64::from(v)),
            Value::Uint(v) | Value::Uint64(v) => Some(v as f64),
            Value::Uint8(v) => Some(f64::from(v)),
            Value::Uint16(v) => Some(f64::from(v)),
            Value::Uint32(v) => Some(f64::from(v)),
            Value::Float32(v) => Some(f64::from(v)),
            Value::Float64(v) => Some(v),
            _ => None,
        }
    }

    /// Converts to a `serde_json::Value` (lossless except for non-finite floats,
    /// which become `null`).
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Time(t) => write!(f, "{}", t.format(TIME_LAYOUT)),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

/// Decoder view of JSON: numbers always become [`Value::Float64`].
impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Float64(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Uint64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float32(v)
    }
}

impl From<TimeDelta> for Value {
    fn from(v: TimeDelta) -> Self {
        Value::Duration(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Time(v)
    }
}

impl From<Payload> for Value {
    fn from(v: Payload) -> Self {
        Value::Object(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

// Largest magnitude at which every integer is exactly representable in f64.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Whole floats render without a fractional part (`3`, not `3.0`).
fn integral(v: f64) -> Option<i64> {
    (v.fract() == 0.0 && v.abs() <= MAX_SAFE_INTEGER).then_some(v as i64)
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(v) | Value::Int64(v) => serializer.serialize_i64(*v),
            Value::Int8(v) => serializer.serialize_i8(*v),
            Value::Int16(v) => serializer.serialize_i16(*v),
            Value::Int32(v) => serializer.serialize_i32(*v),
            Value::Uint(v) | Value::Uint64(v) => serializer.serialize_u64(*v),
            Value::Uint8(v) => serializer.serialize_u8(*v),
            Value::Uint16(v) => serializer.serialize_u16(*v),
            Value::Uint32(v) => serializer.serialize_u32(*v),
            Value::Float32(v) => match integral(f64::from(*v)) {
                Some(i) => serializer.serialize_i64(i),
                None => serializer.serialize_f32(*v),
            },
            Value::Float64(v) => match integral(*v) {
                Some(i) => serializer.serialize_i64(i),
                None => serializer.serialize_f64(*v),
            },
            Value::String(s) => serializer.serialize_str(s),
            Value::Duration(d) => match d.num_nanoseconds() {
                Some(ns) => serializer.serialize_i64(ns),
                None => Err(serde::ser::Error::custom("duration overflows i64 nanoseconds")),
            },
            Value::Time(t) => serializer.collect_str(&t.format(TIME_LAYOUT)),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
        }
    }
}

/// Builds a [`Payload`] from `key => value` pairs.
///
/// ```rust
/// use crudrules::{payload, value::Value};
///
/// let p = payload! { "name" => "fido", "age" => 3.0 };
/// assert_eq!(p.get("name"), Some(&Value::from("fido")));
/// ```
#[macro_export]
macro_rules! payload {
    () => { $crate::value::Payload::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::value::Payload::new();
        $( map.insert(::std::string::String::from($key), $crate::value::Value::from($value)); )+
        map
    }};
}
