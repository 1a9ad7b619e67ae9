//! # Response Serializers
//!
//! A serializer turns the response envelope into bytes and names its content
//! type. Formats are selected per request with `?format=`; `json` is the
//! default and `yaml` is registered out of the box.

use crate::error::{FormatError, SerializeError};
use crate::value::Payload;
use std::collections::HashMap;
use std::sync::Arc;

/// Encodes a response envelope.
pub trait Serializer: Send + Sync {
    /// # Errors
    ///
    /// Returns [`SerializeError`] when the payload cannot be encoded.
    fn serialize(&self, payload: &Payload) -> Result<Vec<u8>, SerializeError>;

    fn content_type(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn serialize(&self, payload: &Payload) -> Result<Vec<u8>, SerializeError> {
        serde_json::to_vec(payload).map_err(|e| SerializeError(e.to_string()))
    }

    fn content_type(&self) -> &'static str {
        "application/json"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct YamlSerializer;

impl Serializer for YamlSerializer {
    fn serialize(&self, payload: &Payload) -> Result<Vec<u8>, SerializeError> {
        serde_yaml::to_string(payload)
            .map(String::into_bytes)
            .map_err(|e| SerializeError(e.to_string()))
    }

    fn content_type(&self) -> &'static str {
        "application/x-yaml"
    }
}

/// Serializers by format name.
#[derive(Clone)]
pub struct SerializerRegistry {
    formats: HashMap<String, Arc<dyn Serializer>>,
}

impl SerializerRegistry {
    /// A registry with no formats at all.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            formats: HashMap::new(),
        }
    }

    /// Registers (or replaces) the serializer for `format`.
    pub fn register(&mut self, format: impl Into<String>, serializer: Arc<dyn Serializer>) {
        self.formats.insert(format.into(), serializer);
    }

    /// # Errors
    ///
    /// [`FormatError::Unknown`] when nothing is registered for `format`.
    pub fn get(&self, format: &str) -> Result<Arc<dyn Serializer>, FormatError> {
        self.formats
            .get(format)
            .cloned()
            .ok_or_else(|| FormatError::Unknown(format.to_string()))
    }

    #[must_use]
    pub fn contains(&self, format: &str) -> bool {
        self.formats.contains_key(format)
    }

    /// Registered format names, sorted.
    #[must_use]
    pub fn formats(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.formats.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for SerializerRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("json", Arc::new(JsonSerializer));
        registry.register("yaml", Arc::new(YamlSerializer));
        registry
    }
}

impl std::fmt::Debug for SerializerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerializerRegistry")
            .field("formats", &self.formats())
            .finish()
    }
}
