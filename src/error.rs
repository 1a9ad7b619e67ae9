//! # Error Taxonomy
//!
//! Every failure this crate can surface, grouped by the stage that raises it.
//!
//! | Error | Raised by | HTTP status |
//! |---|---|---|
//! | [`DecodeError`] | body decoding | 400 |
//! | [`CoercionError`] | coercion engine | 422 (via [`ProjectionError`]) |
//! | [`ProjectionError::MissingRequiredField`] | inbound projector | 422 |
//! | [`HandlerError`] | business handler | its own status, else 500 |
//! | [`FormatError`] | serializer lookup | 400, always rendered as JSON |
//! | [`AuthError`] | authentication hook | 401 |
//! | [`RuleSetError`] | startup validation | fatal, never served |
//! | [`StartupError`] | API construction | fatal, never served |
//!
//! Per-request errors are collected into [`PipelineError`], which knows the
//! status each one maps to. Only the first error of a stage is ever reported.

use crate::coerce::Type;
use crate::router::RouteTemplateError;
use http::StatusCode;
use thiserror::Error;

/// A value could not be converted to the type a rule declares.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoercionError {
    /// The source/target pair is not in the coercion matrix.
    #[error("Unable to coerce {from} to {to}")]
    Unsupported { from: &'static str, to: Type },
    /// A number does not fit in the target width.
    #[error("Unable to coerce {from} to {to}: {value} is out of range")]
    OutOfRange {
        from: &'static str,
        to: Type,
        value: f64,
    },
    /// Textual parse failure; carries the underlying parser's message.
    #[error("{0}")]
    Parse(String),
}

/// Inbound projection failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    #[error(transparent)]
    Coercion(#[from] CoercionError),
    #[error("Missing required field '{0}'")]
    MissingRequiredField(String),
}

/// The request body is not a well-formed payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Unable to decode request body: {0}")]
    Malformed(String),
    #[error("Request body must be a JSON {expected}, found {found}")]
    Shape {
        expected: &'static str,
        found: &'static str,
    },
}

/// Error reported by business logic.
///
/// Carries an optional HTTP status; without one the pipeline answers 500.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HandlerError {
    status: Option<StatusCode>,
    message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(message).with_status(StatusCode::BAD_REQUEST)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(message).with_status(StatusCode::NOT_FOUND)
    }

    /// Returned by every verb a handler does not implement.
    #[must_use]
    pub fn not_implemented() -> Self {
        Self::new("Method not implemented").with_status(StatusCode::NOT_IMPLEMENTED)
    }

    #[inline]
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<anyhow::Error> for HandlerError {
    fn from(err: anyhow::Error) -> Self {
        HandlerError::new(format!("{err:#}"))
    }
}

/// Requested response format has no registered serializer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("Format '{0}' not supported")]
    Unknown(String),
}

/// Authentication hook rejected the request. The text becomes the 401 body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct AuthError(pub String);

/// Response body could not be encoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unable to serialize response: {0}")]
pub struct SerializeError(pub String);

/// A RuleSet violates its structural invariants. Fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleSetError {
    #[error("Invalid resource type '{type_name}': rules require a struct or map")]
    InvalidResourceType { type_name: String },
    #[error("Invalid field '{field}': {type_name} has no such field")]
    UnknownField { field: String, type_name: String },
    #[error("Invalid field '{field}' on {type_name}: declared type {declared} does not match field type {actual}")]
    TypeMismatch {
        field: String,
        type_name: String,
        declared: Type,
        actual: Type,
    },
    #[error("Rule for field '{field}' was declared against {declared_on}, not {type_name}")]
    ForeignRule {
        field: String,
        declared_on: String,
        type_name: String,
    },
    #[error("Invalid nested rules for field '{field}': {source}")]
    Nested {
        field: String,
        #[source]
        source: Box<RuleSetError>,
    },
}

/// The API refused to start.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartupError {
    #[error("Invalid rules for resource '{resource}': {source}")]
    InvalidRules {
        resource: String,
        #[source]
        source: RuleSetError,
    },
    #[error("Invalid route for resource '{resource}': {source}")]
    InvalidRoute {
        resource: String,
        #[source]
        source: RouteTemplateError,
    },
    #[error("Resource '{0}' is registered twice")]
    DuplicateResource(String),
    #[error("Default format '{0}' has no serializer")]
    UnknownDefaultFormat(String),
}

/// Per-request failure, mapped onto an HTTP status by [`PipelineError::status`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Projection(#[from] ProjectionError),
    #[error(transparent)]
    Handler(#[from] HandlerError),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Serialize(#[from] SerializeError),
    #[error("Invalid query parameter '{name}': {reason}")]
    Query { name: &'static str, reason: String },
    #[error("No resource found at {method} {path}")]
    RouteNotFound { method: String, path: String },
}

impl PipelineError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            PipelineError::Decode(_) | PipelineError::Format(_) | PipelineError::Query { .. } => {
                StatusCode::BAD_REQUEST
            }
            PipelineError::Projection(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PipelineError::Handler(err) => {
                err.status().unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            PipelineError::Serialize(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PipelineError::RouteNotFound { .. } => StatusCode::NOT_FOUND,
        }
    }
}
