//! # Coerce Module
//!
//! The type coercion engine converts a decoded dynamic [`Value`](crate::value::Value)
//! into the [`Type`] a rule declares.
//!
//! ## Coercion Matrix
//!
//! Dispatch is on the runtime type of the incoming value crossed with the target:
//!
//! | source | valid targets |
//! |---|---|
//! | bool | bool, string (`"true"`/`"false"`) |
//! | number | every integer width, every float width, string (decimal), duration (nanoseconds) |
//! | string | every numeric width (parsed), bool, duration (`"1h30m"`, `"100ns"`), time (`2006-01-02T15:04:05Z`), string |
//! | array | array |
//! | object | object |
//! | null | anything (passthrough) |
//!
//! [`Type::Unspecified`] never coerces, and a value that already has the target
//! type is returned unchanged, so coercion is idempotent.
//!
//! ## Errors
//!
//! Unlisted pairs fail with a message naming both types:
//!
//! ```rust
//! use crudrules::coerce::{coerce, Type};
//! use crudrules::value::Value;
//!
//! let err = coerce(Value::Bool(true), Type::Float32).unwrap_err();
//! assert_eq!(err.to_string(), "Unable to coerce bool to float32");
//!
//! assert_eq!(coerce(Value::from("42"), Type::Int).unwrap(), Value::Int(42));
//! ```
//!
//! String parse failures carry the underlying parser's message verbatim.

mod core;
mod duration;

pub use core::{coerce, Type};
pub use duration::{parse_duration, DurationError};
