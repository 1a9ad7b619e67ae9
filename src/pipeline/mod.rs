//! # Request Pipeline
//!
//! Per-verb request processing between the router and the business handler.
//!
//! ## Stages
//!
//! ```text
//! Decoding -> VersionResolved -> ProjectingInbound -> Invoking -> ProjectingOutbound -> Responding
//! ```
//!
//! Create, Update and UpdateList run every stage. Read, ReadList and Delete
//! skip decoding and inbound projection. Any stage may fail; the first error
//! short-circuits the rest and is recorded in the [`RequestContext`].
//!
//! ## Status policy
//!
//! | Outcome | Status |
//! |---|---|
//! | create returned a resource | 201 |
//! | create returned nothing | 204, empty body |
//! | read / readList / update / updateList / delete | 200 |
//! | malformed body | 400 |
//! | coercion failure or missing required field | 422 |
//! | handler error | its own status, else 500 |
//! | verb not implemented | 501 |
//!
//! [`RequestContext`]: crate::context::RequestContext

mod core;
mod response;

pub use core::{decode_array, decode_object, Pipeline, Stage};
pub use response::{json_error, render, render_context, text, Envelope, HttpResponse};
