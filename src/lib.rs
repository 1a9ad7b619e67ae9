//! # crudrules
//!
//! **crudrules** is the schema rule engine and request pipeline of a CRUD-style
//! REST toolkit. It sits between raw wire payloads and business-logic resource
//! handlers: it coerces incoming values to declared types, projects payloads in
//! and out of a version-scoped field schema, and runs each HTTP verb through a
//! fail-fast pipeline with a fixed status-code policy.
//!
//! ## Architecture
//!
//! The library is organized leaf-first:
//!
//! - **[`value`]** - the dynamic [`Value`] model and [`Payload`] maps
//! - **[`coerce`]** - the type coercion engine and its target [`Type`]s
//! - **[`resource`]** - handler results and startup-built type descriptors
//! - **[`rules`]** - [`Rule`]s, [`RuleSet`]s, startup validation, rule files
//! - **[`projection`]** - inbound and outbound projectors
//! - **[`context`]** - the per-request [`RequestContext`]
//! - **[`handler`]** - the [`ResourceHandler`] trait and CRUD [`Verb`]s
//! - **[`pipeline`]** - per-verb orchestration and the response envelope
//! - **[`serializer`]** - response formats (`json`, `yaml`)
//! - **[`router`]** - URI template matching
//! - **[`middleware`]** - before/after request hooks
//! - **[`api`]** - registration, startup validation and request dispatch
//! - **[`config`]**, **[`logging`]**, **[`cli`]** - ambient concerns
//!
//! ### Data flow
//!
//! ```text
//! bytes -> Pipeline -> Inbound Projector (coercion, RuleSet) -> handler
//!       -> Outbound Projector (RuleSet) -> envelope -> Serializer -> bytes
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use crudrules::api::ApiBuilder;
//! use crudrules::coerce::Type;
//! use crudrules::config::ApiConfig;
//! use crudrules::handler::ResourceHandler;
//! use crudrules::resource::{Resource, TypeDescriptor};
//! use crudrules::rules::{Rule, RuleSet};
//! use crudrules::{HandlerError, Payload, RequestContext};
//!
//! struct Counters;
//!
//! impl ResourceHandler for Counters {
//!     fn resource_name(&self) -> &str {
//!         "counters"
//!     }
//!
//!     fn rules(&self) -> RuleSet {
//!         RuleSet::new(
//!             TypeDescriptor::map("Counter"),
//!             [Rule::new("count").with_type(Type::Int).required()],
//!         )
//!     }
//!
//!     fn create_resource(
//!         &self,
//!         _ctx: &mut RequestContext,
//!         data: Payload,
//!         _version: &str,
//!     ) -> Result<Option<Resource>, HandlerError> {
//!         Ok(Some(Resource::Map(data)))
//!     }
//! }
//!
//! let api = ApiBuilder::new(ApiConfig::default())
//!     .register(Counters)
//!     .build()
//!     .expect("valid rules");
//!
//! let req = http::Request::post("/api/v1/counters")
//!     .body(br#"{"count": "42", "extra": true}"#.to_vec())
//!     .unwrap();
//! let res = api.handle(req);
//! assert_eq!(res.status(), 201);
//! assert_eq!(res.body().as_slice(), br#"{"result":{"count":42},"success":true}"#);
//! ```
//!
//! ## Error Handling
//!
//! Library errors are typed ([`error`]); every per-request failure maps to an
//! HTTP status through [`PipelineError::status`]. A bad RuleSet is a
//! [`StartupError`] and the API refuses to build.

pub mod api;
pub mod cli;
pub mod coerce;
pub mod config;
pub mod context;
pub mod error;
pub mod handler;
pub mod logging;
pub mod middleware;
pub mod pipeline;
pub mod projection;
pub mod resource;
pub mod router;
pub mod rules;
pub mod serializer;
pub mod value;

pub use api::{Api, ApiBuilder};
pub use coerce::{coerce, Type};
pub use context::{RequestContext, RequestId};
pub use error::{
    AuthError, CoercionError, DecodeError, FormatError, HandlerError, PipelineError,
    ProjectionError, RuleSetError, SerializeError, StartupError,
};
pub use handler::{ResourceHandler, Verb};
pub use projection::{project_inbound, project_outbound};
pub use resource::{Resource, StructValue, TypeDescriptor};
pub use rules::{Direction, Rule, RuleSet};
pub use value::{Payload, Value};
