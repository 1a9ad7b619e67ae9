//! # Projection Module
//!
//! Filters and transforms values through a [`RuleSet`](crate::rules::RuleSet)
//! in both directions.
//!
//! ## Inbound (wire → handler)
//!
//! [`project_inbound`] turns a decoded request [`Payload`](crate::value::Payload)
//! into the payload a handler receives:
//!
//! 1. a missing payload becomes an empty one
//! 2. rules are filtered to non-output-only rules applicable to the version
//! 3. each incoming key is matched to a rule by alias; unknown keys are dropped
//! 4. matched values are coerced to the rule's type, projected through nested
//!    rules, then passed through the rule's input transform
//! 5. the first required alias missing from the result fails the whole payload
//!
//! ## Outbound (handler → wire)
//!
//! [`project_outbound`] turns a handler's [`Resource`](crate::resource::Resource)
//! into the version-scoped wire shape. Maps are read by field name, structs
//! through their [`TypeDescriptor`](crate::resource::TypeDescriptor). Values of
//! any other shape, including structs of a different type, are returned as-is
//! so handlers can bypass projection by returning a pre-shaped value.
//!
//! ```rust
//! use crudrules::projection::{project_inbound, project_outbound};
//! use crudrules::resource::{Resource, TypeDescriptor};
//! use crudrules::rules::{Rule, RuleSet};
//! use crudrules::{coerce::Type, payload, value::Value};
//!
//! let rules = RuleSet::new(
//!     TypeDescriptor::map("Counter"),
//!     [Rule::new("count").with_alias("n").with_type(Type::Int)],
//! );
//!
//! let inbound = project_inbound(Some(payload! { "n" => "42" }), &rules, "1").unwrap();
//! assert_eq!(inbound.get("n"), Some(&Value::Int(42)));
//!
//! let outbound = project_outbound(Resource::Map(payload! { "count" => 7_i64 }), &rules, "1");
//! assert_eq!(outbound.into_value(), Value::Object(payload! { "n" => 7_i64 }));
//! ```

mod inbound;
mod outbound;

pub use inbound::project_inbound;
pub use outbound::project_outbound;
