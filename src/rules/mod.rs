//! # Rules Module
//!
//! Declarative descriptions of how a resource's fields map to and from the wire.
//!
//! ## Overview
//!
//! A [`Rule`] describes one logical field:
//!
//! - `field` - the name of the field on the resource
//! - `alias` - the wire name (defaults to `field`)
//! - `type` - the [`Type`](crate::coerce::Type) inbound values are coerced to
//! - `required` - inbound payloads missing the field are rejected
//! - `versions` - API versions the rule applies to (empty means all)
//! - `direction` - both ways, input only, or output only
//! - optional input/output transforms and a nested [`RuleSet`]
//!
//! A [`RuleSet`] is the ordered list of rules for one resource type. RuleSets
//! are built once at startup and shared read-only by every request.
//!
//! ## Example
//!
//! ```rust
//! use crudrules::coerce::Type;
//! use crudrules::resource::TypeDescriptor;
//! use crudrules::rules::{Rule, RuleSet};
//!
//! let rules = RuleSet::new(
//!     TypeDescriptor::map("Pet"),
//!     [
//!         Rule::new("name").required(),
//!         Rule::new("age").with_type(Type::Int),
//!         Rule::new("internal_id").with_alias("id").output_only(),
//!         Rule::new("nickname").with_versions(["2"]),
//!     ],
//! );
//! assert!(rules.validate().is_ok());
//! assert_eq!(rules.inbound("1").len(), 2);
//! ```
//!
//! ## Startup Validation
//!
//! [`RuleSet::validate`] checks that every rule names a field that exists on the
//! resource type and that its declared type matches the field's type. It stops
//! at the first violation. A RuleSet that fails validation must never serve
//! traffic; [`ApiBuilder::build`](crate::api::ApiBuilder::build) refuses to
//! produce an API from one.
//!
//! ## Declarative Rule Files
//!
//! [`RuleSetSpec`] reads map-shaped RuleSets from YAML or JSON files.

mod declarative;
mod rule;
mod ruleset;
mod validate;

pub use declarative::{load_rule_set, RuleSetSpec, RuleSpec};
pub use rule::{Direction, Rule, Transform};
pub use ruleset::RuleSet;
pub use validate::validate;
