//! Startup validation of RuleSets.

use super::RuleSet;
use crate::coerce::Type;
use crate::error::RuleSetError;
use crate::resource::Shape;

/// Checks every rule of `rules` against the owning resource type.
///
/// - the resource must be a struct or a map
/// - a rule must not have been declared against a different type
/// - struct fields must exist, and a declared type must equal the field's type
/// - nested RuleSets are validated against their own resource type
///
/// Stops at the first violation.
///
/// # Errors
///
/// Returns the first [`RuleSetError`] encountered.
pub fn validate(rules: &RuleSet) -> Result<(), RuleSetError> {
    let resource = rules.resource();

    for rule in rules {
        if let Shape::Opaque { .. } = resource.shape() {
            return Err(RuleSetError::InvalidResourceType {
                type_name: resource.name().to_string(),
            });
        }

        if let Some(owner) = rule.owner() {
            if !owner.same_type(resource) {
                return Err(RuleSetError::ForeignRule {
                    field: rule.field().to_string(),
                    declared_on: owner.name().to_string(),
                    type_name: resource.name().to_string(),
                });
            }
        }

        if let Shape::Record { .. } = resource.shape() {
            let field =
                resource
                    .field(rule.field())
                    .ok_or_else(|| RuleSetError::UnknownField {
                        field: rule.field().to_string(),
                        type_name: resource.name().to_string(),
                    })?;
            if rule.ty() != Type::Unspecified && rule.ty() != field.ty() {
                return Err(RuleSetError::TypeMismatch {
                    field: rule.field().to_string(),
                    type_name: resource.name().to_string(),
                    declared: rule.ty(),
                    actual: field.ty(),
                });
            }
        }

        if let Some(nested) = rule.nested() {
            validate(nested).map_err(|source| RuleSetError::Nested {
                field: rule.field().to_string(),
                source: Box::new(source),
            })?;
        }
    }

    Ok(())
}
