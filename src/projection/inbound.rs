use crate::coerce::coerce;
use crate::error::ProjectionError;
use crate::rules::{Rule, RuleSet};
use crate::value::{Payload, Value};
use tracing::debug;

/// Validates and coerces an inbound payload against `rules` for `version`.
///
/// A RuleSet with no rules at all declares no schema and passes the payload
/// through untouched.
///
/// # Errors
///
/// - [`ProjectionError::Coercion`] for the first value that cannot be coerced
/// - [`ProjectionError::MissingRequiredField`] for the first required alias
///   (in rule order) absent from the result
///
/// No partial payload is ever returned.
pub fn project_inbound(
    payload: Option<Payload>,
    rules: &RuleSet,
    version: &str,
) -> Result<Payload, ProjectionError> {
    let Some(payload) = payload else {
        return Ok(Payload::new());
    };
    if rules.is_empty() {
        return Ok(payload);
    }

    let applicable = rules.inbound(version);
    let mut projected = Payload::new();

    for (key, value) in payload {
        let Some(rule) = applicable.iter().find(|r| r.alias() == key) else {
            debug!(
                resource = %rules.resource().name(),
                field = %key,
                version = %version,
                "Discarding unknown inbound field"
            );
            continue;
        };
        let value = project_field(rule, value, version)?;
        projected.insert(key, value);
    }

    if let Some(missing) = applicable
        .iter()
        .find(|r| r.is_required() && !projected.contains_key(r.alias()))
    {
        debug!(
            resource = %rules.resource().name(),
            field = %missing.alias(),
            version = %version,
            "Missing required inbound field"
        );
        return Err(ProjectionError::MissingRequiredField(
            missing.alias().to_string(),
        ));
    }

    Ok(projected)
}

fn project_field(rule: &Rule, value: Value, version: &str) -> Result<Value, ProjectionError> {
    let value = coerce(value, rule.ty())?;
    let value = match rule.nested() {
        Some(nested) => project_nested(value, nested, version)?,
        None => value,
    };
    Ok(rule.apply_input(value))
}

fn project_nested(value: Value, nested: &RuleSet, version: &str) -> Result<Value, ProjectionError> {
    match value {
        Value::Object(map) => project_inbound(Some(map), nested, version).map(Value::Object),
        Value::Array(items) if items.iter().all(|item| item.as_object().is_some()) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(map) => project_inbound(Some(map), nested, version).map(Value::Object),
                other => Ok(other),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coerce::Type;
    use crate::payload;
    use crate::resource::TypeDescriptor;

    fn rules(list: Vec<Rule>) -> RuleSet {
        RuleSet::new(TypeDescriptor::map("Test"), list)
    }

    #[test]
    fn test_none_payload_is_empty() {
        let rs = rules(vec![Rule::new("a").required()]);
        assert_eq!(project_inbound(None, &rs, "1").unwrap(), Payload::new());
    }

    #[test]
    fn test_empty_ruleset_passes_through() {
        let rs = rules(vec![]);
        let p = payload! { "x" => 1.0 };
        assert_eq!(project_inbound(Some(p.clone()), &rs, "1").unwrap(), p);
    }

    #[test]
    fn test_output_only_rule_is_not_accepted_inbound() {
        let rs = rules(vec![Rule::new("id").output_only(), Rule::new("name")]);
        let out = project_inbound(Some(payload! { "id" => "1", "name" => "n" }), &rs, "1").unwrap();
        assert_eq!(out, payload! { "name" => "n" });
    }

    #[test]
    fn test_transform_runs_after_coercion() {
        let rs = rules(vec![Rule::new("n")
            .with_type(Type::Int)
            .with_input_transform(|v| match v {
                Value::Int(i) => Value::Int(i * 2),
                other => other,
            })]);
        let out = project_inbound(Some(payload! { "n" => "21" }), &rs, "1").unwrap();
        assert_eq!(out.get("n"), Some(&Value::Int(42)));
    }

    #[test]
    fn test_mixed_array_passes_through_nested() {
        let nested = rules(vec![Rule::new("a").with_type(Type::Int)]);
        let rs = rules(vec![Rule::new("items").with_nested(nested)]);
        let items = Value::Array(vec![Value::from("raw"), Value::Object(payload! { "a" => "1" })]);
        let out = project_inbound(Some(payload! { "items" => items.clone() }), &rs, "1").unwrap();
        assert_eq!(out.get("items"), Some(&items));
    }
}
