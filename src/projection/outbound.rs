use crate::resource::{Resource, StructValue, TypeDescriptor};
use crate::rules::{Rule, RuleSet};
use crate::value::{Payload, Value};
use tracing::trace;

/// Projects a handler's resource into its wire shape for `version`.
///
/// - empty-equivalent resources and an empty filtered RuleSet are identities
/// - a map is read by `rule.field` and emitted under `rule.alias`; missing keys
///   are skipped
/// - a struct of the RuleSet's owning type is read through its descriptor
/// - a list is projected element by element
/// - anything else is returned unchanged
#[must_use]
pub fn project_outbound(resource: Resource, rules: &RuleSet, version: &str) -> Resource {
    if resource.is_empty_equivalent() {
        return resource;
    }
    let applicable = rules.outbound(version);
    if applicable.is_empty() {
        return resource;
    }
    project(resource, rules.resource(), &applicable, version)
}

fn project(
    resource: Resource,
    descriptor: &TypeDescriptor,
    rules: &[&Rule],
    version: &str,
) -> Resource {
    match resource {
        Resource::Map(map) => Resource::Map(project_map(&map, rules, version)),
        Resource::Struct(value) if descriptor.describes_struct(&value) => {
            Resource::Map(project_struct(&value, descriptor, rules, version))
        }
        Resource::List(items) => Resource::List(
            items
                .into_iter()
                .map(|item| project(item, descriptor, rules, version))
                .collect(),
        ),
        other => other,
    }
}

fn project_map(map: &Payload, rules: &[&Rule], version: &str) -> Payload {
    let mut out = Payload::new();
    for rule in rules {
        let Some(value) = map.get(rule.field()) else {
            trace!(field = %rule.field(), "Skipping field absent from map resource");
            continue;
        };
        let value = match rule.nested() {
            Some(nested) => project_nested_value(value.clone(), nested, version),
            None => value.clone(),
        };
        out.insert(rule.alias().to_string(), rule.apply_output(value));
    }
    out
}

fn project_struct(
    value: &StructValue,
    descriptor: &TypeDescriptor,
    rules: &[&Rule],
    version: &str,
) -> Payload {
    let mut out = Payload::new();
    for rule in rules {
        // Field existence was checked at startup; the guards only cover RuleSets
        // that skipped validation.
        let Some(field) = descriptor.field(rule.field()) else {
            continue;
        };
        let Some(field_value) = field.read(value) else {
            continue;
        };
        let field_value = match rule.nested() {
            Some(nested) => project_outbound(field_value, nested, version),
            None => field_value,
        };
        out.insert(
            rule.alias().to_string(),
            rule.apply_output(field_value.into_value()),
        );
    }
    out
}

fn project_nested_value(value: Value, nested: &RuleSet, version: &str) -> Value {
    match value {
        Value::Object(map) => project_outbound(Resource::Map(map), nested, version).into_value(),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| project_nested_value(item, nested, version))
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload;

    #[test]
    fn test_empty_map_is_identity() {
        let rules = RuleSet::new(TypeDescriptor::map("M"), [Rule::new("a")]);
        let out = project_outbound(Resource::Map(Payload::new()), &rules, "1");
        assert_eq!(out.into_value(), Value::Object(Payload::new()));
    }

    #[test]
    fn test_input_only_rule_is_not_emitted() {
        let rules = RuleSet::new(
            TypeDescriptor::map("M"),
            [Rule::new("password").input_only(), Rule::new("user")],
        );
        let out = project_outbound(
            Resource::Map(payload! { "password" => "hunter2", "user" => "bob" }),
            &rules,
            "1",
        );
        assert_eq!(out.into_value(), Value::Object(payload! { "user" => "bob" }));
    }

    #[test]
    fn test_opaque_value_is_untouched() {
        let rules = RuleSet::new(TypeDescriptor::map("M"), [Rule::new("a").with_alias("b")]);
        let shaped = Value::Object(payload! { "a" => 1.0 });
        let out = project_outbound(Resource::Value(shaped.clone()), &rules, "1");
        assert_eq!(out.into_value(), shaped);
    }

    #[test]
    fn test_output_transform_applies() {
        let rules = RuleSet::new(
            TypeDescriptor::map("M"),
            [Rule::new("name").with_output_transform(|v| match v {
                Value::String(s) => Value::String(s.to_uppercase()),
                other => other,
            })],
        );
        let out = project_outbound(Resource::Map(payload! { "name" => "rex" }), &rules, "1");
        assert_eq!(out.into_value(), Value::Object(payload! { "name" => "REX" }));
    }
}
