use crudrules::coerce::Type;
use crudrules::resource::TypeDescriptor;
use crudrules::rules::{Direction, Rule, RuleSet};
use crudrules::RuleSetError;
use serde::Serialize;

#[derive(Serialize)]
struct Account {
    name: String,
    balance: i64,
    owner: Owner,
}

#[derive(Serialize, Clone)]
struct Owner {
    email: String,
}

fn account() -> TypeDescriptor {
    TypeDescriptor::record::<Account>("Account")
        .field("Name", Type::String, |a: &Account| a.name.clone())
        .field("Balance", Type::Int, |a: &Account| a.balance)
        .field("Owner", Type::Object, |a: &Account| {
            crudrules::Resource::record(a.owner.clone())
        })
        .build()
}

fn owner() -> TypeDescriptor {
    TypeDescriptor::record::<Owner>("Owner")
        .field("Email", Type::String, |o: &Owner| o.email.clone())
        .build()
}

#[test]
fn test_valid_struct_rules() {
    let rules = RuleSet::new(
        account(),
        [
            Rule::new("Name").with_alias("name").with_type(Type::String),
            Rule::new("Balance").with_type(Type::Int).required(),
            Rule::new("Owner").with_nested(RuleSet::new(owner(), [Rule::new("Email")])),
        ],
    );
    assert_eq!(rules.validate(), Ok(()));
}

#[test]
fn test_unknown_field() {
    let rules = RuleSet::new(account(), [Rule::new("Name"), Rule::new("Nickname")]);
    assert_eq!(
        rules.validate(),
        Err(RuleSetError::UnknownField {
            field: "Nickname".into(),
            type_name: "Account".into()
        })
    );
}

#[test]
fn test_type_mismatch() {
    let rules = RuleSet::new(account(), [Rule::new("Name").with_type(Type::Int)]);
    let err = rules.validate().unwrap_err();
    assert_eq!(
        err,
        RuleSetError::TypeMismatch {
            field: "Name".into(),
            type_name: "Account".into(),
            declared: Type::Int,
            actual: Type::String
        }
    );
    assert!(err.to_string().contains("declared type int"));
}

#[test]
fn test_first_violation_wins() {
    let rules = RuleSet::new(
        account(),
        [
            Rule::new("Missing"),
            Rule::new("Balance").with_type(Type::String),
        ],
    );
    assert!(matches!(
        rules.validate(),
        Err(RuleSetError::UnknownField { field, .. }) if field == "Missing"
    ));
}

#[test]
fn test_opaque_resource_type() {
    let rules = RuleSet::new(TypeDescriptor::opaque::<String>("String"), [Rule::new("len")]);
    assert_eq!(
        rules.validate(),
        Err(RuleSetError::InvalidResourceType {
            type_name: "String".into()
        })
    );
}

#[test]
fn test_rule_reused_on_other_type() {
    let source = RuleSet::new(owner(), [Rule::new("Email")]);
    let stolen = source.rules()[0].clone();
    let rules = RuleSet::new(account(), [stolen]);
    assert_eq!(
        rules.validate(),
        Err(RuleSetError::ForeignRule {
            field: "Email".into(),
            declared_on: "Owner".into(),
            type_name: "Account".into()
        })
    );
}

#[test]
fn test_nested_violation_is_wrapped() {
    let rules = RuleSet::new(
        account(),
        [Rule::new("Owner").with_nested(RuleSet::new(owner(), [Rule::new("Phone")]))],
    );
    match rules.validate() {
        Err(RuleSetError::Nested { field, source }) => {
            assert_eq!(field, "Owner");
            assert!(matches!(*source, RuleSetError::UnknownField { .. }));
        }
        other => panic!("expected nested error, got {other:?}"),
    }
}

fn names(rules: Vec<&Rule>) -> Vec<String> {
    rules.iter().map(|r| r.field().to_string()).collect()
}

#[test]
fn test_version_and_direction_views() {
    let rules = RuleSet::new(
        TypeDescriptor::map("Doc"),
        [
            Rule::new("a"),
            Rule::new("b").with_versions(["1"]),
            Rule::new("secret").input_only(),
            Rule::new("id").with_direction(Direction::OutputOnly),
        ],
    );
    assert_eq!(names(rules.inbound("1")), ["a", "b", "secret"]);
    assert_eq!(names(rules.inbound("2")), ["a", "secret"]);
    assert_eq!(names(rules.outbound("1")), ["a", "b", "id"]);
    assert_eq!(names(rules.outbound("2")), ["a", "id"]);
}

#[test]
fn test_alias_defaults_to_field() {
    let rule = Rule::new("foo");
    assert_eq!(rule.alias(), "foo");
    assert_eq!(rule.with_alias("f").alias(), "f");
}
