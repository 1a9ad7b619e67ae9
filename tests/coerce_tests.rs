use chrono::{TimeDelta, TimeZone, Utc};
use crudrules::coerce::{coerce, parse_duration, Type};
use crudrules::{CoercionError, Value};

const NUMERIC: [Type; 12] = [
    Type::Int,
    Type::Int8,
    Type::Int16,
    Type::Int32,
    Type::Int64,
    Type::Uint,
    Type::Uint8,
    Type::Uint16,
    Type::Uint32,
    Type::Uint64,
    Type::Float32,
    Type::Float64,
];

#[test]
fn test_bool_targets() {
    assert_eq!(coerce(Value::Bool(true), Type::Bool).unwrap(), Value::Bool(true));
    assert_eq!(
        coerce(Value::Bool(false), Type::String).unwrap(),
        Value::from("false")
    );
    let err = coerce(Value::Bool(true), Type::Float32).unwrap_err();
    assert_eq!(err.to_string(), "Unable to coerce bool to float32");
    assert!(coerce(Value::Bool(true), Type::Int).is_err());
    assert!(coerce(Value::Bool(true), Type::Time).is_err());
}

#[test]
fn test_number_reaches_every_numeric_width() {
    for target in NUMERIC {
        let out = coerce(Value::Float64(42.0), target).unwrap();
        assert!(target.holds(&out), "{target} did not hold {out:?}");
        assert_eq!(out.as_f64(), Some(42.0));
    }
}

#[test]
fn test_number_to_string_and_duration() {
    assert_eq!(coerce(Value::Float64(42.0), Type::String).unwrap(), Value::from("42"));
    assert_eq!(coerce(Value::Float64(1.5), Type::String).unwrap(), Value::from("1.5"));
    assert_eq!(
        coerce(Value::Float64(1500.0), Type::Duration).unwrap(),
        Value::Duration(TimeDelta::nanoseconds(1500))
    );
}

#[test]
fn test_number_rejects_non_numeric_targets() {
    for target in [Type::Bool, Type::Time, Type::Array, Type::Object] {
        let err = coerce(Value::Float64(1.0), target).unwrap_err();
        assert_eq!(
            err,
            CoercionError::Unsupported {
                from: "float64",
                to: target
            }
        );
    }
}

#[test]
fn test_string_parses_numbers_textually() {
    assert_eq!(coerce(Value::from("-12"), Type::Int8).unwrap(), Value::Int8(-12));
    assert_eq!(coerce(Value::from("65535"), Type::Uint16).unwrap(), Value::Uint16(65535));
    assert_eq!(coerce(Value::from("2.5"), Type::Float64).unwrap(), Value::Float64(2.5));
    assert!(coerce(Value::from("65536"), Type::Uint16).is_err());
    assert!(coerce(Value::from("1.5"), Type::Int).is_err());
}

#[test]
fn test_string_parse_error_text_is_propagated() {
    let expected = "abc".parse::<i32>().unwrap_err().to_string();
    let err = coerce(Value::from("abc"), Type::Int32).unwrap_err();
    assert_eq!(err, CoercionError::Parse(expected.clone()));
    assert_eq!(err.to_string(), expected);
}

#[test]
fn test_string_to_bool_duration_time() {
    assert_eq!(coerce(Value::from("true"), Type::Bool).unwrap(), Value::Bool(true));
    assert!(coerce(Value::from("yes"), Type::Bool).is_err());
    assert_eq!(
        coerce(Value::from("100ns"), Type::Duration).unwrap(),
        Value::Duration(TimeDelta::nanoseconds(100))
    );
    assert_eq!(
        coerce(Value::from("1h30m"), Type::Duration).unwrap(),
        Value::Duration(TimeDelta::minutes(90))
    );
    assert_eq!(
        coerce(Value::from("2006-01-02T15:04:05Z"), Type::Time).unwrap(),
        Value::Time(Utc.with_ymd_and_hms(2006, 1, 2, 15, 4, 5).unwrap())
    );
    assert!(coerce(Value::from("2006-01-02T15:04:05+02:00"), Type::Time).is_err());
}

#[test]
fn test_containers_are_identity_only() {
    let arr = Value::Array(vec![Value::from("1")]);
    assert_eq!(coerce(arr.clone(), Type::Array).unwrap(), arr);
    assert!(coerce(arr, Type::Object).is_err());

    let obj = Value::from(serde_json::json!({"a": 1}));
    assert_eq!(coerce(obj.clone(), Type::Object).unwrap(), obj);
    assert!(coerce(obj, Type::String).is_err());
}

#[test]
fn test_null_and_unspecified_pass_through() {
    for target in NUMERIC {
        assert_eq!(coerce(Value::Null, target).unwrap(), Value::Null);
    }
    let v = Value::from("anything");
    assert_eq!(coerce(v.clone(), Type::Unspecified).unwrap(), v);
}

#[test]
fn test_coercion_is_idempotent() {
    let cases = [
        (Value::from("42"), Type::Int),
        (Value::Float64(3.0), Type::Uint8),
        (Value::Float64(2.0), Type::Float32),
        (Value::Bool(true), Type::String),
        (Value::from("true"), Type::Bool),
        (Value::from("2s"), Type::Duration),
        (Value::Float64(5.0), Type::Duration),
        (Value::from("2020-05-06T07:08:09Z"), Type::Time),
        (Value::Array(vec![]), Type::Array),
    ];
    for (value, target) in cases {
        let once = coerce(value, target).unwrap();
        let twice = coerce(once.clone(), target).unwrap();
        assert_eq!(once, twice, "coercion to {target} is not idempotent");
    }
}

#[test]
fn test_duration_grammar() {
    assert_eq!(parse_duration("0").unwrap(), TimeDelta::zero());
    assert_eq!(parse_duration("-1.5s").unwrap(), TimeDelta::milliseconds(-1500));
    assert_eq!(parse_duration("2h45m").unwrap(), TimeDelta::minutes(165));
    assert_eq!(parse_duration("3µs").unwrap(), TimeDelta::microseconds(3));
    assert!(parse_duration("").is_err());
    assert!(parse_duration("10").is_err());
    assert!(parse_duration("5 days").is_err());
}
