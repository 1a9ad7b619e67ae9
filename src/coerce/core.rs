//! Coercion core - runs once per inbound field on every create/update request.

use super::duration::parse_duration;
use crate::error::CoercionError;
use crate::value::{Value, TIME_LAYOUT};
use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target type of a rule.
///
/// Names are lowercase on the wire (`"int8"`, `"duration"`, ...), which is also
/// how declarative rule files spell them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Type {
    /// No coercion; the value passes through as decoded.
    #[default]
    #[serde(alias = "any")]
    Unspecified,
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    String,
    Duration,
    Time,
    Array,
    Object,
}

impl Type {
    /// Canonical name, as used in error messages.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Type::Unspecified => "unspecified",
            Type::Bool => "bool",
            Type::Int => "int",
            Type::Int8 => "int8",
            Type::Int16 => "int16",
            Type::Int32 => "int32",
            Type::Int64 => "int64",
            Type::Uint => "uint",
            Type::Uint8 => "uint8",
            Type::Uint16 => "uint16",
            Type::Uint32 => "uint32",
            Type::Uint64 => "uint64",
            Type::Float32 => "float32",
            Type::Float64 => "float64",
            Type::String => "string",
            Type::Duration => "duration",
            Type::Time => "time",
            Type::Array => "array",
            Type::Object => "object",
        }
    }

    /// True when `value` already has this type.
    #[must_use]
    pub fn holds(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Type::Bool, Value::Bool(_))
                | (Type::Int, Value::Int(_))
                | (Type::Int8, Value::Int8(_))
                | (Type::Int16, Value::Int16(_))
                | (Type::Int32, Value::Int32(_))
                | (Type::Int64, Value::Int64(_))
                | (Type::Uint, Value::Uint(_))
                | (Type::Uint8, Value::Uint8(_))
                | (Type::Uint16, Value::Uint16(_))
                | (Type::Uint32, Value::Uint32(_))
                | (Type::Uint64, Value::Uint64(_))
                | (Type::Float32, Value::Float32(_))
                | (Type::Float64, Value::Float64(_))
                | (Type::String, Value::String(_))
                | (Type::Duration, Value::Duration(_))
                | (Type::Time, Value::Time(_))
                | (Type::Array, Value::Array(_))
                | (Type::Object, Value::Object(_))
        )
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Type {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(serde_json::Value::String(s.to_ascii_lowercase()))
            .map_err(|_| format!("unknown type '{s}'"))
    }
}

/// Converts `value` to `target`.
///
/// # Errors
///
/// Returns [`CoercionError`] when the pair is outside the coercion matrix, when
/// a number does not fit the target width, or when a string fails to parse.
pub fn coerce(value: Value, target: Type) -> Result<Value, CoercionError> {
    if target == Type::Unspecified || value.is_null() || target.holds(&value) {
        return Ok(value);
    }

    match value {
        Value::Bool(b) => from_bool(b, target),
        Value::Float64(n) => from_number(n, target),
        Value::String(s) => from_string(&s, target),
        other => Err(unsupported(&other, target)),
    }
}

fn unsupported(value: &Value, target: Type) -> CoercionError {
    CoercionError::Unsupported {
        from: value.type_name(),
        to: target,
    }
}

fn from_bool(b: bool, target: Type) -> Result<Value, CoercionError> {
    match target {
        Type::String => Ok(Value::String(b.to_string())),
        _ => Err(unsupported(&Value::Bool(b), target)),
    }
}

macro_rules! truncate {
    ($n:expr, $target:expr, $ty:ty) => {{
        let n: f64 = $n;
        let t = n.trunc();
        // Upper bound is 2^(bits) exclusive; MAX as f64 is inexact for 64-bit types.
        let bits = <$ty>::BITS as i32 - i32::from(<$ty>::MIN != 0);
        if n.is_finite() && t >= <$ty>::MIN as f64 && t < 2f64.powi(bits) {
            Ok(t as $ty)
        } else {
            Err(CoercionError::OutOfRange {
                from: "float64",
                to: $target,
                value: n,
            })
        }
    }};
}

fn from_number(n: f64, target: Type) -> Result<Value, CoercionError> {
    let value = match target {
        Type::Int => Value::Int(truncate!(n, target, i64)?),
        Type::Int8 => Value::Int8(truncate!(n, target, i8)?),
        Type::Int16 => Value::Int16(truncate!(n, target, i16)?),
        Type::Int32 => Value::Int32(truncate!(n, target, i32)?),
        Type::Int64 => Value::Int64(truncate!(n, target, i64)?),
        Type::Uint => Value::Uint(truncate!(n, target, u64)?),
        Type::Uint8 => Value::Uint8(truncate!(n, target, u8)?),
        Type::Uint16 => Value::Uint16(truncate!(n, target, u16)?),
        Type::Uint32 => Value::Uint32(truncate!(n, target, u32)?),
        Type::Uint64 => Value::Uint64(truncate!(n, target, u64)?),
        Type::Float32 => Value::Float32(n as f32),
        Type::String => Value::String(n.to_string()),
        Type::Duration => Value::Duration(TimeDelta::nanoseconds(truncate!(n, target, i64)?)),
        _ => return Err(unsupported(&Value::Float64(n), target)),
    };
    Ok(value)
}

fn parse<T>(s: &str) -> Result<T, CoercionError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    s.parse::<T>()
        .map_err(|e| CoercionError::Parse(e.to_string()))
}

fn from_string(s: &str, target: Type) -> Result<Value, CoercionError> {
    let value = match target {
        Type::Int => Value::Int(parse(s)?),
        Type::Int8 => Value::Int8(parse(s)?),
        Type::Int16 => Value::Int16(parse(s)?),
        Type::Int32 => Value::Int32(parse(s)?),
        Type::Int64 => Value::Int64(parse(s)?),
        Type::Uint => Value::Uint(parse(s)?),
        Type::Uint8 => Value::Uint8(parse(s)?),
        Type::Uint16 => Value::Uint16(parse(s)?),
        Type::Uint32 => Value::Uint32(parse(s)?),
        Type::Uint64 => Value::Uint64(parse(s)?),
        Type::Float32 => Value::Float32(parse(s)?),
        Type::Float64 => Value::Float64(parse(s)?),
        Type::Bool => Value::Bool(parse(s)?),
        Type::Duration => Value::Duration(
            parse_duration(s).map_err(|e| CoercionError::Parse(e.to_string()))?,
        ),
        Type::Time => Value::Time(
            NaiveDateTime::parse_from_str(s, TIME_LAYOUT)
                .map_err(|e| CoercionError::Parse(e.to_string()))?
                .and_utc(),
        ),
        _ => return Err(unsupported(&Value::String(s.to_string()), target)),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_unspecified_is_identity() {
        let v = Value::from(serde_json::json!({"a": [1, "b"]}));
        assert_eq!(coerce(v.clone(), Type::Unspecified).unwrap(), v);
    }

    #[test]
    fn test_null_passes_through_any_target() {
        for t in [Type::Int8, Type::Time, Type::Object, Type::Bool] {
            assert_eq!(coerce(Value::Null, t).unwrap(), Value::Null);
        }
    }

    #[test]
    fn test_number_truncates_toward_zero() {
        assert_eq!(coerce(Value::Float64(-3.9), Type::Int16).unwrap(), Value::Int16(-3));
        assert_eq!(coerce(Value::Float64(7.2), Type::Uint).unwrap(), Value::Uint(7));
    }

    #[test]
    fn test_number_out_of_range() {
        let err = coerce(Value::Float64(300.0), Type::Int8).unwrap_err();
        assert!(matches!(err, CoercionError::OutOfRange { to: Type::Int8, .. }));
        assert!(coerce(Value::Float64(-1.0), Type::Uint8).is_err());
        assert_eq!(coerce(Value::Float64(255.9), Type::Uint8), Ok(Value::Uint8(255)));
        assert_eq!(coerce(Value::Float64(-128.0), Type::Int8), Ok(Value::Int8(-128)));
    }

    #[test]
    fn test_64_bit_bounds_are_exclusive() {
        let two_63 = 9_223_372_036_854_775_808.0;
        let two_64 = 18_446_744_073_709_551_616.0;
        for (n, target) in [
            (two_63, Type::Int64),
            (two_63, Type::Int),
            (two_63, Type::Duration),
            (two_64, Type::Uint64),
            (two_64, Type::Uint),
        ] {
            assert!(
                matches!(coerce(Value::Float64(n), target), Err(CoercionError::OutOfRange { .. })),
                "{n} -> {target}"
            );
        }
        assert_eq!(
            coerce(Value::Float64(-two_63), Type::Int64),
            Ok(Value::Int64(i64::MIN))
        );
        assert_eq!(
            coerce(Value::Float64(9_223_372_036_854_774_784.0), Type::Int64),
            Ok(Value::Int64(9_223_372_036_854_774_784))
        );
    }

    #[test]
    fn test_string_to_time() {
        let v = coerce(Value::from("2024-02-29T23:59:01Z"), Type::Time).unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 1).unwrap();
        assert_eq!(v, Value::Time(expected));
        assert!(coerce(Value::from("2024-02-29 23:59:01"), Type::Time).is_err());
    }

    #[test]
    fn test_type_from_str() {
        assert_eq!("UINT16".parse::<Type>().unwrap(), Type::Uint16);
        assert_eq!("any".parse::<Type>().unwrap(), Type::Unspecified);
        assert!("decimal".parse::<Type>().is_err());
    }
}
