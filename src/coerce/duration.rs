//! Duration literal grammar.
//!
//! A duration is an optionally signed sequence of decimal numbers, each with an
//! optional fraction and a mandatory unit: `"300ms"`, `"-1.5h"`, `"2h45m"`.
//! Valid units are `ns`, `us` (or `µs`), `ms`, `s`, `m`, `h`. The bare literal
//! `"0"` is also accepted.

use chrono::TimeDelta;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("invalid duration \"{0}\"")]
    Invalid(String),
    #[error("missing unit in duration \"{0}\"")]
    MissingUnit(String),
    #[error("unknown unit \"{unit}\" in duration \"{input}\"")]
    UnknownUnit { unit: String, input: String },
    #[error("duration \"{0}\" overflows")]
    Overflow(String),
}

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SECOND: u128 = 1_000_000_000;

// Enough fractional digits for nanosecond precision at every unit.
const MAX_FRACTION_DIGITS: usize = 20;

fn unit_scale(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(NANOS_PER_MICRO),
        "ms" => Some(NANOS_PER_MILLI),
        "s" => Some(NANOS_PER_SECOND),
        "m" => Some(60 * NANOS_PER_SECOND),
        "h" => Some(3_600 * NANOS_PER_SECOND),
        _ => None,
    }
}

fn leading_digits(s: &str) -> usize {
    s.bytes().take_while(u8::is_ascii_digit).count()
}

/// Parses a duration literal such as `"1h30m"` or `"100ns"`.
///
/// # Errors
///
/// Returns [`DurationError`] for malformed input, a missing or unknown unit,
/// or a total that does not fit in `i64` nanoseconds.
pub fn parse_duration(input: &str) -> Result<TimeDelta, DurationError> {
    let invalid = || DurationError::Invalid(input.to_string());
    let overflow = || DurationError::Overflow(input.to_string());

    let (negative, mut s) = match input.as_bytes().first() {
        Some(b'-') => (true, &input[1..]),
        Some(b'+') => (false, &input[1..]),
        _ => (false, input),
    };

    if s == "0" {
        return Ok(TimeDelta::zero());
    }
    if s.is_empty() {
        return Err(invalid());
    }

    let mut total: u128 = 0;
    while !s.is_empty() {
        let int_len = leading_digits(s);
        let (int_part, rest) = s.split_at(int_len);
        s = rest;

        let mut fraction = "";
        if let Some(rest) = s.strip_prefix('.') {
            let frac_len = leading_digits(rest);
            fraction = &rest[..frac_len];
            s = &rest[frac_len..];
        }
        if int_part.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }

        let unit_len = s
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(s.len());
        if unit_len == 0 {
            return Err(DurationError::MissingUnit(input.to_string()));
        }
        let (unit, rest) = s.split_at(unit_len);
        s = rest;
        let scale = unit_scale(unit).ok_or_else(|| DurationError::UnknownUnit {
            unit: unit.to_string(),
            input: input.to_string(),
        })?;

        let whole: u128 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| overflow())?
        };
        let mut nanos = whole.checked_mul(scale).ok_or_else(overflow)?;

        if !fraction.is_empty() {
            let digits = &fraction[..fraction.len().min(MAX_FRACTION_DIGITS)];
            let numerator: u128 = digits.parse().map_err(|_| invalid())?;
            let denominator = 10u128.pow(digits.len() as u32);
            nanos = nanos
                .checked_add(numerator * scale / denominator)
                .ok_or_else(overflow)?;
        }

        total = total.checked_add(nanos).ok_or_else(overflow)?;
    }

    let magnitude = i128::try_from(total).map_err(|_| overflow())?;
    let signed = if negative { -magnitude } else { magnitude };
    let nanos = i64::try_from(signed).map_err(|_| overflow())?;
    Ok(TimeDelta::nanoseconds(nanos))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ns(input: &str) -> i64 {
        parse_duration(input)
            .unwrap()
            .num_nanoseconds()
            .unwrap()
    }

    #[test]
    fn test_single_units() {
        assert_eq!(ns("100ns"), 100);
        assert_eq!(ns("3us"), 3_000);
        assert_eq!(ns("3µs"), 3_000);
        assert_eq!(ns("15ms"), 15_000_000);
        assert_eq!(ns("2s"), 2_000_000_000);
        assert_eq!(ns("1m"), 60_000_000_000);
        assert_eq!(ns("1h"), 3_600_000_000_000);
    }

    #[test]
    fn test_compound_and_fractions() {
        assert_eq!(ns("1h30m"), 5_400_000_000_000);
        assert_eq!(ns("1.5s"), 1_500_000_000);
        assert_eq!(ns(".5s"), 500_000_000);
        assert_eq!(ns("-2m3.5s"), -123_500_000_000);
        assert_eq!(ns("+0"), 0);
        assert_eq!(ns("0"), 0);
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            parse_duration(""),
            Err(DurationError::Invalid(String::new()))
        );
        assert_eq!(
            parse_duration("12"),
            Err(DurationError::MissingUnit("12".into()))
        );
        assert!(matches!(
            parse_duration("3d"),
            Err(DurationError::UnknownUnit { .. })
        ));
        assert!(matches!(parse_duration("."), Err(DurationError::Invalid(_))));
        assert!(matches!(
            parse_duration("9999999999h"),
            Err(DurationError::Overflow(_))
        ));
        for huge in [
            "-170141183460469231731687303715884105728ns",
            "340282366920938463463374607431768211455ns",
            "9223372036854775808ns",
        ] {
            assert!(
                matches!(parse_duration(huge), Err(DurationError::Overflow(_))),
                "{huge}"
            );
        }
        assert!(parse_duration("-9223372036854775808ns").is_ok());
    }
}
