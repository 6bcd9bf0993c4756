//! Reward amounts as they arrive from the store.
//!
//! Amounts are written by several generations of clients, so a `dollars`
//! field can hold a JSON number, a numeric string, garbage, or nothing.
//! [`DollarAmount`] keeps the raw shape and [`DollarAmount::amount`] applies
//! the one coercion rule used everywhere. Numbers keep their full value;
//! only strings are read as integers.

use serde::{Serialize, Serializer};
use serde_json::Value;

/// Raw reward amount.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DollarAmount {
    /// A JSON number.
    Number(f64),
    /// A string, expected to hold a base-10 integer.
    Text(String),
    /// Absent, `null`, or a value of any other JSON type.
    Missing,
}

impl DollarAmount {
    /// Classifies an optional JSON value.
    #[must_use]
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Number(n)) => n.as_f64().map_or(Self::Missing, Self::Number),
            Some(Value::String(s)) => Self::Text(s.clone()),
            _ => Self::Missing,
        }
    }

    /// Converts the amount to dollars.
    ///
    /// Finite numbers are taken as they are, fractions included. Strings
    /// are parsed as a leading base-10 integer, and anything unparsable
    /// counts as zero.
    #[must_use]
    pub fn amount(&self) -> f64 {
        match self {
            Self::Number(n) if n.is_finite() => *n,
            Self::Number(_) | Self::Missing => 0.0,
            Self::Text(s) => {
                #[allow(clippy::cast_precision_loss)]
                let parsed = parse_leading_int(s).map_or(0.0, |v| v as f64);
                parsed
            }
        }
    }
}

/// Largest magnitude below which every whole `f64` is an exact integer.
const EXACT_INTEGER_LIMIT: f64 = 9_007_199_254_740_992.0;

/// Serializes a dollar amount, writing whole values as JSON integers.
///
/// Use with `#[serde(serialize_with = "serialize_amount")]`.
///
/// # Errors
///
/// Propagates the serializer's error.
pub fn serialize_amount<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() < EXACT_INTEGER_LIMIT {
        #[allow(clippy::cast_possible_truncation)]
        let whole = *value as i64;
        return serializer.serialize_i64(whole);
    }
    serializer.serialize_f64(*value)
}

impl From<i64> for DollarAmount {
    fn from(value: i64) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let n = value as f64;
        Self::Number(n)
    }
}

/// Parses the leading base-10 integer of `s`.
///
/// Leading whitespace and one sign character are accepted, parsing stops at
/// the first non-digit, and `None` is returned when no digit was read.
/// Values beyond the `i64` range saturate.
#[must_use]
pub fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, s.get(1..)?),
        Some(b'+') => (false, s.get(1..)?),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    let mut seen = false;
    for b in digits.bytes() {
        if !b.is_ascii_digit() {
            break;
        }
        seen = true;
        let digit = i64::from(b - b'0');
        value = value.saturating_mul(10).saturating_add(digit);
    }

    if !seen {
        return None;
    }
    Some(if negative { value.saturating_neg() } else { value })
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_like_a_lenient_integer_reader() {
        assert_eq!(parse_leading_int("15"), Some(15));
        assert_eq!(parse_leading_int("  7"), Some(7));
        assert_eq!(parse_leading_int("-3"), Some(-3));
        assert_eq!(parse_leading_int("+4"), Some(4));
        assert_eq!(parse_leading_int("12abc"), Some(12));
        assert_eq!(parse_leading_int("3.9"), Some(3));
        assert_eq!(parse_leading_int("0x1A"), Some(0));
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("-"), None);
    }

    #[test]
    fn saturates_on_overflow() {
        assert_eq!(parse_leading_int("99999999999999999999999"), Some(i64::MAX));
    }

    #[test]
    fn classifies_json_values() {
        assert_eq!(DollarAmount::from_value(Some(&json!(5))), DollarAmount::Number(5.0));
        assert_eq!(
            DollarAmount::from_value(Some(&json!("3"))),
            DollarAmount::Text("3".to_string())
        );
        assert_eq!(DollarAmount::from_value(Some(&json!(true))), DollarAmount::Missing);
        assert_eq!(DollarAmount::from_value(None), DollarAmount::Missing);
    }

    #[test]
    fn coerces_every_shape() {
        assert!((DollarAmount::Number(2.5).amount() - 2.5).abs() < f64::EPSILON);
        assert!((DollarAmount::Number(-0.5).amount() + 0.5).abs() < f64::EPSILON);
        assert!(DollarAmount::Number(f64::NAN).amount().abs() < f64::EPSILON);
        assert!((DollarAmount::Text("3.9".to_string()).amount() - 3.0).abs() < f64::EPSILON);
        assert!(DollarAmount::Text("ten".to_string()).amount().abs() < f64::EPSILON);
        assert!(DollarAmount::Missing.amount().abs() < f64::EPSILON);
        assert!((DollarAmount::from(25).amount() - 25.0).abs() < f64::EPSILON);
    }

    #[derive(Serialize)]
    struct Wrapped(#[serde(serialize_with = "serialize_amount")] f64);

    #[test]
    fn whole_amounts_serialize_as_integers() {
        assert_eq!(serde_json::to_value(Wrapped(29.0)).ok(), Some(json!(29)));
        assert_eq!(serde_json::to_value(Wrapped(-4.0)).ok(), Some(json!(-4)));
        assert_eq!(serde_json::to_value(Wrapped(0.5)).ok(), Some(json!(0.5)));
    }
}
