//! Numeric and string coercion for loosely-typed upstream fields.
//!
//! WordPress.org sends the same field as a number in one payload and as a
//! numeric string in the next. Every conversion goes through this module so
//! the default-on-failure policy lives in one place: a missing or
//! non-numeric value coerces to `0`. The `try_*` variants expose the failure
//! for callers that need to flag it.

use serde_json::Value;

// ---------------------------------------------------------------------------
// Fallible conversions
// ---------------------------------------------------------------------------

/// Interpret a JSON value as an integer.
///
/// Accepts integers, finite floats (truncated toward zero), and strings
/// holding either form (surrounding whitespace ignored). Everything else,
/// including `null`, booleans, and `NaN`-producing strings, yields `None`.
pub fn try_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|u| i64::try_from(u).unwrap_or(i64::MAX)))
            .or_else(|| n.as_f64().and_then(truncate_f64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(truncate_f64))
        }
        _ => None,
    }
}

/// Interpret a JSON value as a finite float.
pub fn try_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn truncate_f64(f: f64) -> Option<i64> {
    if f.is_finite() {
        // `as` saturates at the i64 bounds.
        Some(f.trunc() as i64)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Defaulting conversions
// ---------------------------------------------------------------------------

/// Coerce an optional JSON value to an integer, defaulting to `0`.
pub fn coerce_i64(value: Option<&Value>) -> i64 {
    value.and_then(try_i64).unwrap_or(0)
}

/// Coerce an optional JSON value to a float, defaulting to `0.0`.
pub fn coerce_f64(value: Option<&Value>) -> f64 {
    value.and_then(try_f64).unwrap_or(0.0)
}

/// Coerce an optional JSON value to a non-empty string.
///
/// Numbers are rendered with their JSON representation so a version sent as
/// `6.4` keeps its digits. Blank strings and non-scalar values yield `None`.
pub fn coerce_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
