//! Loose value coercion
//!
//! Form documents arrive from browser editors that were written against
//! JavaScript's truthiness and `String()` rules, so the normalizer reproduces
//! those rules exactly instead of rejecting anything that is not already a
//! string.

use serde_json::{Number, Value};

/// Largest integer a JavaScript number holds without losing precision.
const MAX_SAFE_INTEGER: u64 = 9_007_199_254_740_991;

/// JavaScript truthiness of a JSON value.
///
/// Falsy: `null`, `false`, `0`, `-0` and `""`. Objects and arrays are truthy
/// even when empty.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// JavaScript `String(value)`.
pub fn js_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_string(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                // Array.prototype.join renders null holes as empty strings
                Value::Null => String::new(),
                other => js_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// `String(field)` when the field is truthy, otherwise `fallback`.
///
/// Missing keys and non-object containers count as falsy.
pub fn string_or(container: &Value, key: &str, fallback: &str) -> String {
    match container.get(key) {
        Some(value) if is_truthy(value) => js_string(value),
        _ => fallback.to_string(),
    }
}

/// `!!field` for a possibly missing key.
pub fn flag(container: &Value, key: &str) -> bool {
    container.get(key).is_some_and(is_truthy)
}

fn number_string(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        if i.unsigned_abs() <= MAX_SAFE_INTEGER {
            return i.to_string();
        }
    } else if let Some(u) = n.as_u64() {
        if u <= MAX_SAFE_INTEGER {
            return u.to_string();
        }
    }
    n.as_f64().map(js_number_string).unwrap_or_else(|| n.to_string())
}

/// Formats an `f64` the way `Number.prototype.toString()` does.
pub fn js_number_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }

    let magnitude = n.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        // Rust prints `1e21` / `1.5e-7`; JavaScript signs positive exponents
        let formatted = format!("{:e}", n);
        return match formatted.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => formatted,
        };
    }

    // Display prints the shortest round-trip digits, zero-padded past the
    // last significant one (2^64 → "18446744073709552000")
    format!("{}", n)
}
