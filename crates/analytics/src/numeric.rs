//! Lenient numeric parsing of property values.

use serde_json::Value;

/// Reads a property value as `f64`.
///
/// JSON numbers are taken as-is; strings are trimmed and parsed. Anything
/// else, including non-finite results, is not numeric.
pub fn numeric_value(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}
