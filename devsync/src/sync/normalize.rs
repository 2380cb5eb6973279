//! Canonical active state of a raw reading

use beacon_models::RawValue;

/// Map a raw reading to the canonical active state.
///
/// Booleans pass through and only the exact string `"ON"` is active. Any other
/// type keeps the previous state.
pub fn normalize(raw: &RawValue, previous: bool) -> bool {
    match raw {
        RawValue::Bool(b) => *b,
        RawValue::Text(s) => s == "ON",
        RawValue::Number(_) | RawValue::Unknown => previous,
    }
}
