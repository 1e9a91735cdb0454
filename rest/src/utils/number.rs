//! Numeric query-value validators

use std::sync::OnceLock;

use regex::Regex;

/// True for a base-10 value representable as a signed 64-bit integer and
/// greater than zero (or equal to zero when `allow_zero`).
pub fn is_positive_long(value: &str, allow_zero: bool) -> bool {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    match value.parse::<i64>() {
        Ok(v) => v > 0 || (allow_zero && v == 0),
        Err(_) => false,
    }
}

/// True for a non-negative 32-bit integer.
pub fn is_non_negative_int32(value: &str) -> bool {
    !value.is_empty()
        && value.bytes().all(|b| b.is_ascii_digit())
        && value.parse::<i32>().is_ok()
}

/// True for a plain decimal number: digits with an optional fraction.
pub fn is_numeric(value: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^\d+(\.\d+)?$").expect("Invalid regex"));
    re.is_match(value)
}
