//! Nanosecond timestamp codecs
//!
//! API timestamps are `seconds[.nanoseconds]` strings; the database stores a
//! single nanoseconds-since-epoch integer column. Arithmetic stays in `i128`
//! so boundary math near the 64-bit edge cannot overflow.

use std::sync::OnceLock;

use regex::Regex;

const NANOS_PER_SECOND: i128 = 1_000_000_000;

fn timestamp_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{1,10})(?:\.(\d{1,9}))?$").expect("Invalid regex"))
}

/// True for a well-formed `seconds[.nanoseconds]` timestamp parameter.
pub fn is_valid_timestamp(value: &str) -> bool {
    timestamp_pattern().is_match(value)
}

/// Parse a `seconds[.nanoseconds]` parameter into nanoseconds.
///
/// The fraction is right-padded to nine digits, so `.222` means 222
/// milliseconds, not 222 nanoseconds.
pub fn parse_timestamp_ns(value: &str) -> Option<i128> {
    let caps = timestamp_pattern().captures(value)?;
    let seconds: i128 = caps[1].parse().ok()?;
    let nanos: i128 = match caps.get(2) {
        Some(frac) => format!("{:0<9}", frac.as_str()).parse().ok()?,
        None => 0,
    };
    Some(seconds * NANOS_PER_SECOND + nanos)
}

/// Render nanoseconds as `seconds.nnnnnnnnn`.
pub fn ns_to_sec_ns(ns: i128) -> String {
    format!("{}.{:09}", ns / NANOS_PER_SECOND, ns % NANOS_PER_SECOND)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_timestamps() {
        assert!(is_valid_timestamp("1234567890"));
        assert!(is_valid_timestamp("1234567890.000000001"));
        assert!(is_valid_timestamp("2000.222"));
    }

    #[test]
    fn invalid_timestamps() {
        assert!(!is_valid_timestamp(""));
        assert!(!is_valid_timestamp("0.0.1"));
        // eleven-digit seconds
        assert!(!is_valid_timestamp("12345678901"));
        // ten-digit fraction
        assert!(!is_valid_timestamp("1234567890.0000000012"));
    }

    #[test]
    fn parse_seconds_only() {
        assert_eq!(parse_timestamp_ns("1234567890"), Some(1234567890000000000));
        assert_eq!(parse_timestamp_ns("1000"), Some(1000000000000));
    }

    #[test]
    fn parse_seconds_and_nanos() {
        assert_eq!(
            parse_timestamp_ns("1234567890.000000001"),
            Some(1234567890000000001)
        );
        // short fractions are milliseconds-style, padded on the right
        assert_eq!(parse_timestamp_ns("2000.222"), Some(2000222000000));
    }

    #[test]
    fn parse_invalid() {
        assert_eq!(parse_timestamp_ns("0.0.1"), None);
        assert_eq!(parse_timestamp_ns(""), None);
    }

    #[test]
    fn sec_ns_rendering() {
        assert_eq!(ns_to_sec_ns(0), "0.000000000");
        assert_eq!(ns_to_sec_ns(9223372036854775837), "9223372036.854775837");
        assert_eq!(ns_to_sec_ns(1655251199999999999), "1655251199.999999999");
    }
}
