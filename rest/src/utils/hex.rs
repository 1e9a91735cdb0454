//! Hex string helpers

/// Strip a leading `0x` if present.
pub fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x").unwrap_or(s)
}

/// Decode a hex string, tolerating a `0x` prefix and odd length.
///
/// An odd digit count is left-padded with one zero nibble, so `"3"` decodes
/// to `[0x03]`.
pub fn parse_hex(s: &str) -> Option<Vec<u8>> {
    let s = strip_hex_prefix(s);
    if s.is_empty() {
        return Some(Vec::new());
    }
    if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    if s.len() % 2 == 1 {
        hex::decode(format!("0{s}")).ok()
    } else {
        hex::decode(s).ok()
    }
}

/// True for a storage-slot value: 1 to 64 hex digits, optional `0x` prefix.
pub fn is_valid_slot(s: &str) -> bool {
    let s = strip_hex_prefix(s);
    !s.is_empty() && s.len() <= 64 && s.bytes().all(|b| b.is_ascii_hexdigit())
}
