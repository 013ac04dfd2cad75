//! Hex formatting for trace payloads.

/// Hex characters of payload kept below verbosity 3.
pub const LOW_VERBOSITY_MAX_HEX: usize = 128;

/// Bounds a `0x`-prefixed hex string for display.
///
/// Below verbosity 3, strings longer than the budget (plus the `0x` prefix)
/// keep their first half-budget characters after the prefix and the last
/// half-budget characters, joined by `...`. Empty or missing input renders
/// as `0x`.
pub fn format_bytes(hex: Option<&str>, verbosity: u8) -> String {
    let hex = match hex {
        Some(h) if !h.is_empty() => h,
        _ => return "0x".to_string(),
    };
    let half = LOW_VERBOSITY_MAX_HEX.div_ceil(2);
    if verbosity < 3 && hex.is_ascii() && hex.len() > LOW_VERBOSITY_MAX_HEX + 2 {
        format!("{}...{}", &hex[..half + 2], &hex[hex.len() - half..])
    } else {
        hex.to_string()
    }
}

/// `0x`-prefixed lowercase hex of `bytes`.
pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// [`format_bytes`] applied to raw bytes.
pub fn format_payload(bytes: &[u8], verbosity: u8) -> String {
    format_bytes(Some(&to_hex(bytes)), verbosity)
}
