//! Parsing of `<chain-id>=<value>` override arguments.

use thiserror::Error;

/// Error parsing an override argument. Raised before any network activity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverrideError {
    /// No `=` separator, or nothing after it.
    #[error("invalid override format {raw:?}: expected <chain-id>=<value>")]
    InvalidOverrideFormat { raw: String },
    /// Left side is not a base-10 integer greater than zero.
    #[error("invalid chain id {chain_id:?} in override {raw:?}: must be a positive integer")]
    InvalidChainId { raw: String, chain_id: String },
}

/// Splits `raw` on its first `=` into a chain id and value.
///
/// Everything after the first `=` is the value, so values containing `=`
/// (e.g. URLs with query strings) are kept intact.
pub fn parse_override(raw: &str) -> Result<(u64, String), OverrideError> {
    let (id, value) = raw
        .split_once('=')
        .ok_or_else(|| OverrideError::InvalidOverrideFormat {
            raw: raw.to_string(),
        })?;

    let chain_id = id
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| OverrideError::InvalidChainId {
            raw: raw.to_string(),
            chain_id: id.to_string(),
        })?;

    let value = value.trim();
    if value.is_empty() {
        return Err(OverrideError::InvalidOverrideFormat {
            raw: raw.to_string(),
        });
    }
    Ok((chain_id, value.to_string()))
}
