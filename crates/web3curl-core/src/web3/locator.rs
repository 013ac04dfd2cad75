//! `web3://` locator decomposition.

use crate::pipeline::{ParsedLocator, PipelineError};

const SCHEME: &str = "web3";

fn invalid(msg: impl Into<String>) -> PipelineError {
    PipelineError::InvalidLocator(msg.into())
}

/// Splits `web3://[userinfo@]host[:chainId][/path][?query][#fragment]`.
pub(super) fn decompose(locator: &str) -> Result<ParsedLocator, PipelineError> {
    let locator = locator.trim();
    let (scheme, rest) = locator
        .split_once("://")
        .ok_or_else(|| invalid(format!("'{}' has no scheme", locator)))?;
    if !scheme.eq_ignore_ascii_case(SCHEME) {
        return Err(invalid(format!(
            "unsupported scheme '{}', expected {}://",
            scheme, SCHEME
        )));
    }

    let rest = rest.split_once('#').map_or(rest, |(before, _)| before);
    let authority_end = rest.find(&['/', '?'][..]).unwrap_or(rest.len());
    let (authority, tail) = rest.split_at(authority_end);

    let host_port = authority
        .rsplit_once('@')
        .map_or(authority, |(_, host)| host);
    let (host, chain_id) = match host_port.split_once(':') {
        Some((host, chain)) => (host, Some(parse_chain_id(chain)?)),
        None => (host_port, None),
    };
    validate_host(host)?;

    let (path, query) = match tail.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (tail, None),
    };
    let path = if path.is_empty() { "/" } else { path };

    Ok(ParsedLocator {
        host: host.to_string(),
        chain_id,
        path: path.to_string(),
        query: query.filter(|q| !q.is_empty()).map(str::to_string),
    })
}

fn parse_chain_id(raw: &str) -> Result<u64, PipelineError> {
    match raw.parse::<u64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(invalid(format!("invalid chain id '{}'", raw))),
    }
}

fn validate_host(host: &str) -> Result<(), PipelineError> {
    if host.is_empty() {
        return Err(invalid("missing host"));
    }
    if let Some(hex) = host.strip_prefix("0x").or_else(|| host.strip_prefix("0X")) {
        if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid(format!("'{}' is not a 20-byte address", host)));
        }
        return Ok(());
    }
    let valid_chars = host
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if !valid_chars || !host.contains('.') {
        return Err(invalid(format!(
            "host '{}' is neither an address nor a domain name",
            host
        )));
    }
    Ok(())
}
