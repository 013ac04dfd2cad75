//! ENS name resolution.

use alloy_primitives::{keccak256, Address, B256};
use alloy_sol_types::SolCall;

use super::{abi, exhausted, reverted, Inner};
use crate::pipeline::{NameResolution, NestedCall, PipelineError};

const SERVICE: &str = "ENS";
const CONTENT_POINTER_KEY: &str = "contentcontract";

/// ENS namehash of `name` (labels are lowercased, no further normalization).
pub fn namehash(name: &str) -> B256 {
    let mut node = B256::ZERO;
    for label in name.rsplit('.').filter(|l| !l.is_empty()) {
        let label_hash = keccak256(label.to_ascii_lowercase().as_bytes());
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(node.as_slice());
        buf[32..].copy_from_slice(label_hash.as_slice());
        node = keccak256(buf);
    }
    node
}

fn failure(message: String, calls: Vec<NestedCall>) -> PipelineError {
    PipelineError::NameResolution { message, calls }
}

fn decode_address(call: &NestedCall) -> Option<Address> {
    let data = call.result.as_ref()?;
    abi::resolverCall::abi_decode_returns(data, true)
        .ok()
        .map(|r| r._0)
}

impl Inner {
    /// Resolves `name` on `chain_id`. Returns the resolution and the chain
    /// the resolved address lives on, which a content pointer may change.
    ///
    /// With `follow_content_pointer`, the `contentcontract` text record is
    /// preferred over `addr`.
    pub(super) fn resolve_name(
        &self,
        name: &str,
        chain_id: u64,
        follow_content_pointer: bool,
    ) -> Result<(NameResolution, u64), PipelineError> {
        let lower = name.to_ascii_lowercase();
        if !lower.ends_with(".eth") {
            return Err(failure(
                format!("unsupported name service for '{}'", name),
                Vec::new(),
            ));
        }
        let network = self
            .registry
            .get(chain_id)
            .ok_or(PipelineError::UnknownChain(chain_id))?;
        let registry_address = network.ens_registry().ok_or_else(|| {
            failure(
                format!("no ENS registry configured for chain {}", chain_id),
                Vec::new(),
            )
        })?;
        let registry_address = registry_address.parse::<Address>().map_err(|e| {
            failure(
                format!("invalid ENS registry address '{}': {}", registry_address, e),
                Vec::new(),
            )
        })?;

        let node = namehash(&lower);
        let mut calls = Vec::new();

        let call = self.traced_call(
            format!("resolver({})", name),
            chain_id,
            registry_address,
            abi::resolverCall { node }.abi_encode(),
        )?;
        let resolver = decode_address(&call);
        let call_failed = call.result.is_none();
        let detail = exhausted(&call).to_string();
        calls.push(call);
        let resolver = match resolver {
            Some(addr) if !addr.is_zero() => addr,
            Some(_) => return Err(failure(format!("no resolver set for '{}'", name), calls)),
            None if call_failed => {
                return Err(failure(
                    format!("resolver lookup for '{}' failed: {}", name, detail),
                    calls,
                ))
            }
            None => {
                return Err(failure(
                    format!("malformed resolver reply for '{}'", name),
                    calls,
                ))
            }
        };

        let mut target_chain = chain_id;
        let mut address = None;
        if follow_content_pointer {
            let call = self.traced_call(
                format!("text({}, {})", name, CONTENT_POINTER_KEY),
                chain_id,
                resolver,
                abi::textCall {
                    node,
                    key: CONTENT_POINTER_KEY.to_string(),
                }
                .abi_encode(),
            )?;
            let pointer = call
                .result
                .as_ref()
                .and_then(|data| abi::textCall::abi_decode_returns(data, true).ok())
                .map(|r| r._0);
            let failed = call.result.is_none() && !reverted(&call);
            let detail = exhausted(&call).to_string();
            calls.push(call);
            if failed {
                return Err(failure(
                    format!("content pointer lookup for '{}' failed: {}", name, detail),
                    calls,
                ));
            }
            if let Some(pointer) = pointer.filter(|p| !p.trim().is_empty()) {
                match self.parse_content_pointer(pointer.trim(), chain_id) {
                    Ok((chain, addr)) => {
                        tracing::debug!(name, chain, address = %addr, "following content pointer");
                        target_chain = chain;
                        address = Some(addr);
                    }
                    Err(message) => return Err(failure(message, calls)),
                }
            }
        }

        let address = match address {
            Some(addr) => addr,
            None => {
                let call = self.traced_call(
                    format!("addr({})", name),
                    chain_id,
                    resolver,
                    abi::addrCall { node }.abi_encode(),
                )?;
                let resolved = call
                    .result
                    .as_ref()
                    .and_then(|data| abi::addrCall::abi_decode_returns(data, true).ok())
                    .map(|r| r._0);
                let call_failed = call.result.is_none();
                let detail = exhausted(&call).to_string();
                calls.push(call);
                match resolved {
                    Some(addr) => addr,
                    None if call_failed => {
                        return Err(failure(
                            format!("address lookup for '{}' failed: {}", name, detail),
                            calls,
                        ))
                    }
                    None => {
                        return Err(failure(
                            format!("malformed address reply for '{}'", name),
                            calls,
                        ))
                    }
                }
            }
        };
        if address.is_zero() {
            return Err(failure(
                format!("'{}' resolves to the zero address", name),
                calls,
            ));
        }

        Ok((
            NameResolution {
                name: name.to_string(),
                service: SERVICE.to_string(),
                chain_id,
                address,
                calls,
            },
            target_chain,
        ))
    }

    /// Parses `0x<addr>` or `<shortName|chainId>:0x<addr>`.
    fn parse_content_pointer(&self, pointer: &str, chain_id: u64) -> Result<(u64, Address), String> {
        let (chain, addr) = match pointer.split_once(':') {
            Some((prefix, addr)) => {
                let chain = match prefix.parse::<u64>() {
                    Ok(id) if id > 0 => id,
                    Ok(_) => return Err(format!("invalid chain id in content pointer '{}'", pointer)),
                    Err(_) => self
                        .registry
                        .by_short_name(prefix)
                        .map(|n| n.id)
                        .ok_or_else(|| {
                            format!("unknown chain short name '{}' in content pointer", prefix)
                        })?,
                };
                (chain, addr)
            }
            None => (chain_id, pointer),
        };
        let addr = addr
            .parse::<Address>()
            .map_err(|_| format!("invalid address in content pointer '{}'", pointer))?;
        Ok((chain, addr))
    }
}
