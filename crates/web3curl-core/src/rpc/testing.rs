//! Scripted transport for unit tests.

use alloy_primitives::{Address, Bytes};
use std::collections::HashSet;
use std::sync::Mutex;

use super::{RpcError, RpcTransport};

/// Replies by (contract, calldata prefix); unmatched calls revert.
/// Endpoints marked down fail with HTTP 503.
#[derive(Default)]
pub(crate) struct MockTransport {
    down: HashSet<String>,
    replies: Vec<(Option<Address>, Vec<u8>, Bytes)>,
    calls: Mutex<Vec<(String, Address, Bytes)>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_down(mut self, endpoints: &[String]) -> Self {
        self.down.extend(endpoints.iter().cloned());
        self
    }

    /// Reply `data` to any call on `to` whose calldata starts with `prefix`.
    pub(crate) fn reply(mut self, to: Address, prefix: &[u8], data: impl Into<Bytes>) -> Self {
        self.replies.push((Some(to), prefix.to_vec(), data.into()));
        self
    }

    /// Reply `data` to any call on any contract whose calldata starts with `prefix`.
    pub(crate) fn reply_any(mut self, prefix: &[u8], data: impl Into<Bytes>) -> Self {
        self.replies.push((None, prefix.to_vec(), data.into()));
        self
    }

    pub(crate) fn calls_to_endpoints(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(e, _, _)| e.clone())
            .collect()
    }

    pub(crate) fn calldata_sent(&self) -> Vec<(Address, Bytes)> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, to, data)| (*to, data.clone()))
            .collect()
    }
}

impl RpcTransport for MockTransport {
    fn eth_call(&self, endpoint: &str, to: Address, data: &Bytes) -> Result<Bytes, RpcError> {
        self.calls
            .lock()
            .unwrap()
            .push((endpoint.to_string(), to, data.clone()));
        if self.down.contains(endpoint) {
            return Err(RpcError::Http(503));
        }
        self.replies
            .iter()
            .find(|(addr, prefix, _)| {
                addr.map_or(true, |a| a == to) && data.starts_with(prefix)
            })
            .map(|(_, _, reply)| reply.clone())
            .ok_or(RpcError::JsonRpc {
                code: 3,
                message: "execution reverted".to_string(),
            })
    }
}
