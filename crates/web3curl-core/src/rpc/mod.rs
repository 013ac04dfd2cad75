//! JSON-RPC `eth_call` transport and endpoint fallback.
//!
//! [`RpcTransport`] performs one call against one endpoint; [`call_with_fallback`]
//! walks a network's endpoint list in order and records every attempt so the
//! diagnostic trace can show which endpoints were skipped.

mod error;
mod fallback;
mod http;

pub use error::RpcError;
pub(crate) use fallback::describe_failures;
pub use fallback::{call_with_fallback, CallReport, EndpointsExhausted};
pub use http::CurlTransport;

use alloy_primitives::{Address, Bytes};
use std::sync::Arc;

/// Performs a read-only contract call against a single endpoint.
pub trait RpcTransport: Send + Sync {
    fn eth_call(&self, endpoint: &str, to: Address, data: &Bytes) -> Result<Bytes, RpcError>;
}

impl<T: RpcTransport + ?Sized> RpcTransport for Arc<T> {
    fn eth_call(&self, endpoint: &str, to: Address, data: &Bytes) -> Result<Bytes, RpcError> {
        (**self).eth_call(endpoint, to, data)
    }
}

/// Outcome of one endpoint attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    Error {
        message: String,
        /// The node answered with a JSON-RPC error (e.g. execution reverted)
        /// rather than failing at the transport level.
        node_replied: bool,
    },
}

/// One endpoint tried during a call, in fallback order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointAttempt {
    pub url: String,
    /// Zero-based position in the network's endpoint list.
    pub position: usize,
    pub outcome: AttemptOutcome,
}

impl EndpointAttempt {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, AttemptOutcome::Success)
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.outcome {
            AttemptOutcome::Success => None,
            AttemptOutcome::Error { message, .. } => Some(message),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing;
