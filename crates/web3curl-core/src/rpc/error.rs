//! Error type for a single JSON-RPC call.

use thiserror::Error;

/// Failure of one `eth_call` against one endpoint.
#[derive(Debug, Error)]
pub enum RpcError {
    /// libcurl reported an error (timeout, connection refused, DNS, ...).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// HTTP response had a non-2xx status and no JSON-RPC error body.
    #[error("HTTP {0}")]
    Http(u32),
    /// The node answered with a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    JsonRpc { code: i64, message: String },
    /// Response body was not a usable JSON-RPC response.
    #[error("malformed RPC response: {0}")]
    Malformed(String),
}

impl RpcError {
    /// True when the node itself rejected the call; retrying elsewhere will
    /// usually yield the same answer (e.g. a revert).
    pub fn is_node_reply(&self) -> bool {
        matches!(self, RpcError::JsonRpc { .. })
    }
}
