//! libcurl-backed JSON-RPC transport.

use alloy_primitives::{Address, Bytes};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::{RpcError, RpcTransport};

#[derive(Serialize)]
struct CallObject<'a> {
    to: Address,
    data: &'a Bytes,
}

#[derive(Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    params: (CallObject<'a>, &'static str),
}

#[derive(Deserialize)]
struct JsonRpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Bytes>,
    #[serde(default)]
    error: Option<JsonRpcErrorObject>,
}

/// Blocking `eth_call` transport over HTTP(S) using a fresh curl Easy handle per call.
/// Call from `spawn_blocking` if used from async code.
#[derive(Debug)]
pub struct CurlTransport {
    connect_timeout: Duration,
    timeout: Duration,
    next_id: AtomicU64,
}

impl CurlTransport {
    pub fn new(connect_timeout: Duration, timeout: Duration) -> Self {
        Self {
            connect_timeout,
            timeout,
            next_id: AtomicU64::new(1),
        }
    }

    fn post(&self, endpoint: &str, body: &[u8]) -> Result<(u32, Vec<u8>), RpcError> {
        let mut response = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(endpoint)?;
        easy.post(true)?;
        easy.post_fields_copy(body)?;
        easy.follow_location(true)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.timeout)?;

        let mut list = curl::easy::List::new();
        list.append("Content-Type: application/json")?;
        list.append("Accept: application/json")?;
        // No `Expect: 100-continue`.
        list.append("Expect:")?;
        easy.http_headers(list)?;

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                response.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let code = easy.response_code()?;
        Ok((code, response))
    }
}

impl Default for CurlTransport {
    fn default() -> Self {
        Self::new(Duration::from_secs(10), Duration::from_secs(30))
    }
}

impl RpcTransport for CurlTransport {
    fn eth_call(&self, endpoint: &str, to: Address, data: &Bytes) -> Result<Bytes, RpcError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method: "eth_call",
            params: (CallObject { to, data }, "latest"),
        };
        let body =
            serde_json::to_vec(&request).map_err(|e| RpcError::Malformed(e.to_string()))?;

        let (code, response) = self.post(endpoint, &body)?;
        tracing::debug!(endpoint, status = code, bytes = response.len(), "eth_call response");
        parse_response(code, &response)
    }
}

/// Interprets an HTTP status and body as a JSON-RPC `eth_call` response.
///
/// A JSON-RPC error object wins over the HTTP status since some providers
/// report reverts with 4xx/5xx codes.
fn parse_response(code: u32, body: &[u8]) -> Result<Bytes, RpcError> {
    let parsed = serde_json::from_slice::<JsonRpcResponse>(body);
    if let Ok(JsonRpcResponse {
        error: Some(err), ..
    }) = &parsed
    {
        return Err(RpcError::JsonRpc {
            code: err.code,
            message: err.message.clone(),
        });
    }
    if !(200..300).contains(&code) {
        return Err(RpcError::Http(code));
    }
    match parsed {
        Ok(JsonRpcResponse {
            result: Some(result),
            ..
        }) => Ok(result),
        Ok(_) => Err(RpcError::Malformed("missing result".to_string())),
        Err(e) => Err(RpcError::Malformed(e.to_string())),
    }
}
