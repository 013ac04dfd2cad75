//! Return decoding and the ERC-5219 chunk stream.

use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{Address, Bytes};
use alloy_sol_types::{sol_data, SolCall, SolType};
use serde_json::Value;
use std::sync::Arc;

use super::{abi, path, Inner};
use crate::pipeline::{DecodedResponse, PipelineError, ResolvedRequest, ReturnProcessing};

const CONTENT_TYPE: &str = "Content-Type";
const JSON: &str = "application/json";
/// Header naming the next chunk of a resource response.
pub(super) const NEXT_CHUNK: &str = "web3-next-chunk";

fn invalid(msg: impl Into<String>) -> PipelineError {
    PipelineError::Invalid(msg.into())
}

fn hex_string(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// JSON form of a decoded value: uints as hex, ints in decimal, addresses
/// checksummed, byte strings as hex.
pub(super) fn to_json(value: &DynSolValue) -> Value {
    match value {
        DynSolValue::Bool(b) => Value::Bool(*b),
        DynSolValue::Uint(u, _) => Value::String(format!("0x{:x}", u)),
        DynSolValue::Int(i, _) => Value::String(i.to_string()),
        DynSolValue::Address(a) => Value::String(a.to_checksum(None)),
        DynSolValue::Function(f) => Value::String(hex_string(f.as_slice())),
        DynSolValue::FixedBytes(word, size) => Value::String(hex_string(&word[..*size])),
        DynSolValue::Bytes(b) => Value::String(hex_string(b)),
        DynSolValue::String(s) => Value::String(s.clone()),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) | DynSolValue::Tuple(items) => {
            Value::Array(items.iter().map(to_json).collect())
        }
        #[allow(unreachable_patterns)]
        other => Value::String(format!("{:?}", other)),
    }
}

fn json_body(value: &Value) -> Result<Vec<u8>, PipelineError> {
    serde_json::to_vec(value).map_err(|e| invalid(format!("JSON encoding failed: {}", e)))
}

pub(super) fn decode(
    inner: &Arc<Inner>,
    request: &ResolvedRequest,
    raw: &Bytes,
) -> Result<DecodedResponse, PipelineError> {
    match &request.return_processing {
        ReturnProcessing::Raw => {
            let body = json_body(&Value::Array(vec![Value::String(hex_string(raw))]))?;
            Ok(DecodedResponse::whole(
                200,
                vec![(CONTENT_TYPE.to_string(), JSON.to_string())],
                body,
            ))
        }
        ReturnProcessing::DecodeBytes { mime_type } => {
            let (body,) = <(sol_data::Bytes,)>::abi_decode_params(raw, true)
                .map_err(|e| invalid(format!("return data is not ABI-encoded bytes: {}", e)))?;
            let headers = mime_type
                .iter()
                .map(|m| (CONTENT_TYPE.to_string(), m.clone()))
                .collect();
            Ok(DecodedResponse::whole(200, headers, body.to_vec()))
        }
        ReturnProcessing::JsonEncodeValues { return_types } => {
            let ty = DynSolType::parse(return_types)
                .map_err(|e| invalid(format!("invalid returns '{}': {}", return_types, e)))?;
            let value = ty.abi_decode_params(raw).map_err(|e| {
                invalid(format!("return data does not match {}: {}", return_types, e))
            })?;
            let body = json_body(&to_json(&value))?;
            Ok(DecodedResponse::whole(
                200,
                vec![(CONTENT_TYPE.to_string(), JSON.to_string())],
                body,
            ))
        }
        ReturnProcessing::ResourceResponse => {
            let chunk = ResourceChunk::decode(raw)?;
            let next = chunk.next_link();
            let stream = ChunkStream {
                inner: Arc::clone(inner),
                contract: request.contract,
                chain_id: request.chain_id,
                first: Some(chunk.body),
                next,
                followed: 0,
                done: false,
            };
            Ok(DecodedResponse {
                status: chunk.status,
                headers: chunk.headers,
                body: Box::new(stream),
            })
        }
    }
}

/// One decoded `request(...)` return.
struct ResourceChunk {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl ResourceChunk {
    fn decode(raw: &[u8]) -> Result<Self, PipelineError> {
        let ret = abi::requestCall::abi_decode_returns(raw, true)
            .map_err(|e| invalid(format!("malformed resource response: {}", e)))?;
        Ok(Self {
            status: ret.statusCode,
            headers: ret
                .headers
                .into_iter()
                .map(|kv| (kv.key, kv.value))
                .collect(),
            body: ret.body.into_bytes(),
        })
    }

    /// Relative link to the next chunk, if any. Absolute links are not followed.
    fn next_link(&self) -> Option<String> {
        let (_, link) = self
            .headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(NEXT_CHUNK))?;
        if link.starts_with('/') {
            Some(link.clone())
        } else {
            tracing::warn!(link = %link, "not following non-relative next-chunk link");
            None
        }
    }
}

/// Lazily fetches follow-up chunks while the body is consumed.
struct ChunkStream {
    inner: Arc<Inner>,
    contract: Address,
    chain_id: u64,
    first: Option<Vec<u8>>,
    next: Option<String>,
    followed: usize,
    done: bool,
}

impl ChunkStream {
    fn fetch(&self, link: &str) -> Result<ResourceChunk, PipelineError> {
        let (path, query) = match link.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (link, None),
        };
        let (resource, params) = path::resource_request(path, query)?;
        let calldata = abi::requestCall { resource, params }.abi_encode();
        let endpoints = self.inner.endpoints(self.chain_id)?;
        let report = crate::rpc::call_with_fallback(
            &*self.inner.transport,
            endpoints,
            self.contract,
            &calldata.into(),
        )?;
        tracing::debug!(link, endpoint = report.endpoint().unwrap_or_default(), "fetched chunk");
        ResourceChunk::decode(&report.data)
    }
}

impl Iterator for ChunkStream {
    type Item = Result<Vec<u8>, PipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(first) = self.first.take() {
            return Some(Ok(first));
        }
        if self.done {
            return None;
        }
        let link = self.next.take()?;
        if self.followed >= self.inner.options.max_chunks {
            self.done = true;
            return Some(Err(invalid(format!(
                "response has more than {} follow-up chunks",
                self.inner.options.max_chunks
            ))));
        }
        self.followed += 1;
        match self.fetch(&link) {
            Ok(chunk) => {
                self.next = chunk.next_link();
                Some(Ok(chunk.body))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{I256, U256};

    #[test]
    fn json_values() {
        let value = DynSolValue::Tuple(vec![
            DynSolValue::Uint(U256::from(255), 256),
            DynSolValue::Int(I256::try_from(-5i64).unwrap(), 256),
            DynSolValue::Bool(true),
            DynSolValue::String("hi".into()),
            DynSolValue::Bytes(vec![0xab, 0xcd]),
            DynSolValue::FixedBytes(alloy_primitives::B256::repeat_byte(0x11), 2),
            DynSolValue::Array(vec![DynSolValue::Uint(U256::ZERO, 8)]),
        ]);
        assert_eq!(
            to_json(&value),
            serde_json::json!(["0xff", "-5", true, "hi", "0xabcd", "0x1111", ["0x0"]])
        );
    }
}
