//! Values passed between pipeline stages.

use alloy_primitives::{Address, Bytes};
use std::fmt;

use super::PipelineError;
use crate::rpc::EndpointAttempt;

/// Stage 1 output: a decomposed `web3://` locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLocator {
    pub host: String,
    /// Chain id written in the locator (`host:<id>`), if any.
    pub chain_id: Option<u64>,
    /// Raw path, always starting with `/`.
    pub path: String,
    /// Raw query string without the leading `?`.
    pub query: Option<String>,
}

impl ParsedLocator {
    pub fn path_and_query(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{}", self.path, q),
            None => self.path.clone(),
        }
    }
}

/// A contract call made while resolving (name lookup, mode query, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedCall {
    /// Short description, e.g. `resolver(vitalik.eth)`.
    pub label: String,
    pub contract: Address,
    pub calldata: Bytes,
    /// Return data, `None` when no endpoint succeeded.
    pub result: Option<Bytes>,
    pub attempts: Vec<EndpointAttempt>,
}

/// Name-service lookup performed for a domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameResolution {
    pub name: String,
    /// Name service used, e.g. `ENS`.
    pub service: String,
    /// Chain the lookup ran on.
    pub chain_id: u64,
    pub address: Address,
    pub calls: Vec<NestedCall>,
}

/// Stage 2 output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub address: Address,
    /// Chain the target lives on (a content pointer may move it).
    pub chain_id: u64,
    pub name_resolution: Option<NameResolution>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallMode {
    Auto,
    Manual,
    /// Resource request (ERC-5219).
    ResourceRequest,
}

impl fmt::Display for CallMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallMode::Auto => write!(f, "auto"),
            CallMode::Manual => write!(f, "manual"),
            CallMode::ResourceRequest => write!(f, "resource-request"),
        }
    }
}

/// Stage 3 output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeResolution {
    pub mode: CallMode,
    pub call: NestedCall,
}

/// How the raw return data becomes a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnProcessing {
    /// Raw return data, emitted as a one-element JSON array of hex.
    Raw,
    /// ABI-decode a single `bytes` value and serve it with the given MIME type.
    DecodeBytes { mime_type: Option<String> },
    /// ABI-decode the given tuple type and emit the values as JSON.
    JsonEncodeValues { return_types: String },
    /// Decode an ERC-5219 `(uint16, string, KeyValue[])` response.
    ResourceResponse,
}

impl fmt::Display for ReturnProcessing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReturnProcessing::Raw => write!(f, "raw bytes as JSON"),
            ReturnProcessing::DecodeBytes { mime_type: Some(m) } => {
                write!(f, "decode bytes ({})", m)
            }
            ReturnProcessing::DecodeBytes { mime_type: None } => write!(f, "decode bytes"),
            ReturnProcessing::JsonEncodeValues { return_types } => {
                write!(f, "JSON-encode {}", return_types)
            }
            ReturnProcessing::ResourceResponse => write!(f, "resource response"),
        }
    }
}

/// Structured method call built in auto mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCall {
    pub name: String,
    pub arg_types: Vec<String>,
    pub arg_values: Vec<String>,
}

impl MethodCall {
    /// Canonical signature, e.g. `balanceOf(address)`.
    pub fn signature(&self) -> String {
        format!("{}({})", self.name, self.arg_types.join(","))
    }
}

/// Stage 4 output: everything needed to perform and decode the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRequest {
    pub contract: Address,
    pub chain_id: u64,
    pub mode: CallMode,
    pub calldata: Bytes,
    /// Set when calldata was built from a method name and typed arguments.
    pub method: Option<MethodCall>,
    pub return_processing: ReturnProcessing,
    /// Lookups done for domain-name arguments.
    pub name_resolutions: Vec<NameResolution>,
}

/// Stage 5 output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallOutcome {
    pub raw: Bytes,
    /// Every endpoint tried, the last one being the one that answered.
    pub attempts: Vec<EndpointAttempt>,
}

/// Lazy, single-pass body stream.
pub type BodyStream = Box<dyn Iterator<Item = Result<Vec<u8>, PipelineError>> + Send>;

/// Stage 6 output.
pub struct DecodedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: BodyStream,
}

impl DecodedResponse {
    /// Response whose body is one chunk.
    pub fn whole(status: u16, headers: Vec<(String, String)>, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body: Box::new(std::iter::once(Ok(body))),
        }
    }
}

impl fmt::Debug for DecodedResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}
