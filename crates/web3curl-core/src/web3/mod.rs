//! `web3://` resolver backed by JSON-RPC `eth_call`.
//!
//! [`Web3Client`] implements [`Pipeline`] against an [`EffectiveRegistry`]:
//! it resolves ENS names, asks the target for its resolve mode, builds the
//! calldata for the path and decodes the return data into a response. Every
//! contract call goes through the registry's endpoint fallback.

mod abi;
mod decode;
mod locator;
mod mime;
mod mode;
mod name;
mod path;

pub use name::namehash;

use alloy_primitives::{Address, Bytes};
use std::sync::Arc;

use crate::pipeline::{
    CallMode, CallOutcome, DecodedResponse, ModeResolution, NestedCall, ParsedLocator, Pipeline,
    PipelineError, ResolvedRequest, ResolvedTarget,
};
use crate::registry::EffectiveRegistry;
use crate::rpc::{call_with_fallback, EndpointsExhausted, RpcTransport};

/// Chain used when the locator names none.
pub const DEFAULT_CHAIN_ID: u64 = 1;

/// Tunables for [`Web3Client`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// Upper bound on ERC-5219 chunks followed for one response.
    pub max_chunks: usize,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self { max_chunks: 64 }
    }
}

/// Resolves and fetches `web3://` locators.
///
/// Cloning is cheap; body streams hold a clone to fetch further chunks.
#[derive(Clone)]
pub struct Web3Client {
    inner: Arc<Inner>,
}

struct Inner {
    registry: EffectiveRegistry,
    transport: Box<dyn RpcTransport>,
    options: ClientOptions,
}

impl Web3Client {
    pub fn new<T>(registry: EffectiveRegistry, transport: T, options: ClientOptions) -> Self
    where
        T: RpcTransport + 'static,
    {
        Self {
            inner: Arc::new(Inner {
                registry,
                transport: Box::new(transport),
                options,
            }),
        }
    }

    pub fn registry(&self) -> &EffectiveRegistry {
        &self.inner.registry
    }
}

impl Inner {
    fn endpoints(&self, chain_id: u64) -> Result<&[String], PipelineError> {
        let endpoints = self.registry.endpoints(chain_id);
        if endpoints.is_empty() {
            return Err(PipelineError::UnknownChain(chain_id));
        }
        Ok(endpoints)
    }

    /// Makes a resolution call and records it. Only an unknown chain is an
    /// error here; a call no endpoint answered comes back with `result: None`.
    fn traced_call(
        &self,
        label: String,
        chain_id: u64,
        contract: Address,
        calldata: Vec<u8>,
    ) -> Result<NestedCall, PipelineError> {
        let endpoints = self.endpoints(chain_id)?;
        let calldata = Bytes::from(calldata);
        let outcome = call_with_fallback(&*self.transport, endpoints, contract, &calldata);
        let (result, attempts) = match outcome {
            Ok(report) => (Some(report.data), report.attempts),
            Err(exhausted) => (None, exhausted.attempts),
        };
        Ok(NestedCall {
            label,
            contract,
            calldata,
            result,
            attempts,
        })
    }
}

/// True when the call was tried and every endpoint answered with a JSON-RPC
/// error, i.e. the contract itself reverted.
fn reverted(call: &NestedCall) -> bool {
    call.result.is_none() && exhausted(call).all_node_replies()
}

fn exhausted(call: &NestedCall) -> EndpointsExhausted {
    EndpointsExhausted {
        attempts: call.attempts.clone(),
    }
}

impl Pipeline for Web3Client {
    fn decompose_locator(&self, locator: &str) -> Result<ParsedLocator, PipelineError> {
        locator::decompose(locator)
    }

    fn resolve_target_address(
        &self,
        host: &str,
        chain_id: Option<u64>,
    ) -> Result<ResolvedTarget, PipelineError> {
        let chain_id = chain_id.unwrap_or(DEFAULT_CHAIN_ID);
        if host.starts_with("0x") || host.starts_with("0X") {
            let address = host
                .parse::<Address>()
                .map_err(|e| PipelineError::Invalid(format!("invalid address '{}': {}", host, e)))?;
            return Ok(ResolvedTarget {
                address,
                chain_id,
                name_resolution: None,
            });
        }
        let (resolution, target_chain) = self.inner.resolve_name(host, chain_id, true)?;
        Ok(ResolvedTarget {
            address: resolution.address,
            chain_id: target_chain,
            name_resolution: Some(resolution),
        })
    }

    fn determine_call_mode(
        &self,
        target: &ResolvedTarget,
    ) -> Result<ModeResolution, PipelineError> {
        self.inner.determine_mode(target)
    }

    fn resolve_path(
        &self,
        locator: &ParsedLocator,
        target: &ResolvedTarget,
        mode: CallMode,
    ) -> Result<ResolvedRequest, PipelineError> {
        self.inner.resolve_path(locator, target, mode)
    }

    fn perform_call(&self, request: &ResolvedRequest) -> Result<CallOutcome, PipelineError> {
        let endpoints = self.inner.endpoints(request.chain_id)?;
        let report = call_with_fallback(
            &*self.inner.transport,
            endpoints,
            request.contract,
            &request.calldata,
        )?;
        tracing::info!(
            chain_id = request.chain_id,
            contract = %request.contract,
            endpoint = report.endpoint().unwrap_or_default(),
            bytes = report.data.len(),
            "eth_call succeeded"
        );
        Ok(CallOutcome {
            raw: report.data,
            attempts: report.attempts,
        })
    }

    fn decode_return(
        &self,
        request: &ResolvedRequest,
        raw: &Bytes,
    ) -> Result<DecodedResponse, PipelineError> {
        decode::decode(&self.inner, request, raw)
    }
}
