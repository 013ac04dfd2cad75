//! Per-stage results retained for the diagnostic trace.

use alloy_primitives::{Address, Bytes};
use std::fmt;

use super::error::PipelineError;
use super::types::{
    CallOutcome, ModeResolution, NestedCall, ParsedLocator, ResolvedRequest, ResolvedTarget,
};
use crate::rpc::EndpointAttempt;

/// The six pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    LocatorDecomposition,
    TargetResolution,
    CallModeDetermination,
    PathResolution,
    NetworkCall,
    ReturnDecoding,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::LocatorDecomposition => "locator decomposition",
            Stage::TargetResolution => "target address resolution",
            Stage::CallModeDetermination => "call mode determination",
            Stage::PathResolution => "path resolution",
            Stage::NetworkCall => "network call",
            Stage::ReturnDecoding => "return decoding",
        };
        f.write_str(name)
    }
}

/// Stage 5 as seen by the trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord {
    pub chain_id: u64,
    pub contract: Address,
    pub calldata: Bytes,
    pub outcome: CallOutcome,
}

impl CallRecord {
    /// Endpoint that answered the call.
    pub fn endpoint(&self) -> Option<&str> {
        self.outcome
            .attempts
            .iter()
            .find(|a| a.is_success())
            .map(|a| a.url.as_str())
    }
}

/// Stage 6 without the body stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    pub status: u16,
    pub headers: Vec<(String, String)>,
}

/// Calls made by a stage that then failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncompleteStage {
    pub stage: Stage,
    pub calls: Vec<NestedCall>,
    pub attempts: Vec<EndpointAttempt>,
}

impl IncompleteStage {
    /// Partial trace data carried by `err`, if any.
    pub(crate) fn from_error(stage: Stage, err: &PipelineError) -> Option<Self> {
        let (calls, attempts) = match err {
            PipelineError::NameResolution { calls, .. } if !calls.is_empty() => {
                (calls.clone(), Vec::new())
            }
            PipelineError::Exhausted(e) if !e.attempts.is_empty() => {
                (Vec::new(), e.attempts.clone())
            }
            _ => return None,
        };
        Some(Self {
            stage,
            calls,
            attempts,
        })
    }
}

/// Immutable record of one completed (or partially completed) stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageResult {
    Locator(ParsedLocator),
    Target(ResolvedTarget),
    Mode(ModeResolution),
    Path(ResolvedRequest),
    Call(CallRecord),
    Decode(ResponseHead),
    Incomplete(IncompleteStage),
}

impl StageResult {
    pub fn stage(&self) -> Stage {
        match self {
            StageResult::Locator(_) => Stage::LocatorDecomposition,
            StageResult::Target(_) => Stage::TargetResolution,
            StageResult::Mode(_) => Stage::CallModeDetermination,
            StageResult::Path(_) => Stage::PathResolution,
            StageResult::Call(_) => Stage::NetworkCall,
            StageResult::Decode(_) => Stage::ReturnDecoding,
            StageResult::Incomplete(i) => i.stage,
        }
    }
}
