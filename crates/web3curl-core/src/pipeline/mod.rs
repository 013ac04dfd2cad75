//! The resolution/call pipeline: its contract and the driver that runs it.
//!
//! [`Pipeline`] is the seam to the resolver that actually parses the locator,
//! resolves names, picks a call mode and performs the call. [`run`] drives a
//! pipeline through its six stages in fixed order and keeps every stage's
//! result for the diagnostic trace, even when a later stage fails.

mod driver;
mod error;
mod stage;
mod types;

pub use driver::{run, RunFailure, RunOutcome};
pub use error::{PipelineError, StageError};
pub use stage::{CallRecord, IncompleteStage, ResponseHead, Stage, StageResult};
pub use types::{
    BodyStream, CallMode, CallOutcome, DecodedResponse, MethodCall, ModeResolution,
    NameResolution, NestedCall, ParsedLocator, ResolvedRequest, ResolvedTarget, ReturnProcessing,
};

use alloy_primitives::Bytes;

/// Operations consumed from the resolver, one per stage.
///
/// Implementations are constructed with an effective registry and use it
/// for endpoint selection. Each operation may fail with a stage-specific
/// [`PipelineError`].
pub trait Pipeline {
    /// Stage 1: split the locator into host, path and optional chain id.
    fn decompose_locator(&self, locator: &str) -> Result<ParsedLocator, PipelineError>;

    /// Stage 2: resolve the host to a contract address (may resolve names).
    fn resolve_target_address(
        &self,
        host: &str,
        chain_id: Option<u64>,
    ) -> Result<ResolvedTarget, PipelineError>;

    /// Stage 3: ask the target which call mode it uses.
    fn determine_call_mode(&self, target: &ResolvedTarget)
        -> Result<ModeResolution, PipelineError>;

    /// Stage 4: turn the path into calldata and a return-processing strategy.
    fn resolve_path(
        &self,
        locator: &ParsedLocator,
        target: &ResolvedTarget,
        mode: CallMode,
    ) -> Result<ResolvedRequest, PipelineError>;

    /// Stage 5: perform the call with endpoint fallback.
    fn perform_call(&self, request: &ResolvedRequest) -> Result<CallOutcome, PipelineError>;

    /// Stage 6: decode the raw return into status, headers and a body stream.
    fn decode_return(
        &self,
        request: &ResolvedRequest,
        raw: &Bytes,
    ) -> Result<DecodedResponse, PipelineError>;
}
