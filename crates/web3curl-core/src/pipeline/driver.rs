//! Runs a [`Pipeline`] through its stages in fixed order.

use thiserror::Error;

use super::error::{PipelineError, StageError};
use super::stage::{CallRecord, IncompleteStage, ResponseHead, Stage, StageResult};
use super::types::DecodedResponse;
use super::Pipeline;

/// Successful run: the trace of all six stages and the decoded response.
#[derive(Debug)]
pub struct RunOutcome {
    pub trace: Vec<StageResult>,
    pub response: DecodedResponse,
}

/// Failed run: the stage error plus every stage result gathered before it.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct RunFailure {
    pub error: StageError,
    pub trace: Vec<StageResult>,
}

fn fail(trace: &mut Vec<StageResult>, stage: Stage, err: PipelineError) -> RunFailure {
    tracing::warn!(%stage, error = %err, "pipeline stage failed");
    let error = StageError::from_pipeline(stage, &err);
    if let Some(partial) = IncompleteStage::from_error(stage, &err) {
        trace.push(StageResult::Incomplete(partial));
    }
    RunFailure {
        error,
        trace: std::mem::take(trace),
    }
}

/// Resolves `locator` through `pipeline`.
///
/// Each stage consumes the previous stage's output. A failing stage ends the
/// run; no stage is retried here (endpoint fallback lives inside the
/// pipeline's network calls).
pub fn run<P: Pipeline + ?Sized>(pipeline: &P, locator: &str) -> Result<RunOutcome, RunFailure> {
    let mut trace = Vec::with_capacity(6);
    tracing::info!(locator, "pipeline run started");

    let parsed = pipeline
        .decompose_locator(locator)
        .map_err(|e| fail(&mut trace, Stage::LocatorDecomposition, e))?;
    trace.push(StageResult::Locator(parsed.clone()));

    let target = pipeline
        .resolve_target_address(&parsed.host, parsed.chain_id)
        .map_err(|e| fail(&mut trace, Stage::TargetResolution, e))?;
    trace.push(StageResult::Target(target.clone()));

    let mode = pipeline
        .determine_call_mode(&target)
        .map_err(|e| fail(&mut trace, Stage::CallModeDetermination, e))?;
    let call_mode = mode.mode;
    trace.push(StageResult::Mode(mode));

    let request = pipeline
        .resolve_path(&parsed, &target, call_mode)
        .map_err(|e| fail(&mut trace, Stage::PathResolution, e))?;
    trace.push(StageResult::Path(request.clone()));

    let outcome = pipeline
        .perform_call(&request)
        .map_err(|e| fail(&mut trace, Stage::NetworkCall, e))?;
    let raw = outcome.raw.clone();
    trace.push(StageResult::Call(CallRecord {
        chain_id: request.chain_id,
        contract: request.contract,
        calldata: request.calldata.clone(),
        outcome,
    }));

    let response = pipeline
        .decode_return(&request, &raw)
        .map_err(|e| fail(&mut trace, Stage::ReturnDecoding, e))?;
    trace.push(StageResult::Decode(ResponseHead {
        status: response.status,
        headers: response.headers.clone(),
    }));

    tracing::info!(status = response.status, "pipeline run finished");
    Ok(RunOutcome { trace, response })
}
