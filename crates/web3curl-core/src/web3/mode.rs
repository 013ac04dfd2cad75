//! Resolve-mode query.

use alloy_primitives::B256;
use alloy_sol_types::SolCall;

use super::{abi, exhausted, reverted, Inner};
use crate::pipeline::{CallMode, ModeResolution, PipelineError, ResolvedTarget};

/// Maps a `resolveMode()` word to a call mode.
pub(super) fn parse_mode(word: &B256) -> Result<CallMode, PipelineError> {
    let end = word
        .iter()
        .rposition(|b| *b != 0)
        .map_or(0, |last| last + 1);
    match &word[..end] {
        b"" => Ok(CallMode::Auto),
        b"manual" => Ok(CallMode::Manual),
        b"5219" => Ok(CallMode::ResourceRequest),
        other => Err(PipelineError::Invalid(format!(
            "unsupported resolve mode '{}'",
            String::from_utf8_lossy(other)
        ))),
    }
}

impl Inner {
    pub(super) fn determine_mode(
        &self,
        target: &ResolvedTarget,
    ) -> Result<ModeResolution, PipelineError> {
        let call = self.traced_call(
            "resolveMode()".to_string(),
            target.chain_id,
            target.address,
            abi::resolveModeCall {}.abi_encode(),
        )?;

        let mode = match &call.result {
            // Contracts without code or without the method return short data.
            Some(data) if data.len() < 32 => CallMode::Auto,
            Some(data) => parse_mode(&B256::from_slice(&data[..32]))?,
            None if reverted(&call) => CallMode::Auto,
            None => return Err(exhausted(&call).into()),
        };
        tracing::debug!(contract = %target.address, %mode, "resolve mode");
        Ok(ModeResolution { mode, call })
    }
}
