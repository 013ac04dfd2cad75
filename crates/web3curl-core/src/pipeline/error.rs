//! Pipeline and stage errors.

use thiserror::Error;

use super::stage::Stage;
use super::types::NestedCall;
use crate::rpc::{describe_failures, EndpointAttempt, EndpointsExhausted};

/// Error returned by a [`Pipeline`](super::Pipeline) operation.
#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    #[error("invalid web3 URL: {0}")]
    InvalidLocator(String),
    /// Name lookup failed; carries the calls made before the failure.
    #[error("{message}")]
    NameResolution {
        message: String,
        calls: Vec<NestedCall>,
    },
    #[error("no RPC endpoints configured for chain {0}")]
    UnknownChain(u64),
    #[error(transparent)]
    Exhausted(#[from] EndpointsExhausted),
    #[error("{0}")]
    Invalid(String),
}

/// Terminal failure of one stage, as surfaced to the caller.
#[derive(Debug, Clone, Error)]
pub enum StageError {
    #[error("{stage} failed: {message}")]
    Failed { stage: Stage, message: String },
    /// The main network call failed on every endpoint.
    #[error("{stage} failed: {}", describe_failures(.attempts))]
    NetworkCallExhausted {
        stage: Stage,
        attempts: Vec<EndpointAttempt>,
    },
}

impl StageError {
    pub fn stage(&self) -> Stage {
        match self {
            StageError::Failed { stage, .. } | StageError::NetworkCallExhausted { stage, .. } => {
                *stage
            }
        }
    }

    /// Converts a pipeline error raised by `stage`; the message is kept verbatim.
    pub(crate) fn from_pipeline(stage: Stage, err: &PipelineError) -> Self {
        match err {
            PipelineError::Exhausted(exhausted) if stage == Stage::NetworkCall => {
                StageError::NetworkCallExhausted {
                    stage,
                    attempts: exhausted.attempts.clone(),
                }
            }
            other => StageError::Failed {
                stage,
                message: other.to_string(),
            },
        }
    }
}
