//! Verbosity-gated diagnostic trace.
//!
//! The trace is a side channel: it never touches the response body. Each
//! stage result is rendered by the table rows matching its stage whose
//! verbosity threshold is met, in table order.

mod format;
mod render;

pub use format::{format_bytes, format_payload, to_hex, LOW_VERBOSITY_MAX_HEX};

use crate::pipeline::{Stage, StageResult};

/// Highest verbosity level; payloads are printed in full.
pub const MAX_VERBOSITY: u8 = 3;

type RenderFn = fn(&StageResult, u8) -> Vec<String>;

struct Renderer {
    /// Stage the row applies to; `None` matches any stage.
    stage: Option<Stage>,
    min_verbosity: u8,
    render: RenderFn,
}

const fn row(stage: Stage, min_verbosity: u8, render: RenderFn) -> Renderer {
    Renderer {
        stage: Some(stage),
        min_verbosity,
        render,
    }
}

const RENDERERS: &[Renderer] = &[
    row(Stage::LocatorDecomposition, 1, render::locator_summary),
    row(Stage::TargetResolution, 1, render::target_summary),
    row(Stage::TargetResolution, 2, render::target_calls),
    row(Stage::CallModeDetermination, 1, render::mode_summary),
    row(Stage::CallModeDetermination, 2, render::mode_call),
    row(Stage::PathResolution, 1, render::path_summary),
    row(Stage::PathResolution, 2, render::path_details),
    row(Stage::NetworkCall, 1, render::call_summary),
    row(Stage::NetworkCall, 2, render::call_details),
    row(Stage::ReturnDecoding, 1, render::response_summary),
    Renderer {
        stage: None,
        min_verbosity: 1,
        render: render::incomplete_summary,
    },
    Renderer {
        stage: None,
        min_verbosity: 2,
        render: render::incomplete_details,
    },
];

/// Renders the trace for `results` at `verbosity` (0 = nothing, 3 = everything).
pub fn emit(verbosity: u8, results: &[StageResult]) -> Vec<String> {
    let verbosity = verbosity.min(MAX_VERBOSITY);
    if verbosity == 0 {
        return Vec::new();
    }
    let mut lines = Vec::new();
    for result in results {
        for renderer in RENDERERS {
            let applies = renderer.stage.map_or(true, |s| s == result.stage());
            if applies && verbosity >= renderer.min_verbosity {
                lines.extend((renderer.render)(result, verbosity));
            }
        }
    }
    lines
}

#[cfg(test)]
mod tests;
