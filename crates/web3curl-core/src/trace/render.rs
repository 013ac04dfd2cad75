//! Line renderers, one per (stage, verbosity) row of the trace table.
//! Each renderer returns nothing for results of another shape.

use crate::pipeline::{NestedCall, StageResult};
use crate::rpc::EndpointAttempt;

use super::format::format_payload;

fn attempt_lines(attempts: &[EndpointAttempt], indent: &str) -> Vec<String> {
    let succeeded = attempts.iter().any(EndpointAttempt::is_success);
    attempts
        .iter()
        .map(|a| match a.error_message() {
            Some(msg) if succeeded => {
                format!("{}! skipped #{} {}: {}", indent, a.position, a.url, msg)
            }
            Some(msg) => format!("{}! failed #{} {}: {}", indent, a.position, a.url, msg),
            None => format!("{}= endpoint #{} {}", indent, a.position, a.url),
        })
        .collect()
}

fn nested_call_lines(call: &NestedCall, verbosity: u8) -> Vec<String> {
    let mut lines = vec![
        format!("  > {} on {}", call.label, call.contract),
        format!("      calldata: {}", format_payload(&call.calldata, verbosity)),
    ];
    lines.extend(attempt_lines(&call.attempts, "      "));
    if let Some(result) = &call.result {
        lines.push(format!("      return: {}", format_payload(result, verbosity)));
    }
    lines
}

pub(super) fn locator_summary(result: &StageResult, _verbosity: u8) -> Vec<String> {
    let StageResult::Locator(loc) = result else {
        return Vec::new();
    };
    let chain = loc
        .chain_id
        .map(|c| c.to_string())
        .unwrap_or_else(|| "default".to_string());
    vec![format!(
        "* Locator: host {}, chain {}, path {}",
        loc.host,
        chain,
        loc.path_and_query()
    )]
}

pub(super) fn target_summary(result: &StageResult, _verbosity: u8) -> Vec<String> {
    let StageResult::Target(target) = result else {
        return Vec::new();
    };
    match &target.name_resolution {
        Some(res) => vec![format!(
            "* Target: {} resolved by {} on chain {} to {} (chain {})",
            res.name, res.service, res.chain_id, target.address, target.chain_id
        )],
        None => vec![format!(
            "* Target: {} on chain {}",
            target.address, target.chain_id
        )],
    }
}

pub(super) fn target_calls(result: &StageResult, verbosity: u8) -> Vec<String> {
    let StageResult::Target(target) = result else {
        return Vec::new();
    };
    target
        .name_resolution
        .iter()
        .flat_map(|res| res.calls.iter())
        .flat_map(|call| nested_call_lines(call, verbosity))
        .collect()
}

pub(super) fn mode_summary(result: &StageResult, _verbosity: u8) -> Vec<String> {
    match result {
        StageResult::Mode(mode) => vec![format!("* Mode: {}", mode.mode)],
        _ => Vec::new(),
    }
}

pub(super) fn mode_call(result: &StageResult, verbosity: u8) -> Vec<String> {
    match result {
        StageResult::Mode(mode) => nested_call_lines(&mode.call, verbosity),
        _ => Vec::new(),
    }
}

pub(super) fn path_summary(result: &StageResult, _verbosity: u8) -> Vec<String> {
    let StageResult::Path(req) = result else {
        return Vec::new();
    };
    let call = match &req.method {
        Some(method) => method.signature(),
        None => format!("{} calldata ({} bytes)", req.mode, req.calldata.len()),
    };
    vec![format!("* Request: {} -> {}", call, req.return_processing)]
}

pub(super) fn path_details(result: &StageResult, verbosity: u8) -> Vec<String> {
    let StageResult::Path(req) = result else {
        return Vec::new();
    };
    let mut lines: Vec<String> = req
        .name_resolutions
        .iter()
        .flat_map(|res| res.calls.iter())
        .flat_map(|call| nested_call_lines(call, verbosity))
        .collect();
    if let Some(method) = &req.method {
        for (ty, value) in method.arg_types.iter().zip(&method.arg_values) {
            lines.push(format!("    arg {}: {}", ty, value));
        }
    }
    lines.push(format!(
        "    calldata: {}",
        format_payload(&req.calldata, verbosity)
    ));
    lines
}

pub(super) fn call_summary(result: &StageResult, _verbosity: u8) -> Vec<String> {
    let StageResult::Call(call) = result else {
        return Vec::new();
    };
    vec![format!(
        "* Call: chain {}, contract {}, via {}",
        call.chain_id,
        call.contract,
        call.endpoint().unwrap_or("-")
    )]
}

pub(super) fn call_details(result: &StageResult, verbosity: u8) -> Vec<String> {
    let StageResult::Call(call) = result else {
        return Vec::new();
    };
    let mut lines = vec![format!(
        "    calldata: {}",
        format_payload(&call.calldata, verbosity)
    )];
    lines.extend(attempt_lines(&call.outcome.attempts, "    "));
    lines.push(format!(
        "    return: {}",
        format_payload(&call.outcome.raw, verbosity)
    ));
    lines
}

pub(super) fn response_summary(result: &StageResult, _verbosity: u8) -> Vec<String> {
    let StageResult::Decode(head) = result else {
        return Vec::new();
    };
    let mut lines = vec![format!("* Response: status {}", head.status)];
    lines.extend(head.headers.iter().map(|(k, v)| format!("    {}: {}", k, v)));
    lines
}

pub(super) fn incomplete_summary(result: &StageResult, _verbosity: u8) -> Vec<String> {
    match result {
        StageResult::Incomplete(inc) => vec![format!("* Failed during {}", inc.stage)],
        _ => Vec::new(),
    }
}

pub(super) fn incomplete_details(result: &StageResult, verbosity: u8) -> Vec<String> {
    let StageResult::Incomplete(inc) = result else {
        return Vec::new();
    };
    let mut lines: Vec<String> = inc
        .calls
        .iter()
        .flat_map(|call| nested_call_lines(call, verbosity))
        .collect();
    lines.extend(attempt_lines(&inc.attempts, "    "));
    lines
}
