//! Trace rendering tests.

use super::*;
use crate::pipeline::{
    CallMode, CallOutcome, CallRecord, IncompleteStage, MethodCall, ModeResolution,
    NameResolution, NestedCall, ParsedLocator, ResolvedRequest, ResolvedTarget, ResponseHead,
    ReturnProcessing,
};
use crate::rpc::{AttemptOutcome, EndpointAttempt};
use alloy_primitives::{Address, Bytes};

fn attempts(failures: usize, succeed: bool) -> Vec<EndpointAttempt> {
    let mut out: Vec<EndpointAttempt> = (0..failures)
        .map(|i| EndpointAttempt {
            url: format!("http://rpc{}.test", i),
            position: i,
            outcome: AttemptOutcome::Error {
                message: "HTTP 502".to_string(),
                node_replied: false,
            },
        })
        .collect();
    if succeed {
        out.push(EndpointAttempt {
            url: format!("http://rpc{}.test", failures),
            position: failures,
            outcome: AttemptOutcome::Success,
        });
    }
    out
}

fn nested(label: &str) -> NestedCall {
    NestedCall {
        label: label.to_string(),
        contract: Address::repeat_byte(0x22),
        calldata: Bytes::from(vec![1, 2, 3, 4]),
        result: Some(Bytes::from(vec![0u8; 32])),
        attempts: attempts(0, true),
    }
}

fn call_record(failures: usize, raw: Vec<u8>) -> CallRecord {
    CallRecord {
        chain_id: 1,
        contract: Address::repeat_byte(0x11),
        calldata: Bytes::from(vec![0xaa; 4]),
        outcome: CallOutcome {
            raw: Bytes::from(raw),
            attempts: attempts(failures, true),
        },
    }
}

fn full_trace() -> Vec<StageResult> {
    let target = Address::repeat_byte(0x11);
    vec![
        StageResult::Locator(ParsedLocator {
            host: "vitalik.eth".to_string(),
            chain_id: None,
            path: "/balanceOf/0x1111111111111111111111111111111111111111".to_string(),
            query: Some("returns=(uint256)".to_string()),
        }),
        StageResult::Target(ResolvedTarget {
            address: target,
            chain_id: 1,
            name_resolution: Some(NameResolution {
                name: "vitalik.eth".to_string(),
                service: "ENS".to_string(),
                chain_id: 1,
                address: target,
                calls: vec![nested("resolver(vitalik.eth)"), nested("addr(vitalik.eth)")],
            }),
        }),
        StageResult::Mode(ModeResolution {
            mode: CallMode::Auto,
            call: nested("resolveMode()"),
        }),
        StageResult::Path(ResolvedRequest {
            contract: target,
            chain_id: 1,
            mode: CallMode::Auto,
            calldata: Bytes::from(vec![0xaa; 4]),
            method: Some(MethodCall {
                name: "balanceOf".to_string(),
                arg_types: vec!["address".to_string()],
                arg_values: vec!["0x1111111111111111111111111111111111111111".to_string()],
            }),
            return_processing: ReturnProcessing::JsonEncodeValues {
                return_types: "(uint256)".to_string(),
            },
            name_resolutions: Vec::new(),
        }),
        StageResult::Call(call_record(0, vec![0u8; 32])),
        StageResult::Decode(ResponseHead {
            status: 200,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
        }),
    ]
}

#[test]
fn verbosity_zero_emits_nothing() {
    assert!(emit(0, &full_trace()).is_empty());
}

#[test]
fn verbosity_one_is_one_summary_per_stage() {
    let lines = emit(1, &full_trace());
    let summaries: Vec<&String> = lines.iter().filter(|l| l.starts_with("* ")).collect();
    assert_eq!(summaries.len(), 6);
    assert!(summaries[0].contains("host vitalik.eth"));
    assert!(summaries[1].contains("resolved by ENS"));
    assert_eq!(summaries[2], "* Mode: auto");
    assert_eq!(
        summaries[3].as_str(),
        "* Request: balanceOf(address) -> JSON-encode (uint256)"
    );
    assert!(summaries[4].ends_with("via http://rpc0.test"));
    assert_eq!(summaries[5], "* Response: status 200");
    assert!(lines.iter().any(|l| l == "    Content-Type: application/json"));
    // No call data at verbosity 1.
    assert!(!lines.iter().any(|l| l.contains("calldata:")));
}

#[test]
fn verbosity_two_adds_nested_calls_and_payloads() {
    let lines = emit(2, &full_trace());
    let nested: Vec<&String> = lines.iter().filter(|l| l.starts_with("  > ")).collect();
    assert_eq!(nested.len(), 3);
    assert!(nested[0].contains("resolver(vitalik.eth)"));
    assert!(nested[2].contains("resolveMode()"));
    assert!(lines.iter().any(|l| l == "    calldata: 0xaaaaaaaa"));
    assert!(lines.iter().any(|l| l == "    arg address: 0x1111111111111111111111111111111111111111"));
}

#[test]
fn skipped_endpoints_listed_in_order_before_used_one() {
    let count = 4;
    for failures in 0..count {
        let trace = vec![StageResult::Call(call_record(failures, vec![1]))];
        let lines = emit(2, &trace);
        let attempt_lines: Vec<&String> = lines
            .iter()
            .filter(|l| l.contains("! skipped") || l.contains("= endpoint"))
            .collect();
        assert_eq!(attempt_lines.len(), failures + 1);
        for (i, line) in attempt_lines[..failures].iter().enumerate() {
            assert!(line.contains("! skipped"));
            assert!(line.contains(&format!("#{} http://rpc{}.test", i, i)));
        }
        assert!(attempt_lines[failures].contains(&format!("= endpoint #{}", failures)));
    }
}

#[test]
fn payloads_truncated_until_verbosity_three() {
    let trace = vec![StageResult::Call(call_record(0, vec![0xab; 100]))];
    let full = format!("0x{}", "ab".repeat(100));

    let at_two = emit(2, &trace);
    let ret = at_two.iter().find(|l| l.contains("return:")).unwrap();
    assert!(ret.contains("..."));
    assert!(!ret.contains(&full));

    let at_three = emit(3, &trace);
    let ret = at_three.iter().find(|l| l.contains("return:")).unwrap();
    assert!(ret.ends_with(&full));
}

#[test]
fn verbosity_is_clamped() {
    assert_eq!(emit(9, &full_trace()), emit(3, &full_trace()));
}

#[test]
fn incomplete_stage_shows_failed_attempts() {
    let trace = vec![StageResult::Incomplete(IncompleteStage {
        stage: crate::pipeline::Stage::NetworkCall,
        calls: Vec::new(),
        attempts: attempts(2, false),
    })];
    assert_eq!(emit(1, &trace), vec!["* Failed during network call".to_string()]);
    let lines = emit(2, &trace);
    assert_eq!(lines.iter().filter(|l| l.contains("! failed")).count(), 2);
}

#[test]
fn rendering_is_deterministic() {
    assert_eq!(emit(2, &full_trace()), emit(2, &full_trace()));
}
