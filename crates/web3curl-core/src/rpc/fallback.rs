//! Sequential endpoint fallback: try each endpoint in order, stop at first success.

use alloy_primitives::{Address, Bytes};
use std::fmt;
use thiserror::Error;

use super::{AttemptOutcome, EndpointAttempt, RpcTransport};

/// Successful call plus every attempt made; the last attempt is the success.
#[derive(Debug, Clone)]
pub struct CallReport {
    pub data: Bytes,
    pub attempts: Vec<EndpointAttempt>,
}

impl CallReport {
    /// Endpoint that answered.
    pub fn endpoint(&self) -> Option<&str> {
        self.attempts.last().map(|a| a.url.as_str())
    }
}

/// Every endpoint failed (or there were none to try).
#[derive(Debug, Clone, Error)]
pub struct EndpointsExhausted {
    pub attempts: Vec<EndpointAttempt>,
}

impl EndpointsExhausted {
    /// True when at least one endpoint was tried and every one of them
    /// answered with a JSON-RPC error. Used to tell "the contract reverted"
    /// apart from "no endpoint was reachable".
    pub fn all_node_replies(&self) -> bool {
        !self.attempts.is_empty()
            && self.attempts.iter().all(|a| {
                matches!(
                    a.outcome,
                    AttemptOutcome::Error {
                        node_replied: true,
                        ..
                    }
                )
            })
    }
}

impl fmt::Display for EndpointsExhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&describe_failures(&self.attempts))
    }
}

/// One-line summary of failed attempts, e.g.
/// `all 2 RPC endpoint(s) failed: http://a (HTTP 503); http://b (...)`.
pub(crate) fn describe_failures(attempts: &[EndpointAttempt]) -> String {
    if attempts.is_empty() {
        return "no RPC endpoints to try".to_string();
    }
    let details: Vec<String> = attempts
        .iter()
        .map(|a| format!("{} ({})", a.url, a.error_message().unwrap_or("ok")))
        .collect();
    format!(
        "all {} RPC endpoint(s) failed: {}",
        attempts.len(),
        details.join("; ")
    )
}

/// Calls `to` with `data` on each endpoint in order until one succeeds.
///
/// Endpoints are never raced; a failed endpoint is recorded and skipped.
pub fn call_with_fallback(
    transport: &dyn RpcTransport,
    endpoints: &[String],
    to: Address,
    data: &Bytes,
) -> Result<CallReport, EndpointsExhausted> {
    let mut attempts = Vec::with_capacity(endpoints.len());
    for (position, url) in endpoints.iter().enumerate() {
        match transport.eth_call(url, to, data) {
            Ok(result) => {
                attempts.push(EndpointAttempt {
                    url: url.clone(),
                    position,
                    outcome: AttemptOutcome::Success,
                });
                return Ok(CallReport {
                    data: result,
                    attempts,
                });
            }
            Err(e) => {
                tracing::debug!(endpoint = %url, position, error = %e, "endpoint failed, trying next");
                attempts.push(EndpointAttempt {
                    url: url.clone(),
                    position,
                    outcome: AttemptOutcome::Error {
                        message: e.to_string(),
                        node_replied: e.is_node_reply(),
                    },
                });
            }
        }
    }
    tracing::warn!(to = %to, attempted = attempts.len(), "all endpoints failed");
    Err(EndpointsExhausted { attempts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::testing::MockTransport;

    fn endpoints(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("http://rpc{}.test", i)).collect()
    }

    #[test]
    fn stops_at_first_success_for_every_position() {
        let count = 4;
        let eps = endpoints(count);
        for failing in 0..count {
            let transport = MockTransport::new().with_down(&eps[..failing]);
            let report =
                call_with_fallback(&transport, &eps, Address::ZERO, &Bytes::new()).unwrap();
            assert_eq!(report.attempts.len(), failing + 1);
            let (skipped, used) = report.attempts.split_at(failing);
            assert!(skipped.iter().all(|a| !a.is_success()));
            assert!(used[0].is_success());
            assert_eq!(used[0].url, eps[failing]);
            for (i, a) in report.attempts.iter().enumerate() {
                assert_eq!(a.position, i);
            }
            // Endpoints after the successful one are never contacted.
            assert_eq!(transport.calls_to_endpoints().len(), failing + 1);
        }
    }

    #[test]
    fn exhausted_carries_every_error() {
        let eps = endpoints(3);
        let transport = MockTransport::new().with_down(&eps);
        let err = call_with_fallback(&transport, &eps, Address::ZERO, &Bytes::new()).unwrap_err();
        assert_eq!(err.attempts.len(), 3);
        assert!(err.attempts.iter().all(|a| a.error_message().is_some()));
        assert!(!err.all_node_replies());
        let msg = err.to_string();
        assert!(msg.contains("all 3 RPC endpoint(s) failed"));
        assert!(msg.contains("http://rpc2.test"));
    }

    #[test]
    fn reverts_everywhere_are_node_replies() {
        let eps = endpoints(2);
        let transport = MockTransport::new();
        let err = call_with_fallback(&transport, &eps, Address::ZERO, &Bytes::new()).unwrap_err();
        assert!(err.all_node_replies());
    }

    #[test]
    fn no_endpoints() {
        let transport = MockTransport::new();
        let err = call_with_fallback(&transport, &[], Address::ZERO, &Bytes::new()).unwrap_err();
        assert!(err.attempts.is_empty());
        assert!(!err.all_node_replies());
        assert_eq!(err.to_string(), "no RPC endpoints to try");
    }
}
