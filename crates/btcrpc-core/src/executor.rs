//! The retrying call executor: one logical call, a bounded sequence of
//! attempts, exactly one terminal outcome.

use std::sync::Arc;

use serde_json::Value;

use crate::error::{BitcoinJsonRpcError, CallDiagnostics};
use crate::policy::{NextStep, RetryPolicy};
use crate::request::{JsonRpcRequest, RpcParam};
use crate::response::{self, summarize, truncate_message};
use crate::shape::{AnyValue, ResponseShape};
use crate::transport::RpcTransport;

/// Every request carries this id; calls are never batched.
const REQUEST_ID: u64 = 1;

/// Drives calls through the response classifier, the retry policy and the
/// shape check.
///
/// Holds only immutable state, so one executor can serve any number of
/// concurrent calls; each call's attempt state lives on its own stack.
#[derive(Clone)]
pub struct CallExecutor {
    transport: Arc<dyn RpcTransport>,
    policy: Arc<RetryPolicy>,
}

impl CallExecutor {
    pub fn new(transport: Arc<dyn RpcTransport>, policy: RetryPolicy) -> Self {
        Self {
            transport,
            policy: Arc::new(policy),
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn transport(&self) -> &Arc<dyn RpcTransport> {
        &self.transport
    }

    /// A new executor sharing this one's policy but sending through `transport`.
    pub fn with_transport(&self, transport: Arc<dyn RpcTransport>) -> Self {
        Self {
            transport,
            policy: Arc::clone(&self.policy),
        }
    }

    /// Call `method` and return the raw `result`.
    pub async fn call_value(
        &self,
        method: &str,
        params: Vec<RpcParam>,
    ) -> Result<Value, BitcoinJsonRpcError> {
        self.call(method, params, &AnyValue).await
    }

    /// Call `method`, retrying per the policy, and validate the result
    /// against `shape`.
    ///
    /// Dropping the returned future abandons the call, including any
    /// pending inter-attempt delay.
    pub async fn call<S: ResponseShape>(
        &self,
        method: &str,
        params: Vec<RpcParam>,
        shape: &S,
    ) -> Result<S::Output, BitcoinJsonRpcError> {
        let req = JsonRpcRequest::new(REQUEST_ID, method, params);
        let method_is_pure = self.policy.is_pure(method);
        let max_attempts = self.policy.max_attempts();

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            tracing::debug!(
                method,
                attempt,
                max_attempts,
                params = %params_summary(&req.params),
                url = %self.transport.url(),
                "sending request"
            );

            let failure = match response::classify(self.transport.send(&req).await) {
                Ok(payload) => {
                    tracing::debug!(method, attempt, result = %summarize(&payload), "received result");
                    return shape.validate(payload).map_err(|e| {
                        tracing::error!(method, attempt, error = %e, "response shape mismatch");
                        BitcoinJsonRpcError::shape_mismatch(
                            e,
                            diagnostics(req, method_is_pure, max_attempts, attempt),
                        )
                    });
                }
                Err(failure) => failure,
            };

            let decision = self.policy.decide(method, &failure.message);
            match self.policy.next_step(attempt, &decision) {
                NextStep::RetryAfter(delay) => {
                    tracing::warn!(
                        method,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        executed = %decision.executed,
                        error = %failure.summary(),
                        "retrying request"
                    );
                    tokio::time::sleep(delay).await;
                }
                NextStep::Stop(stop) => {
                    tracing::error!(
                        method,
                        attempt,
                        executed = %decision.executed,
                        had_effects = decision.had_effects,
                        stop = ?stop,
                        error = %failure.summary(),
                        "request failed"
                    );
                    return Err(BitcoinJsonRpcError::from_failure(
                        failure,
                        decision.executed,
                        stop,
                        diagnostics(req, method_is_pure, max_attempts, attempt),
                    ));
                }
            }
        }
    }
}

impl std::fmt::Debug for CallExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallExecutor")
            .field("url", &self.transport.url())
            .field("policy", &self.policy)
            .finish()
    }
}

fn params_summary(params: &[RpcParam]) -> String {
    truncate_message(&serde_json::to_string(params).unwrap_or_default())
}

fn diagnostics(
    req: JsonRpcRequest,
    method_is_pure: bool,
    max_attempts: u32,
    attempts_used: u32,
) -> CallDiagnostics {
    CallDiagnostics {
        method: req.method,
        params: req.params,
        method_is_pure,
        max_attempts,
        attempts_used,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::json;

    use crate::error::{FailureKind, StopReason, TransportError};
    use crate::policy::{ExecutedVerdict, RetryConfig};
    use crate::shape::Typed;

    /// Replays a script of outcomes; the last one repeats once exhausted.
    struct MockTransport {
        script: Mutex<VecDeque<Result<Value, TransportError>>>,
        last: fn() -> Result<Value, TransportError>,
        calls: Mutex<Vec<JsonRpcRequest>>,
    }

    impl MockTransport {
        fn new(
            script: Vec<Result<Value, TransportError>>,
            last: fn() -> Result<Value, TransportError>,
        ) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                last,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<JsonRpcRequest> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RpcTransport for MockTransport {
        async fn send(&self, req: &JsonRpcRequest) -> Result<Value, TransportError> {
            self.calls.lock().unwrap().push(req.clone());
            let next = self.script.lock().unwrap().pop_front();
            next.unwrap_or_else(self.last)
        }

        fn url(&self) -> &str {
            "mock://node"
        }
    }

    fn rpc_error(message: &str) -> Result<Value, TransportError> {
        Ok(json!({"result": null, "error": {"code": -1, "message": message}, "id": 1}))
    }

    fn ok(result: Value) -> Result<Value, TransportError> {
        Ok(json!({"result": result, "error": null, "id": 1}))
    }

    fn executor(transport: Arc<MockTransport>) -> CallExecutor {
        CallExecutor::new(
            transport,
            RetryPolicy::new(RetryConfig {
                max_attempts: 5,
                delay_between_attempts: Duration::from_millis(1),
            }),
        )
    }

    #[tokio::test]
    async fn success_on_first_attempt() {
        let transport = MockTransport::new(vec![], || ok(json!(101)));
        let count: u64 = executor(transport.clone())
            .call("getblockcount", vec![], &Typed::new())
            .await
            .unwrap();
        assert_eq!(count, 101);
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn same_request_is_resent_on_retry() {
        let transport = MockTransport::new(
            vec![rpc_error("Loading block index…")],
            || ok(json!("00ab")),
        );
        let hash: String = executor(transport.clone())
            .call("getblockhash", vec![json!(7)], &Typed::new())
            .await
            .unwrap();
        assert_eq!(hash, "00ab");
        let calls = transport.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], calls[1]);
    }

    #[tokio::test]
    async fn pure_method_exhausts_attempts() {
        let transport = MockTransport::new(vec![], || rpc_error("socket hang up"));
        let err = executor(transport.clone())
            .call_value("getrawmempool", vec![])
            .await
            .unwrap_err();
        assert_eq!(err.stop_reason(), StopReason::AttemptsExhausted);
        assert_eq!(err.attempts_used(), 5);
        assert_eq!(err.executed(), ExecutedVerdict::Unknown);
        assert!(err.diagnostics().method_is_pure);
        assert_eq!(transport.calls().len(), 5);
    }

    #[tokio::test]
    async fn mutating_method_with_unknown_failure_stops_at_once() {
        let transport = MockTransport::new(vec![], || rpc_error("socket hang up"));
        let err = executor(transport.clone())
            .call_value("sendtoaddress", vec![json!("bc1q"), json!(1.0)])
            .await
            .unwrap_err();
        assert_eq!(err.stop_reason(), StopReason::Unretryable);
        assert_eq!(err.executed(), ExecutedVerdict::Unknown);
        assert_eq!(err.attempts_used(), 1);
        assert_eq!(err.diagnostics().params, vec![json!("bc1q"), json!(1.0)]);
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn shape_mismatch_is_executed() {
        let transport = MockTransport::new(vec![], || ok(json!({"balance": 1})));
        let err = executor(transport)
            .call("getbalance", vec![], &Typed::<f64>::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Shape);
        assert_eq!(err.executed(), ExecutedVerdict::Executed);
        assert_eq!(err.attempts_used(), 1);
    }

    #[tokio::test]
    async fn transport_error_data_is_composed() {
        let transport = MockTransport::new(vec![], || {
            Err(TransportError::Status {
                status: 500,
                body: Some(json!({"error": {"code": -4, "message": "Insufficient funds"}})),
            })
        });
        let err = executor(transport)
            .call_value("sendtoaddress", vec![json!("bc1q"), json!(1.0)])
            .await
            .unwrap_err();
        let data = err.data();
        assert_eq!(data["errorCode"], json!(-4));
        assert!(data.contains_key("jsonRpcResponse"));
        assert_eq!(data["method"], json!("sendtoaddress"));
        assert_eq!(data["attemptsUsed"], json!(1));
    }
}
