//! Error types: transport failures, normalized per-attempt failures and the
//! terminal [`BitcoinJsonRpcError`] a caller observes.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::policy::ExecutedVerdict;
use crate::response::truncate_message;
use crate::shape::ShapeError;

/// Errors raised by an [`RpcTransport`](crate::RpcTransport) before a usable
/// response body was obtained.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed for a reason other than refusal or timeout.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The node refused the TCP connection; nothing reached it.
    #[error("connect ECONNREFUSED {endpoint}")]
    ConnectionRefused { endpoint: String },

    /// No connection was established for another reason (DNS, TLS handshake).
    #[error("connect error to {endpoint}: {reason}")]
    Connect { endpoint: String, reason: String },

    /// Request timed out after the configured duration.
    #[error("Request timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// Non-2xx HTTP status. bitcoind reports RPC errors as HTTP 500 with a
    /// JSON-RPC envelope, so the body is kept for the response classifier.
    #[error("HTTP status {status}")]
    Status { status: u16, body: Option<Value> },

    /// An unexpected error.
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// The response body attached to this error, if the node sent one.
    pub fn body(&self) -> Option<&Value> {
        match self {
            Self::Status { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    /// Returns `true` if the node actively refused the connection.
    pub fn is_connection_refused(&self) -> bool {
        matches!(self, Self::ConnectionRefused { .. })
    }
}

/// Where a failure originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Connection-level failure; no response body.
    Transport,
    /// JSON-RPC `error`, bare error string, or missing `result`.
    Protocol,
    /// Success envelope whose payload has the wrong shape.
    Shape,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport => write!(f, "transport"),
            Self::Protocol => write!(f, "protocol"),
            Self::Shape => write!(f, "shape"),
        }
    }
}

/// Normalized view of one failed attempt.
///
/// `message` is the raw text reported by the node or transport; rule
/// tables match against it untruncated.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct RpcFailure {
    pub kind: FailureKind,
    pub message: String,
    /// Diagnostic payload, e.g. `{"jsonRpcResponse": <body>}`.
    pub data: Map<String, Value>,
    /// The transport error this failure was resolved from.
    #[source]
    pub cause: Option<TransportError>,
}

impl RpcFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            data: Map::new(),
            cause: None,
        }
    }

    pub fn with_data(mut self, key: impl Into<String>, value: Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    pub fn caused_by(mut self, cause: TransportError) -> Self {
        self.cause = Some(cause);
        self
    }

    /// The message capped for logs.
    pub fn summary(&self) -> String {
        truncate_message(&self.message)
    }
}

/// Why the retry loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Every attempt in the budget failed.
    AttemptsExhausted,
    /// The failure was recognized as unsafe or pointless to retry.
    Unretryable,
}

/// Per-call context attached to every terminal error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallDiagnostics {
    pub method: String,
    pub params: Vec<Value>,
    pub method_is_pure: bool,
    pub max_attempts: u32,
    pub attempts_used: u32,
}

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Terminal failure of one logical call.
///
/// Callers branch on [`executed`](Self::executed) to decide compensation:
/// anything other than [`ExecutedVerdict::NotExecuted`] on a mutating
/// method means the side effect may already have happened.
#[derive(Debug, Error)]
#[error("{}: {}", .diagnostics.method, .message)]
pub struct BitcoinJsonRpcError {
    kind: FailureKind,
    stop: StopReason,
    message: String,
    executed: ExecutedVerdict,
    upstream: Map<String, Value>,
    diagnostics: CallDiagnostics,
    #[source]
    source: Option<BoxError>,
}

impl BitcoinJsonRpcError {
    /// Wrap the failure of the final attempt.
    pub fn from_failure(
        failure: RpcFailure,
        executed: ExecutedVerdict,
        stop: StopReason,
        diagnostics: CallDiagnostics,
    ) -> Self {
        let RpcFailure {
            kind,
            message,
            data,
            cause,
        } = failure;
        Self {
            kind,
            stop,
            message,
            executed,
            upstream: data,
            diagnostics,
            source: cause.map(|c| Box::new(c) as BoxError),
        }
    }

    /// The node answered but the payload did not match the expected shape.
    /// The request reached the node, so the verdict is always `Executed`.
    pub fn shape_mismatch(error: ShapeError, diagnostics: CallDiagnostics) -> Self {
        let mut upstream = Map::new();
        upstream.insert("result".into(), Value::String(error.payload.clone()));
        Self {
            kind: FailureKind::Shape,
            stop: StopReason::Unretryable,
            message: error.to_string(),
            executed: ExecutedVerdict::Executed,
            upstream,
            diagnostics,
            source: Some(Box::new(error)),
        }
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    pub fn stop_reason(&self) -> StopReason {
        self.stop
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn executed(&self) -> ExecutedVerdict {
        self.executed
    }

    pub fn diagnostics(&self) -> &CallDiagnostics {
        &self.diagnostics
    }

    pub fn method(&self) -> &str {
        &self.diagnostics.method
    }

    pub fn attempts_used(&self) -> u32 {
        self.diagnostics.attempts_used
    }

    /// Add an upstream diagnostic field. Existing fields are kept.
    pub fn with_data(mut self, key: impl Into<String>, value: Value) -> Self {
        self.upstream.entry(key.into()).or_insert(value);
        self
    }

    /// Full diagnostic bundle: upstream fields plus the call diagnostics.
    /// Fields set by inner layers win over outer ones on key collision.
    pub fn data(&self) -> Map<String, Value> {
        let mut data = self.upstream.clone();
        if let Ok(Value::Object(call)) = serde_json::to_value(&self.diagnostics) {
            for (key, value) in call {
                data.entry(key).or_insert(value);
            }
        }
        data
    }
}
