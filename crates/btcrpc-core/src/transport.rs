//! The `RpcTransport` trait: the I/O seam between the retry engine and a node.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;
use crate::request::JsonRpcRequest;

/// Sends one JSON-RPC envelope and returns the parsed response body.
///
/// The body is returned as-is: a JSON-RPC envelope object, a bare string
/// for nodes that answer with plaintext errors, or `Value::Null` when the
/// node sent nothing. Interpreting it is the response classifier's job.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` for use across Tokio tasks.
///
/// # Object Safety
/// The trait is object-safe and can be stored as `Arc<dyn RpcTransport>`.
#[async_trait]
pub trait RpcTransport: Send + Sync + 'static {
    /// Send a single JSON-RPC request.
    async fn send(&self, req: &JsonRpcRequest) -> Result<Value, TransportError>;

    /// Return the transport's identifier, safe to log.
    fn url(&self) -> &str;
}
