//! JSON-RPC 2.0 wire types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JSON-RPC request ID: string, number, or null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcId {
    Number(u64),
    String(String),
    Null,
}

impl std::fmt::Display for RpcId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Null => write!(f, "null"),
        }
    }
}

/// A single positional JSON-RPC parameter value.
pub type RpcParam = Value;

/// A JSON-RPC 2.0 request.
///
/// Built once per logical call and resent unchanged on every attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: RpcId,
    pub method: String,
    pub params: Vec<RpcParam>,
}

impl JsonRpcRequest {
    /// Create a new JSON-RPC 2.0 request.
    pub fn new(id: u64, method: impl Into<String>, params: Vec<RpcParam>) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id: RpcId::Number(id),
            method: method.into(),
            params,
        }
    }
}

/// Positional parameter builder.
///
/// Optional arguments left unset become `null` ("use the node default")
/// when a later argument is set, and are dropped entirely when trailing.
#[derive(Debug, Default, Clone)]
pub struct Params {
    values: Vec<Option<RpcParam>>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a required argument.
    pub fn arg(mut self, value: impl Into<RpcParam>) -> Self {
        self.values.push(Some(value.into()));
        self
    }

    /// Append an optional argument.
    pub fn opt<T: Into<RpcParam>>(mut self, value: Option<T>) -> Self {
        self.values.push(value.map(Into::into));
        self
    }

    pub fn build(mut self) -> Vec<RpcParam> {
        while matches!(self.values.last(), Some(None)) {
            self.values.pop();
        }
        self.values
            .into_iter()
            .map(|v| v.unwrap_or(Value::Null))
            .collect()
    }
}
