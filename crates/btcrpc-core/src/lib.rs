//! btcrpc-core: transport trait, failure classification and retry engine.
//!
//! # Overview
//!
//! BtcRPC is a typed client for Bitcoin Core compatible JSON-RPC nodes whose
//! retries never risk duplicating a side effect. The core crate defines:
//!
//! - [`RpcTransport`]: the async I/O seam every transport implements
//! - [`JsonRpcRequest`] / [`Params`]: wire types and positional params
//! - [`response`]: turns raw bodies into results or [`RpcFailure`]s
//! - [`policy`] module: effect classifier, purity registry, retry policy
//! - [`ResponseShape`]: pluggable validation of success payloads
//! - [`CallExecutor`]: the bounded retry loop
//! - [`BitcoinJsonRpcError`]: the terminal error, carrying an
//!   [`ExecutedVerdict`] and call diagnostics

pub mod error;
pub mod executor;
pub mod policy;
pub mod request;
pub mod response;
pub mod shape;
pub mod transport;

pub use error::{
    BitcoinJsonRpcError, CallDiagnostics, FailureKind, RpcFailure, StopReason, TransportError,
};
pub use executor::CallExecutor;
pub use policy::{ClassificationPolicy, ExecutedVerdict, PurityRegistry, RetryConfig, RetryPolicy};
pub use request::{JsonRpcRequest, Params, RpcId, RpcParam};
pub use shape::{AnyValue, ResponseShape, ShapeError, ShapeFn, Typed};
pub use transport::RpcTransport;
