//! Shape validation: the pluggable check that a success payload has the
//! structure a method promises.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::response::summarize;

/// A payload did not match the expected shape.
#[derive(Debug, Clone, Error)]
#[error("Invalid response for {expected}: {reason} (got {payload})")]
pub struct ShapeError {
    pub expected: String,
    pub reason: String,
    /// Bounded rendering of the offending payload.
    pub payload: String,
}

impl ShapeError {
    pub fn new(expected: impl Into<String>, reason: impl Into<String>, payload: &Value) -> Self {
        Self {
            expected: expected.into(),
            reason: reason.into(),
            payload: summarize(payload),
        }
    }
}

/// Validates a raw success payload and converts it into a typed value.
pub trait ResponseShape: Send + Sync {
    type Output;

    fn validate(&self, payload: Value) -> Result<Self::Output, ShapeError>;
}

/// Shape described by a `serde` type: the payload must deserialize into `T`.
pub struct Typed<T>(PhantomData<fn() -> T>);

impl<T> Typed<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for Typed<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Typed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Typed<{}>", std::any::type_name::<T>())
    }
}

impl<T: DeserializeOwned> ResponseShape for Typed<T> {
    type Output = T;

    fn validate(&self, payload: Value) -> Result<T, ShapeError> {
        T::deserialize(&payload)
            .map_err(|e| ShapeError::new(std::any::type_name::<T>(), e.to_string(), &payload))
    }
}

/// Accepts any payload unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnyValue;

impl ResponseShape for AnyValue {
    type Output = Value;

    fn validate(&self, payload: Value) -> Result<Value, ShapeError> {
        Ok(payload)
    }
}

/// Shape given by a closure, for checks serde cannot express.
pub struct ShapeFn<F>(pub F);

impl<F, T> ResponseShape for ShapeFn<F>
where
    F: Fn(Value) -> Result<T, ShapeError> + Send + Sync,
{
    type Output = T;

    fn validate(&self, payload: Value) -> Result<T, ShapeError> {
        (self.0)(payload)
    }
}
