//! Response classifier: turns a raw transport outcome into a success payload
//! or a normalized [`RpcFailure`].
//!
//! Resolution order for a body:
//! 1. nothing (`null`, or an error without body) → `data is undefined`
//! 2. bare string → the string is the error message (plaintext node errors)
//! 3. object with non-null `error` → `error.message`, else the whole body
//! 4. object without a `result` key → `Result missing from <payload>`
//! 5. otherwise → `result`

use serde_json::{Map, Value};

use crate::error::{FailureKind, RpcFailure, TransportError};

/// Cap applied to messages taken from untrusted bodies and to log summaries.
pub const MAX_MESSAGE_LEN: usize = 200;

/// Truncate to [`MAX_MESSAGE_LEN`] characters on a char boundary.
pub fn truncate_message(message: &str) -> String {
    match message.char_indices().nth(MAX_MESSAGE_LEN) {
        Some((idx, _)) => message[..idx].to_string(),
        None => message.to_string(),
    }
}

/// Short, bounded rendering of a JSON value for messages and logs.
pub fn summarize(value: &Value) -> String {
    truncate_message(&value.to_string())
}

/// Classify one attempt's outcome.
pub fn classify(outcome: Result<Value, TransportError>) -> Result<Value, RpcFailure> {
    match outcome {
        Ok(body) => classify_body(body),
        Err(TransportError::Status {
            status,
            body: Some(body),
        }) => classify_body(body).map_err(|failure| {
            failure.caused_by(TransportError::Status { status, body: None })
        }),
        Err(err @ TransportError::Status { body: None, .. }) => Err(undefined(err)),
        Err(err) => Err(RpcFailure::new(FailureKind::Transport, err.to_string()).caused_by(err)),
    }
}

fn undefined(cause: TransportError) -> RpcFailure {
    RpcFailure::new(FailureKind::Protocol, "data is undefined").caused_by(cause)
}

fn classify_body(body: Value) -> Result<Value, RpcFailure> {
    match body {
        Value::Null => Err(RpcFailure::new(FailureKind::Protocol, "data is undefined")),
        Value::String(text) => Err(RpcFailure::new(
            FailureKind::Protocol,
            truncate_message(&text),
        )
        .with_data("jsonRpcResponse", Value::String(text))),
        Value::Object(mut envelope) => {
            let error = envelope.remove("error").filter(|e| !e.is_null());
            match error {
                Some(error) => Err(protocol_error(envelope, error)),
                None => match envelope.remove("result") {
                    Some(result) => Ok(result),
                    None => Err(result_missing(&Value::Object(envelope))),
                },
            }
        }
        other => Err(result_missing(&other)),
    }
}

fn protocol_error(mut envelope: Map<String, Value>, error: Value) -> RpcFailure {
    let message = error.get("message").and_then(Value::as_str).map(str::to_owned);
    let code = error.get("code").cloned();
    envelope.insert("error".into(), error);
    let body = Value::Object(envelope);

    let message = message.unwrap_or_else(|| body.to_string());
    let mut failure =
        RpcFailure::new(FailureKind::Protocol, message).with_data("jsonRpcResponse", body);
    if let Some(code) = code {
        failure = failure.with_data("errorCode", code);
    }
    failure
}

fn result_missing(payload: &Value) -> RpcFailure {
    RpcFailure::new(
        FailureKind::Protocol,
        format!("Result missing from {}", summarize(payload)),
    )
    .with_data("jsonRpcResponse", payload.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn result_is_returned() {
        let body = json!({"result": 812345, "error": null, "id": 1});
        assert_eq!(classify(Ok(body)).unwrap(), json!(812345));
    }

    #[test]
    fn null_result_is_success() {
        let body = json!({"result": null, "error": null, "id": 1});
        assert_eq!(classify(Ok(body)).unwrap(), Value::Null);
    }

    #[test]
    fn error_message_is_extracted() {
        let body = json!({
            "result": null,
            "error": {"code": -6, "message": "Insufficient funds"},
            "id": 1
        });
        let failure = classify(Ok(body)).unwrap_err();
        assert_eq!(failure.kind, FailureKind::Protocol);
        assert_eq!(failure.message, "Insufficient funds");
        assert_eq!(failure.data["errorCode"], json!(-6));
        assert_eq!(
            failure.data["jsonRpcResponse"]["error"]["message"],
            json!("Insufficient funds")
        );
    }

    #[test]
    fn error_without_message_stringifies_body() {
        let body = json!({"error": {"code": -1}, "id": 1});
        let failure = classify(Ok(body)).unwrap_err();
        assert!(failure.message.contains("\"code\":-1"), "{}", failure.message);
    }

    #[test]
    fn bare_string_is_the_message() {
        let failure = classify(Ok(json!("Work queue depth exceeded"))).unwrap_err();
        assert_eq!(failure.message, "Work queue depth exceeded");
    }

    #[test]
    fn bare_string_is_truncated() {
        let long = "x".repeat(MAX_MESSAGE_LEN * 2);
        let failure = classify(Ok(Value::String(long))).unwrap_err();
        assert_eq!(failure.message.chars().count(), MAX_MESSAGE_LEN);
    }

    #[test]
    fn missing_result_is_a_failure() {
        let failure = classify(Ok(json!({"id": 1}))).unwrap_err();
        assert!(failure.message.starts_with("Result missing from "));
    }

    #[test]
    fn status_error_body_is_classified() {
        let outcome = Err(TransportError::Status {
            status: 500,
            body: Some(json!({"error": {"code": -5, "message": "Invalid or non-wallet transaction id"}})),
        });
        let failure = classify(outcome).unwrap_err();
        assert_eq!(failure.message, "Invalid or non-wallet transaction id");
        assert!(matches!(failure.cause, Some(TransportError::Status { status: 500, .. })));
    }

    #[test]
    fn missing_body_keeps_cause() {
        let outcome = Err(TransportError::Status { status: 502, body: None });
        let failure = classify(outcome).unwrap_err();
        assert_eq!(failure.message, "data is undefined");
        assert!(failure.cause.is_some());
    }

    #[test]
    fn connection_refused_is_transport_failure() {
        let outcome = Err(TransportError::ConnectionRefused {
            endpoint: "127.0.0.1:8332".into(),
        });
        let failure = classify(outcome).unwrap_err();
        assert_eq!(failure.kind, FailureKind::Transport);
        assert!(failure.message.contains("ECONNREFUSED"));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let s = "é".repeat(MAX_MESSAGE_LEN + 5);
        assert_eq!(truncate_message(&s).chars().count(), MAX_MESSAGE_LEN);
    }
}
