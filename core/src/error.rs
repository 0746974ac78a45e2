//! Error types for the mailer API gateway.
//!
//! # Design
//! `Transport` means no response was received at all. Every non-2xx response
//! lands in `Http`, carrying the raw status and body plus the envelope's
//! `message` field when the body had one. A 2xx with an unusable body is not
//! an error; the gateway treats it as an empty payload.

use thiserror::Error;

/// Failure to obtain any response from the remote API.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// Connection refused, DNS failure, TLS failure, timeout or broken I/O.
    #[error("network error: {0}")]
    Network(String),

    /// The blocking worker executing the request panicked or was cancelled.
    #[error("transport worker failed: {0}")]
    Worker(String),
}

/// Errors returned by the gateway for a single call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {}", message.as_deref().unwrap_or(body))]
    Http {
        status: u16,
        message: Option<String>,
        body: String,
    },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The normalized payload did not match the caller's expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

impl ApiError {
    /// Build an `Http` error from a non-2xx response body, lifting the
    /// envelope's `message` field when present.
    pub fn from_status(status: u16, body: String) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|value| {
                value
                    .get("message")
                    .and_then(|m| m.as_str())
                    .filter(|m| !m.is_empty())
                    .map(str::to_string)
            });
        ApiError::Http {
            status,
            message,
            body,
        }
    }

    /// Text shown to the user for this failure: the envelope message when the
    /// server sent one, otherwise the error's own description.
    pub fn display_message(&self) -> String {
        match self {
            ApiError::Http {
                message: Some(message),
                ..
            } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors raised while assembling a `ClientConfig`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("credential store {path}: {message}")]
    Store { path: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_message_is_lifted() {
        let err = ApiError::from_status(500, r#"{"message":"db down"}"#.to_string());
        assert_eq!(err.display_message(), "db down");
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn non_json_body_falls_back_to_description() {
        let err = ApiError::from_status(502, "Bad Gateway".to_string());
        assert!(matches!(err, ApiError::Http { message: None, .. }));
        assert_eq!(err.display_message(), "HTTP 502: Bad Gateway");
    }

    #[test]
    fn non_string_message_is_ignored() {
        let err = ApiError::from_status(400, r#"{"message":{"field":"name"}}"#.to_string());
        assert!(matches!(err, ApiError::Http { message: None, .. }));
    }

    #[test]
    fn empty_message_falls_back_to_description() {
        let err = ApiError::from_status(500, r#"{"message":""}"#.to_string());
        assert!(matches!(err, ApiError::Http { message: None, .. }));
        assert_eq!(err.display_message(), r#"HTTP 500: {"message":""}"#);
    }

    #[test]
    fn transport_error_describes_itself() {
        let err = ApiError::from(TransportError::Network("connection refused".to_string()));
        assert_eq!(err.display_message(), "network error: connection refused");
        assert_eq!(err.status(), None);
    }
}
