//! Error types for the waiter pipeline.
//!
//! # Design
//! `WaiterError` is what every `combine` / `call` returns. Nothing in the
//! pipeline recovers locally, so each failure category keeps its own variant
//! and callers match on the one they care about. API bindings report their
//! domain failures through `ResponseError`, which records which API raised
//! it and the status code or embedded message.

use thiserror::Error;

/// Top-level error for every waiter operation.
#[derive(Debug, Error)]
pub enum WaiterError {
    /// The chef refused to encode the order. Accumulated state is kept.
    #[error("invalid waiter stack, the chef found errors in your order: {}", .errors.join("; "))]
    Request { errors: Vec<String> },

    /// No accept capability and no menu entry for this operand.
    #[error("waiter cannot combine with an operand of type {shape}")]
    Dispatch { shape: String },

    /// The response body was not valid JSON.
    #[error("response decoding failed: {0}")]
    Decode(#[from] serde_json::Error),

    /// The API reported a failure, by status code or inside the payload.
    #[error(transparent)]
    Response(#[from] ResponseError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Recipe(#[from] RecipeError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Domain failures raised by API-specific consumers.
#[derive(Debug, Error)]
pub enum ResponseError {
    /// The transport status is in the API's known-bad set; body not decoded.
    #[error("{api}: got a bad response - {status}")]
    BadStatus { api: String, status: u16 },

    /// The decoded payload carried the API's error field.
    #[error("{api}: bad request - {message}")]
    Embedded { api: String, message: String },
}

impl ResponseError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ResponseError::BadStatus { status, .. } => Some(*status),
            ResponseError::Embedded { .. } => None,
        }
    }

    pub fn api(&self) -> &str {
        match self {
            ResponseError::BadStatus { api, .. } | ResponseError::Embedded { api, .. } => api,
        }
    }
}

/// Connection-level failures. Propagated uncaught, never retried.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP transport failed: {0}")]
    Http(#[from] ureq::Error),

    #[error("transport error: {0}")]
    Other(String),
}

/// Failures while parsing recipe text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecipeError {
    /// A line without the `-` separating endpoint from method.
    #[error("malformed recipe line {line}: {content:?}")]
    MalformedLine { line: usize, content: String },

    #[error("unknown HTTP method: {0:?}")]
    UnknownMethod(String),

    /// Endpoints are stored without their format suffix.
    #[error("recipe endpoint {0:?} carries a format suffix")]
    SuffixedEndpoint(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}")]
    InvalidEnv { var: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_error_lists_every_issue() {
        let err = WaiterError::Request {
            errors: vec!["missing id".to_string(), "bad count".to_string()],
        };
        let display = err.to_string();
        assert!(display.contains("missing id"));
        assert!(display.contains("bad count"));
    }

    #[test]
    fn response_error_exposes_status() {
        let err = ResponseError::BadStatus {
            api: "twitter".to_string(),
            status: 503,
        };
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.api(), "twitter");
        assert_eq!(err.to_string(), "twitter: got a bad response - 503");

        let embedded = ResponseError::Embedded {
            api: "twitter".to_string(),
            message: "Not found".to_string(),
        };
        assert_eq!(embedded.status(), None);
    }

    #[test]
    fn response_error_converts_into_waiter_error() {
        let err: WaiterError = ResponseError::Embedded {
            api: "twitter".to_string(),
            message: "nope".to_string(),
        }
        .into();
        assert!(matches!(err, WaiterError::Response(_)));
        assert!(err.to_string().contains("nope"));
    }
}
