//! Client error types.
//!
//! [`ApiError`] describes what went wrong on the wire. [`ResourceError`] is
//! what callers see: a fixed, operation-specific message in the display
//! language, with the underlying cause logged instead of carried along.

use std::sync::Arc;

/// Low-level failures from the shared HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Transport(Arc<reqwest::Error>),

    /// Non-success HTTP status.
    #[error("HTTP error: {status}")]
    Status { status: u16 },

    /// Response body did not match the expected shape.
    #[error("parse error: {0}")]
    Decode(String),

    /// A lookup service answered with its not-found sentinel.
    #[error("not found: {0}")]
    NotFound(String),

    /// Endpoint URL could not be built.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { ApiError::Timeout } else { ApiError::Transport(Arc::new(err)) }
    }
}

/// Failure category of a [`ResourceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network failure or timeout.
    Transport,
    /// Non-success HTTP status.
    Status,
    /// Unexpected response body.
    Decode,
    /// Lookup returned "not found".
    NotFound,
    /// Caller supplied input the request cannot be built from.
    InvalidInput,
}

impl From<&ApiError> for ErrorKind {
    fn from(err: &ApiError) -> Self {
        match err {
            ApiError::Timeout | ApiError::Transport(_) => ErrorKind::Transport,
            ApiError::Status { .. } => ErrorKind::Status,
            ApiError::Decode(_) => ErrorKind::Decode,
            ApiError::NotFound(_) => ErrorKind::NotFound,
            ApiError::InvalidUrl(_) => ErrorKind::InvalidInput,
        }
    }
}

/// User-facing failure of a fetch function.
///
/// `Display` is exactly the static message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ResourceError {
    kind: ErrorKind,
    message: &'static str,
}

impl ResourceError {
    pub fn new(kind: ErrorKind, message: &'static str) -> Self {
        Self { kind, message }
    }

    /// Wrap `cause` behind `message`, logging the cause.
    pub fn from_api(message: &'static str, cause: ApiError) -> Self {
        tracing::error!(error = %cause, "{message}");
        Self { kind: ErrorKind::from(&cause), message }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &'static str {
        self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_static_message() {
        let err = ResourceError::from_api("Ocorreu um erro ao buscar os bancos.", ApiError::Status { status: 502 });
        assert_eq!(err.to_string(), "Ocorreu um erro ao buscar os bancos.");
        assert_eq!(err.kind(), ErrorKind::Status);
    }

    #[test]
    fn test_cause_not_in_display() {
        let err = ResourceError::from_api("Falhou.", ApiError::Decode("expected `uf` at line 1".into()));
        assert!(!err.to_string().contains("uf"));
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_api_error_kinds() {
        assert_eq!(ErrorKind::from(&ApiError::Timeout), ErrorKind::Transport);
        assert_eq!(ErrorKind::from(&ApiError::NotFound("cep".into())), ErrorKind::NotFound);
        assert_eq!(ErrorKind::from(&ApiError::InvalidUrl("x".into())), ErrorKind::InvalidInput);
    }
}
