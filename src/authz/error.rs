// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authorization errors.
//!
//! Neither type ever escapes the engine: provider failures are logged and
//! turned into a denial, transport failures into a `400 Bad Request`.

use axum::http::StatusCode;

/// Failure reported by an external collaborator.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The user no longer exists in the backend
    #[error("user '{0}' does not exist")]
    UserNotFound(String),
    /// The session referenced by a cookie no longer exists
    #[error("session does not exist")]
    SessionNotFound,
    /// The session store could not be reached or is corrupted
    #[error("session store unavailable: {0}")]
    SessionStore(String),
    /// The user backend could not be reached
    #[error("user backend unavailable: {0}")]
    UserBackend(String),
    /// The policy matcher failed to evaluate the request
    #[error("policy evaluation failed: {0}")]
    Policy(String),
}

/// The proxy did not provide enough information to rebuild the target.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// A required header is absent or empty
    #[error("missing required header '{0}'")]
    MissingHeader(&'static str),
    /// A header contains bytes that are not visible ASCII
    #[error("header '{0}' contains invalid characters")]
    InvalidHeader(&'static str),
    /// The method header is not an HTTP method
    #[error("invalid request method '{0}'")]
    InvalidMethod(String),
    /// The reconstructed target URL does not parse
    #[error("invalid target URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl TransportError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            TransportError::MissingHeader(_) => "missing_header",
            TransportError::InvalidHeader(_) => "invalid_header",
            TransportError::InvalidMethod(_) => "invalid_method",
            TransportError::InvalidUrl { .. } => "invalid_url",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_are_bad_requests() {
        let err = TransportError::MissingHeader("x-forwarded-host");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "missing_header");
        assert_eq!(err.to_string(), "missing required header 'x-forwarded-host'");
    }

    #[test]
    fn invalid_url_display() {
        let err = TransportError::InvalidUrl {
            url: "https://".to_string(),
            reason: "empty host".to_string(),
        };
        assert_eq!(err.to_string(), "invalid target URL 'https://': empty host");
        assert_eq!(err.error_code(), "invalid_url");
    }

    #[test]
    fn provider_error_display() {
        assert_eq!(
            ProviderError::UserNotFound("john".to_string()).to_string(),
            "user 'john' does not exist"
        );
    }
}
