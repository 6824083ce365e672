// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Invalid or unreadable configuration. Fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid refresh interval '{value}': {reason}")]
    InvalidRefreshInterval { value: String, reason: String },

    #[error("invalid request timeout '{value}': {reason}")]
    InvalidRequestTimeout { value: String, reason: String },

    #[error("invalid portal URL '{value}' for domain '{domain}': {reason}")]
    InvalidPortalUrl {
        domain: String,
        value: String,
        reason: String,
    },

    #[error("at least one session domain must be configured")]
    MissingSessionDomain,

    #[error("invalid bind address '{value}': {reason}")]
    InvalidBindAddress { value: String, reason: String },

    #[error("invalid value for {name}: {reason}")]
    InvalidEnv { name: &'static str, reason: String },

    #[error("failed to read configuration file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse configuration file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("user '{0}' has an invalid password digest, expected 64 hex characters")]
    InvalidPasswordDigest(String),

    #[error("access control rule #{index} is invalid: {reason}")]
    InvalidAccessRule { index: usize, reason: String },

    #[error("endpoint '{0}' is configured more than once")]
    DuplicateEndpoint(String),
}

/// JSON error returned by the HTTP surface for requests that never reach the engine.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn config_errors_name_the_offending_value() {
        let err = ConfigError::InvalidPortalUrl {
            domain: "example.com".to_string(),
            value: "nope".to_string(),
            reason: "relative URL without a base".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid portal URL 'nope' for domain 'example.com': relative URL without a base"
        );

        let err = ConfigError::InvalidEnv {
            name: "PORT",
            reason: "number too large to fit in target type".to_string(),
        };
        assert!(err.to_string().starts_with("invalid value for PORT"));
    }

    #[test]
    fn read_error_includes_path() {
        let err = ConfigError::Read {
            path: PathBuf::from("/etc/authz.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(err.to_string(), "failed to read configuration file /etc/authz.json: missing");
    }

    #[tokio::test]
    async fn api_error_returns_json_body() {
        let response = ApiError::not_found("unknown endpoint").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body_bytes.to_vec()).unwrap();
        assert_eq!(body, r#"{"error":"unknown endpoint"}"#);
    }
}
