// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Proxy integrations.
//!
//! Each [`Implementation`] pairs how the target object is read from the
//! proxy's headers with how an unauthorized request is answered.
//!
//! | Implementation | Target headers | Unauthorized |
//! |---|---|---|
//! | `Legacy` | `X-Original-URL`, else `X-Forwarded-*` | portal redirect |
//! | `ForwardAuth` | `X-Forwarded-Method/Proto/Host/URI` | portal redirect |
//! | `AuthRequest` | `X-Original-URL`, `X-Original-Method` | bare `401` |

use axum::http::{request::Parts, StatusCode};
use axum::response::Response;

use super::engine::RequestContext;
use super::error::TransportError;
use super::object::{self, Object};
use super::response::{self, Unauthorized};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Implementation {
    /// Mix of the other two; works with most proxies
    #[default]
    Legacy,
    /// Traefik, Caddy, Skipper
    ForwardAuth,
    /// NGINX `auth_request`
    AuthRequest,
}

impl Implementation {
    /// Look up by name, case-insensitively. Unknown names select `Legacy`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "forwardauth" => Implementation::ForwardAuth,
            "authrequest" => Implementation::AuthRequest,
            _ => Implementation::Legacy,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Implementation::Legacy => "legacy",
            Implementation::ForwardAuth => "forwardauth",
            Implementation::AuthRequest => "authrequest",
        }
    }

    /// Rebuild the target of the proxied request.
    pub fn extract_object(&self, parts: &Parts) -> Result<Object, TransportError> {
        match self {
            Implementation::Legacy => object::from_legacy_headers(&parts.headers),
            Implementation::ForwardAuth => object::from_forwarded_headers(&parts.headers),
            Implementation::AuthRequest => object::from_original_headers(&parts.headers),
        }
    }

    /// Answer a request that may not proceed.
    pub fn respond_unauthorized(
        &self,
        ctx: &RequestContext<'_>,
        object: &Object,
        reason: Unauthorized,
    ) -> Response {
        match (self, reason) {
            (_, Unauthorized::Challenge(challenge)) => response::challenge(&challenge),
            (Implementation::AuthRequest, Unauthorized::Login) => {
                response::bare(StatusCode::UNAUTHORIZED)
            }
            (Implementation::Legacy | Implementation::ForwardAuth, Unauthorized::Login) => {
                response::portal_redirect(ctx, object)
            }
        }
    }
}

impl std::fmt::Display for Implementation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
