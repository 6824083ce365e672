// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication strategies.
//!
//! The set is closed: every way a request can authenticate is a variant of
//! [`AuthnStrategy`], so the authentication path can be audited statically.

mod cookie;
mod header;

use axum::http::{header::PROXY_AUTHENTICATE, header::WWW_AUTHENTICATE, HeaderName, StatusCode};

pub use cookie::SessionCookieStrategy;
pub use header::{CredentialHeader, HeaderStrategy, LegacyHeaderStrategy};

use super::config::RefreshInterval;
use super::engine::RequestContext;
use super::subject::Subject;

/// Immediate unauthorized answer demanding new credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Challenge {
    pub status: StatusCode,
}

impl Challenge {
    pub fn new(status: StatusCode) -> Self {
        Self { status }
    }

    /// `Proxy-Authenticate` for 407, `WWW-Authenticate` otherwise.
    pub fn authenticate_header(&self) -> HeaderName {
        if self.status == StatusCode::PROXY_AUTHENTICATION_REQUIRED {
            PROXY_AUTHENTICATE
        } else {
            WWW_AUTHENTICATE
        }
    }
}

/// Result of one strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Authenticated(Subject),
    NotAuthenticated,
    Challenge(Challenge),
}

/// A pluggable per-request authenticator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthnStrategy {
    SessionCookie(SessionCookieStrategy),
    Header(HeaderStrategy),
    LegacyHeader(LegacyHeaderStrategy),
}

impl AuthnStrategy {
    /// Session cookie with the given revalidation policy.
    pub fn session_cookie(refresh: RefreshInterval) -> Self {
        AuthnStrategy::SessionCookie(SessionCookieStrategy::new(refresh))
    }

    /// `Authorization` header, challenging with 401.
    pub fn authorization_header() -> Self {
        AuthnStrategy::Header(HeaderStrategy::authorization())
    }

    /// `Proxy-Authorization` header, without challenge.
    pub fn proxy_authorization_header() -> Self {
        AuthnStrategy::Header(HeaderStrategy::proxy_authorization())
    }

    /// Legacy combined header selected by the `auth` query parameter.
    pub fn legacy_header() -> Self {
        AuthnStrategy::LegacyHeader(LegacyHeaderStrategy)
    }

    /// Try to authenticate the request.
    pub async fn authenticate(&self, ctx: &RequestContext<'_>) -> Outcome {
        match self {
            AuthnStrategy::SessionCookie(strategy) => strategy.authenticate(ctx).await,
            AuthnStrategy::Header(strategy) => strategy.authenticate(ctx).await,
            AuthnStrategy::LegacyHeader(strategy) => strategy.authenticate(ctx).await,
        }
    }

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            AuthnStrategy::SessionCookie(_) => "cookie-session",
            AuthnStrategy::Header(strategy) => match strategy.header() {
                CredentialHeader::Authorization => "header-authorization",
                CredentialHeader::ProxyAuthorization => "header-proxy-authorization",
            },
            AuthnStrategy::LegacyHeader(_) => "header-legacy-combined",
        }
    }
}

/// Run strategies in order.
///
/// The first `Authenticated` or `Challenge` ends the chain; later strategies
/// are never consulted. Exhaustion yields `NotAuthenticated`.
pub async fn authenticate(strategies: &[AuthnStrategy], ctx: &RequestContext<'_>) -> Outcome {
    for strategy in strategies {
        match strategy.authenticate(ctx).await {
            Outcome::NotAuthenticated => {
                tracing::trace!(strategy = strategy.name(), "Strategy did not authenticate");
            }
            decided => {
                tracing::debug!(strategy = strategy.name(), "Strategy decided authentication");
                return decided;
            }
        }
    }

    Outcome::NotAuthenticated
}
