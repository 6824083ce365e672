// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The runtime decision function.

use std::future::Future;
use std::sync::Arc;

use axum::http::{header::COOKIE, request::Parts, HeaderMap, StatusCode};
use axum::response::Response;
use chrono::{DateTime, Utc};
use cookie::Cookie;

use super::config::{AuthzConfig, AuthzDomain};
use super::implementation::Implementation;
use super::policy::{verify_object, PolicyDecision, PolicyMatcher};
use super::response::{self, Unauthorized};
use super::session::SessionStore;
use super::strategy::{self, AuthnStrategy, Outcome};
use super::subject::UserProvider;

/// External collaborators consulted while deciding.
#[derive(Clone)]
pub struct Providers {
    pub users: Arc<dyn UserProvider>,
    pub sessions: Arc<dyn SessionStore>,
    pub policy: Arc<dyn PolicyMatcher>,
}

impl Providers {
    pub fn new(
        users: Arc<dyn UserProvider>,
        sessions: Arc<dyn SessionStore>,
        policy: Arc<dyn PolicyMatcher>,
    ) -> Self {
        Self {
            users,
            sessions,
            policy,
        }
    }
}

impl std::fmt::Debug for Providers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Providers").finish_non_exhaustive()
    }
}

/// Everything one decision needs. Lives for a single request.
pub struct RequestContext<'a> {
    parts: &'a Parts,
    domain: &'a AuthzDomain,
    providers: &'a Providers,
    now: DateTime<Utc>,
}

impl<'a> RequestContext<'a> {
    pub fn new(
        parts: &'a Parts,
        domain: &'a AuthzDomain,
        providers: &'a Providers,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            parts,
            domain,
            providers,
            now,
        }
    }

    /// Headers of the callback request.
    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    /// Domain the target host matched.
    pub fn domain(&self) -> &AuthzDomain {
        self.domain
    }

    pub fn providers(&self) -> &Providers {
        self.providers
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// First value of a callback query parameter.
    pub fn query(&self, name: &str) -> Option<String> {
        let query = self.parts.uri.query()?;

        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    /// Value of the named cookie, ignoring empty values.
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.parts
            .headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(Cookie::split_parse)
            .filter_map(Result::ok)
            .find(|cookie| cookie.name() == name && !cookie.value_trimmed().is_empty())
            .map(|cookie| cookie.value_trimmed().to_string())
    }
}

/// Configured authorization engine.
///
/// Immutable after [`AuthzBuilder::build`](super::AuthzBuilder::build) and
/// shared across requests behind an `Arc`.
#[derive(Debug)]
pub struct Authz {
    config: AuthzConfig,
    strategies: Vec<AuthnStrategy>,
    implementation: Implementation,
    providers: Providers,
}

impl Authz {
    pub(crate) fn new(
        config: AuthzConfig,
        strategies: Vec<AuthnStrategy>,
        implementation: Implementation,
        providers: Providers,
    ) -> Self {
        Self {
            config,
            strategies,
            implementation,
            providers,
        }
    }

    pub fn config(&self) -> &AuthzConfig {
        &self.config
    }

    pub fn strategies(&self) -> &[AuthnStrategy] {
        &self.strategies
    }

    pub fn implementation(&self) -> Implementation {
        self.implementation
    }

    /// Decide a callback request.
    ///
    /// `abort` is raced against the decision; when it resolves first the
    /// request is answered with a bare `401`.
    pub async fn handle<F>(&self, parts: &Parts, abort: F) -> Response
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            () = abort => {
                tracing::warn!(
                    implementation = %self.implementation,
                    "Authorization aborted before a decision, denying request"
                );
                response::bare(StatusCode::UNAUTHORIZED)
            }
            response = self.decide(parts) => response,
        }
    }

    async fn decide(&self, parts: &Parts) -> Response {
        let object = match self.implementation.extract_object(parts) {
            Ok(object) => object,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    code = e.error_code(),
                    implementation = %self.implementation,
                    "Unable to determine target of the request"
                );
                return response::bare(e.status_code());
            }
        };

        if !object.is_secure() {
            tracing::warn!(
                url = %object.url(),
                "Target is not served over a secure scheme, denying request"
            );
            return response::bare(StatusCode::UNAUTHORIZED);
        }

        let Some(domain) = self.config.domain_for(object.host()) else {
            tracing::warn!(
                host = object.host(),
                "Target host is not under a configured domain, denying request"
            );
            return response::bare(StatusCode::UNAUTHORIZED);
        };

        let policy = self.providers.policy.as_ref();

        let anonymous = verify_object(policy, None, &object).await;

        if anonymous == PolicyDecision::Public {
            tracing::debug!(url = %object.url(), method = %object.method(), "Public resource");
            return response::authorized(None);
        }

        let ctx = RequestContext::new(parts, domain, &self.providers, Utc::now());

        let subject = match strategy::authenticate(&self.strategies, &ctx).await {
            Outcome::Authenticated(subject) => subject,
            Outcome::Challenge(challenge) => {
                return self.implementation.respond_unauthorized(
                    &ctx,
                    &object,
                    Unauthorized::Challenge(challenge),
                );
            }
            Outcome::NotAuthenticated if anonymous == PolicyDecision::Forbidden => {
                tracing::info!(
                    url = %object.url(),
                    method = %object.method(),
                    "Access forbidden for anonymous request"
                );
                return response::forbidden();
            }
            Outcome::NotAuthenticated => {
                tracing::debug!(url = %object.url(), "Request is not authenticated");
                return self
                    .implementation
                    .respond_unauthorized(&ctx, &object, Unauthorized::Login);
            }
        };

        match verify_object(policy, Some(&subject), &object).await {
            PolicyDecision::Public | PolicyDecision::Allow => {
                tracing::debug!(
                    username = %subject.username,
                    url = %object.url(),
                    method = %object.method(),
                    "Access granted"
                );
                response::authorized(Some(&subject))
            }
            PolicyDecision::Deny => {
                tracing::info!(
                    username = %subject.username,
                    level = %subject.level,
                    url = %object.url(),
                    "Insufficient authentication level"
                );
                self.implementation
                    .respond_unauthorized(&ctx, &object, Unauthorized::Login)
            }
            PolicyDecision::Forbidden => {
                tracing::info!(
                    username = %subject.username,
                    url = %object.url(),
                    method = %object.method(),
                    "Access forbidden"
                );
                response::forbidden()
            }
        }
    }
}
