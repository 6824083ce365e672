// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session cookie strategy.
//!
//! The login portal establishes the session; this strategy only reads it and
//! periodically revalidates the identity against the user backend.

use super::Outcome;
use crate::authz::config::RefreshInterval;
use crate::authz::engine::RequestContext;
use crate::authz::error::ProviderError;
use crate::authz::session::UserSession;
use crate::authz::subject::Subject;

/// Session cookie scoped to the matched domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionCookieStrategy {
    refresh: RefreshInterval,
}

impl SessionCookieStrategy {
    pub fn new(refresh: RefreshInterval) -> Self {
        Self { refresh }
    }

    pub fn refresh(&self) -> RefreshInterval {
        self.refresh
    }

    pub(super) async fn authenticate(&self, ctx: &RequestContext<'_>) -> Outcome {
        let cookie_name = ctx.domain().cookie_name.as_str();
        let Some(session_id) = ctx.cookie(cookie_name) else {
            return Outcome::NotAuthenticated;
        };

        let sessions = &ctx.providers().sessions;

        let session = match sessions.get(&session_id).await {
            Ok(Some(session)) => session,
            Ok(None) => {
                tracing::debug!(cookie = cookie_name, "Session cookie references unknown session");
                return Outcome::NotAuthenticated;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load session");
                return Outcome::NotAuthenticated;
            }
        };

        if session.is_anonymous() {
            return Outcome::NotAuthenticated;
        }

        let Some(window) = self.refresh.window() else {
            return Outcome::Authenticated(Subject::new(session.details, session.level));
        };

        match sessions.claim_refresh(&session_id, window, ctx.now()).await {
            Ok(false) => Outcome::Authenticated(Subject::new(session.details, session.level)),
            Ok(true) => self.revalidate(ctx, &session_id, session).await,
            Err(e) => {
                tracing::error!(error = %e, "Failed to check session refresh");
                Outcome::NotAuthenticated
            }
        }
    }

    /// Re-read the user from the backend after a successful refresh claim.
    async fn revalidate(
        &self,
        ctx: &RequestContext<'_>,
        session_id: &str,
        session: UserSession,
    ) -> Outcome {
        let providers = ctx.providers();
        let username = session.details.username.as_str();

        let details = match providers.users.details(username).await {
            Ok(details) => details,
            Err(ProviderError::UserNotFound(_)) => {
                tracing::info!(username = %username, "User no longer exists, destroying session");
                if let Err(e) = providers.sessions.destroy(session_id).await {
                    tracing::error!(error = %e, username = %username, "Failed to destroy session");
                }
                return Outcome::NotAuthenticated;
            }
            Err(e) => {
                tracing::error!(error = %e, username = %username, "Session revalidation failed");
                return Outcome::NotAuthenticated;
            }
        };

        if details != session.details {
            tracing::debug!(username = %username, "User details changed, updating session");
            if let Err(e) = providers
                .sessions
                .update_details(session_id, details.clone())
                .await
            {
                tracing::warn!(error = %e, username = %username, "Failed to update session details");
            }
        }

        Outcome::Authenticated(Subject::new(details, session.level))
    }
}
