// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session store seam used by the cookie strategy.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::ProviderError;
use super::subject::{AuthenticationLevel, UserDetails};

/// Session state written by the login portal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    pub details: UserDetails,
    pub level: AuthenticationLevel,
    /// Last time the identity was checked against the user backend
    pub last_validated_at: DateTime<Utc>,
}

impl UserSession {
    pub fn new(details: UserDetails, level: AuthenticationLevel, now: DateTime<Utc>) -> Self {
        Self {
            details,
            level,
            last_validated_at: now,
        }
    }

    /// Anonymous sessions carry a cookie but no identity.
    pub fn is_anonymous(&self) -> bool {
        self.level == AuthenticationLevel::NotAuthenticated || self.details.username.is_empty()
    }
}

/// Storage owning session state, including the revalidation timestamp.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load a session by id, `None` when unknown.
    async fn get(&self, id: &str) -> Result<Option<UserSession>, ProviderError>;

    /// Decide whether the caller must revalidate the session.
    ///
    /// Must atomically compare `now - last_validated_at` with `window` and, when
    /// it has elapsed, stamp `last_validated_at = now` before returning `true`.
    /// Concurrent callers for the same session see at most one `true` per window.
    /// A zero window always returns `true`.
    async fn claim_refresh(
        &self,
        id: &str,
        window: Duration,
        now: DateTime<Utc>,
    ) -> Result<bool, ProviderError>;

    /// Replace the user details held by a session.
    async fn update_details(&self, id: &str, details: UserDetails) -> Result<(), ProviderError>;

    /// Remove a session.
    async fn destroy(&self, id: &str) -> Result<(), ProviderError>;
}
