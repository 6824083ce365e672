// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authenticated subjects and the user backend they are resolved from.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::ProviderError;

/// How strongly a subject has proven its identity.
///
/// Ordered so that `level >= AuthenticationLevel::OneFactor` reads naturally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthenticationLevel {
    /// Anonymous
    NotAuthenticated,
    /// Password (or equivalent single factor)
    OneFactor,
    /// Password plus a second factor
    TwoFactor,
}

impl Default for AuthenticationLevel {
    fn default() -> Self {
        AuthenticationLevel::NotAuthenticated
    }
}

impl std::fmt::Display for AuthenticationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthenticationLevel::NotAuthenticated => write!(f, "not_authenticated"),
            AuthenticationLevel::OneFactor => write!(f, "one_factor"),
            AuthenticationLevel::TwoFactor => write!(f, "two_factor"),
        }
    }
}

/// User attributes held by the user backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDetails {
    pub username: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub emails: Vec<String>,
}

/// Identity produced by an authentication strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    /// Canonical username
    pub username: String,
    pub display_name: String,
    pub groups: Vec<String>,
    pub emails: Vec<String>,
    /// Level reached by the credential that produced this subject
    pub level: AuthenticationLevel,
}

impl Subject {
    /// Create from backend details and the level of the presented credential.
    pub fn new(details: UserDetails, level: AuthenticationLevel) -> Self {
        Self {
            username: details.username,
            display_name: details.display_name,
            groups: details.groups,
            emails: details.emails,
            level,
        }
    }

    /// Check if the subject is a member of `group`.
    pub fn in_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }
}

/// Credential store consulted by header strategies and session revalidation.
#[async_trait]
pub trait UserProvider: Send + Sync {
    /// Check a username/password pair.
    ///
    /// Unknown users return `Ok(false)`; `Err` is reserved for backend failures.
    async fn check_password(&self, username: &str, password: &str) -> Result<bool, ProviderError>;

    /// Fetch the current details of a user.
    ///
    /// Returns [`ProviderError::UserNotFound`] when the user was removed.
    async fn details(&self, username: &str) -> Result<UserDetails, ProviderError>;
}
