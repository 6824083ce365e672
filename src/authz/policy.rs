// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Object verification against the access-control policy.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::ProviderError;
use super::object::Object;
use super::subject::{AuthenticationLevel, Subject};

/// Level of authentication a policy rule demands for an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredLevel {
    /// Public resource, no authentication at all
    Bypass,
    OneFactor,
    TwoFactor,
    /// Nobody is allowed
    #[serde(alias = "deny")]
    Denied,
}

impl Default for RequiredLevel {
    /// Default policy is deny (least privilege).
    fn default() -> Self {
        RequiredLevel::Denied
    }
}

/// Result of matching a subject/object pair against the rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyMatch {
    pub level: RequiredLevel,
    /// Whether a rule with subject criteria was involved in the match.
    ///
    /// An anonymous request that skipped such a rule cannot yet be told it is
    /// forbidden: logging in might make a different rule apply.
    pub has_subject: bool,
}

impl PolicyMatch {
    pub fn new(level: RequiredLevel) -> Self {
        Self {
            level,
            has_subject: false,
        }
    }
}

/// Outcome of object verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDecision {
    /// Public object, allowed for anyone
    Public,
    /// Subject satisfies the policy
    Allow,
    /// Subject must (re-)authenticate
    Deny,
    /// Subject is known and will never be allowed
    Forbidden,
}

/// External access-control policy matcher.
#[async_trait]
pub trait PolicyMatcher: Send + Sync {
    /// Find the level required for `subject` (`None` = anonymous) to reach `object`.
    async fn required_level(
        &self,
        subject: Option<&Subject>,
        object: &Object,
    ) -> Result<PolicyMatch, ProviderError>;
}

/// Compare the level a subject reached with what the matched rule requires.
pub fn decide(level: AuthenticationLevel, matched: PolicyMatch) -> PolicyDecision {
    match matched.level {
        RequiredLevel::Bypass => PolicyDecision::Public,
        RequiredLevel::Denied
            if level != AuthenticationLevel::NotAuthenticated || !matched.has_subject =>
        {
            PolicyDecision::Forbidden
        }
        RequiredLevel::OneFactor if level >= AuthenticationLevel::OneFactor => PolicyDecision::Allow,
        RequiredLevel::TwoFactor if level >= AuthenticationLevel::TwoFactor => PolicyDecision::Allow,
        _ => PolicyDecision::Deny,
    }
}

/// Standard object verification shared by every proxy integration.
///
/// Matcher failures deny.
pub async fn verify_object(
    policy: &dyn PolicyMatcher,
    subject: Option<&Subject>,
    object: &Object,
) -> PolicyDecision {
    let level = subject.map_or(AuthenticationLevel::NotAuthenticated, |s| s.level);

    match policy.required_level(subject, object).await {
        Ok(matched) => decide(level, matched),
        Err(e) => {
            tracing::error!(
                error = %e,
                url = %object.url(),
                method = %object.method(),
                "Policy evaluation failed, denying request"
            );
            PolicyDecision::Deny
        }
    }
}
