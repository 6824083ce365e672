// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Immutable engine configuration: trusted domains and session refresh policy.

use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

/// Session cookie name used when a domain does not configure one.
pub const DEFAULT_SESSION_COOKIE_NAME: &str = "authz_session";

/// How often a session's identity is revalidated against the user backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshInterval {
    /// Identity is validated when the session is created and never again
    #[default]
    Disabled,
    /// Revalidate on every request
    Always,
    /// Revalidate once the last validation is at least this old
    Every(Duration),
}

impl RefreshInterval {
    pub const DISABLED: &'static str = "disabled";
    pub const ALWAYS: &'static str = "always";

    /// Parse `disabled`, `always`, or a duration literal (`90s`, `5m`, `1h`, bare seconds).
    ///
    /// A zero duration is the same as `always`.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        let trimmed = value.trim();

        match trimmed.to_ascii_lowercase().as_str() {
            Self::DISABLED => return Ok(Self::Disabled),
            Self::ALWAYS => return Ok(Self::Always),
            _ => {}
        }

        let duration =
            parse_duration(trimmed).map_err(|reason| ConfigError::InvalidRefreshInterval {
                value: value.to_string(),
                reason,
            })?;

        if duration.is_zero() {
            Ok(Self::Always)
        } else {
            Ok(Self::Every(duration))
        }
    }

    /// Minimum age of the last validation before revalidating, `None` when disabled.
    pub fn window(&self) -> Option<Duration> {
        match self {
            RefreshInterval::Disabled => None,
            RefreshInterval::Always => Some(Duration::ZERO),
            RefreshInterval::Every(duration) => Some(*duration),
        }
    }
}

impl std::fmt::Display for RefreshInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefreshInterval::Disabled => write!(f, "{}", Self::DISABLED),
            RefreshInterval::Always => write!(f, "{}", Self::ALWAYS),
            RefreshInterval::Every(duration) => {
                write!(f, "{}", humantime::format_duration(*duration))
            }
        }
    }
}

/// Parse a duration literal. Bare integers are seconds.
pub(crate) fn parse_duration(value: &str) -> Result<Duration, String> {
    let value = value.trim();

    if value.is_empty() {
        return Err("empty duration".to_string());
    }

    if value.bytes().all(|b| b.is_ascii_digit()) {
        return value
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| e.to_string());
    }

    humantime::parse_duration(value).map_err(|e| e.to_string())
}

/// A trusted domain and where its users log in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthzDomain {
    /// Domain pattern; a leading `.` matches strict subdomains only
    pub name: String,
    /// Login portal for this domain
    pub portal_url: Option<Url>,
    /// Session cookie scoped to this domain
    pub cookie_name: String,
}

impl AuthzDomain {
    /// Create the suffix pattern `.domain` for a session domain.
    pub fn new(domain: &str) -> Self {
        Self {
            name: format!(".{}", domain.trim().trim_start_matches('.').to_ascii_lowercase()),
            portal_url: None,
            cookie_name: DEFAULT_SESSION_COOKIE_NAME.to_string(),
        }
    }

    /// Set the portal URL.
    pub fn with_portal_url(mut self, portal_url: Url) -> Self {
        self.portal_url = Some(portal_url);
        self
    }

    /// Set the session cookie name.
    pub fn with_cookie_name(mut self, cookie_name: impl Into<String>) -> Self {
        self.cookie_name = cookie_name.into();
        self
    }

    /// Check whether `host` (without port) falls under this domain.
    ///
    /// `.example.com` matches `login.example.com` and `a.b.example.com`,
    /// but neither `example.com` nor `notexample.com`.
    pub fn matches(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();

        if self.name.starts_with('.') {
            host.len() > self.name.len() && host.ends_with(&self.name)
        } else {
            host == self.name
        }
    }
}

/// Engine configuration. Built once at startup, never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthzConfig {
    pub refresh_interval: RefreshInterval,
    pub domains: Vec<AuthzDomain>,
}

impl AuthzConfig {
    /// First domain whose pattern matches `host`.
    pub fn domain_for(&self, host: &str) -> Option<&AuthzDomain> {
        self.domains.iter().find(|domain| domain.matches(host))
    }
}
