// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from an optional JSON file and then overridden by
//! environment variables. It is validated once at startup; every error is
//! fatal.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `AUTHZ_CONFIG_FILE` | JSON configuration file | Unset |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `9091` |
//! | `SESSION_DOMAIN` | Comma-separated session domains | Required without a file |
//! | `SESSION_COOKIE_NAME` | Session cookie name | `authz_session` |
//! | `PORTAL_URL` | Login portal for every session domain | Unset |
//! | `REFRESH_INTERVAL` | `disabled`, `always` or a duration (`5m`) | `5m` |
//! | `REQUEST_TIMEOUT` | Deadline for one authorization decision | `10s` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//!
//! Users and access control rules can only be provided by the file.

use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::authz::builder::{STRATEGY_COOKIE_SESSION, STRATEGY_HEADER_PROXY_AUTHORIZATION};
use crate::authz::config::{parse_duration, RefreshInterval, DEFAULT_SESSION_COOKIE_NAME};
use crate::authz::RequiredLevel;
use crate::error::ConfigError;

/// Environment variable name for the JSON configuration file path.
pub const CONFIG_FILE_ENV: &str = "AUTHZ_CONFIG_FILE";

/// Environment variable name for the bind address.
pub const HOST_ENV: &str = "HOST";

/// Environment variable name for the bind port.
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the session domains.
///
/// Replaces any session cookies configured in the file.
pub const SESSION_DOMAIN_ENV: &str = "SESSION_DOMAIN";

/// Environment variable name for the session cookie name.
pub const SESSION_COOKIE_NAME_ENV: &str = "SESSION_COOKIE_NAME";

/// Environment variable name for the login portal URL.
pub const PORTAL_URL_ENV: &str = "PORTAL_URL";

/// Environment variable name for the session refresh interval.
pub const REFRESH_INTERVAL_ENV: &str = "REFRESH_INTERVAL";

/// Environment variable name for the per-decision deadline.
pub const REQUEST_TIMEOUT_ENV: &str = "REQUEST_TIMEOUT";

/// Environment variable name for the log output format.
///
/// # Values
/// - `json`: one JSON object per line
/// - anything else: human readable
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 9091;
pub const DEFAULT_REFRESH_INTERVAL: &str = "5m";
pub const DEFAULT_REQUEST_TIMEOUT: &str = "10s";
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Name of the endpoint served at `/api/verify`.
pub const LEGACY_ENDPOINT: &str = "legacy";

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub session: SessionConfig,
    pub authentication_backend: AuthenticationBackendConfig,
    pub users: Vec<UserConfig>,
    pub access_control: AccessControlConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout: String,
    pub endpoints: Vec<EndpointConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT.to_string(),
            endpoints: Vec::new(),
        }
    }
}

/// A named authorization endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub name: String,
    /// `legacy`, `forwardauth` or `authrequest`
    #[serde(default = "default_implementation")]
    pub implementation: String,
    /// Empty selects the implementation's defaults
    #[serde(default)]
    pub authn_strategies: Vec<AuthnStrategyConfig>,
}

fn default_implementation() -> String {
    LEGACY_ENDPOINT.to_string()
}

impl EndpointConfig {
    pub fn new(name: &str, implementation: &str, strategies: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            implementation: implementation.to_string(),
            authn_strategies: strategies
                .iter()
                .map(|name| AuthnStrategyConfig {
                    name: name.to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthnStrategyConfig {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Cookie name for domains that do not set their own
    pub name: String,
    pub cookies: Vec<SessionCookieConfig>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_SESSION_COOKIE_NAME.to_string(),
            cookies: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCookieConfig {
    pub domain: String,
    #[serde(default)]
    pub portal_url: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthenticationBackendConfig {
    pub refresh_interval: String,
}

impl Default for AuthenticationBackendConfig {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    pub username: String,
    #[serde(default)]
    pub display_name: String,
    /// Hex SHA-256 of the password
    pub password_digest: String,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub emails: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessControlConfig {
    pub default_policy: RequiredLevel,
    pub rules: Vec<AccessRuleConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessRuleConfig {
    /// Exact hosts or `*.` wildcards
    pub domains: Vec<String>,
    /// Path prefixes
    pub resources: Vec<String>,
    pub methods: Vec<String>,
    /// `user:<name>` or `group:<name>`
    pub subjects: Vec<String>,
    pub policy: RequiredLevel,
}

impl AppConfig {
    /// Load from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using `lookup` in place of the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(CONFIG_FILE_ENV) {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        config.apply_env(&lookup)?;
        config.validate()?;

        Ok(config)
    }

    /// Parse a JSON configuration file without validating it.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply_env<F>(&mut self, lookup: &F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(host) = var(HOST_ENV) {
            self.server.host = host;
        }

        if let Some(port) = var(PORT_ENV) {
            self.server.port = port.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidEnv {
                    name: PORT_ENV,
                    reason: e.to_string(),
                }
            })?;
        }

        if let Some(name) = var(SESSION_COOKIE_NAME_ENV) {
            self.session.name = name;
        }

        let portal_url = var(PORTAL_URL_ENV);

        if let Some(domains) = var(SESSION_DOMAIN_ENV) {
            self.session.cookies = domains
                .split(',')
                .map(str::trim)
                .filter(|domain| !domain.is_empty())
                .map(|domain| SessionCookieConfig {
                    domain: domain.to_string(),
                    portal_url: portal_url.clone(),
                    name: None,
                })
                .collect();
        } else if let Some(portal_url) = portal_url {
            for cookie in self.session.cookies.iter_mut().filter(|c| c.portal_url.is_none()) {
                cookie.portal_url = Some(portal_url.clone());
            }
        }

        if let Some(refresh) = var(REFRESH_INTERVAL_ENV) {
            self.authentication_backend.refresh_interval = refresh;
        }

        if let Some(timeout) = var(REQUEST_TIMEOUT_ENV) {
            self.server.request_timeout = timeout;
        }

        Ok(())
    }

    /// Check everything that can be checked without building the engine.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.cookies.is_empty() {
            return Err(ConfigError::MissingSessionDomain);
        }

        RefreshInterval::parse(&self.authentication_backend.refresh_interval)?;
        self.request_timeout()?;
        self.bind_address()?;

        let mut seen = std::collections::HashSet::new();
        for endpoint in &self.server.endpoints {
            if !seen.insert(endpoint.name.as_str()) {
                return Err(ConfigError::DuplicateEndpoint(endpoint.name.clone()));
            }
        }

        Ok(())
    }

    /// Configured endpoints, or `legacy`, `forward-auth` and `auth-request`
    /// when none are configured.
    ///
    /// A `legacy` endpoint always exists since `/api/verify` is served by it.
    pub fn endpoints(&self) -> Vec<EndpointConfig> {
        if self.server.endpoints.is_empty() {
            return vec![
                EndpointConfig::new(LEGACY_ENDPOINT, "legacy", &[]),
                EndpointConfig::new(
                    "forward-auth",
                    "forwardauth",
                    &[STRATEGY_HEADER_PROXY_AUTHORIZATION, STRATEGY_COOKIE_SESSION],
                ),
                EndpointConfig::new("auth-request", "authrequest", &[]),
            ];
        }

        let mut endpoints = self.server.endpoints.clone();
        if !endpoints.iter().any(|e| e.name == LEGACY_ENDPOINT) {
            endpoints.insert(0, EndpointConfig::new(LEGACY_ENDPOINT, "legacy", &[]));
        }
        endpoints
    }

    pub fn bind_address(&self) -> Result<SocketAddr, ConfigError> {
        let host = self.server.host.trim();
        let ip: IpAddr = host.parse().map_err(|e: std::net::AddrParseError| {
            ConfigError::InvalidBindAddress {
                value: host.to_string(),
                reason: e.to_string(),
            }
        })?;

        Ok(SocketAddr::new(ip, self.server.port))
    }

    pub fn request_timeout(&self) -> Result<Duration, ConfigError> {
        let value = &self.server.request_timeout;
        let timeout = parse_duration(value).map_err(|reason| ConfigError::InvalidRequestTimeout {
            value: value.clone(),
            reason,
        })?;

        if timeout.is_zero() {
            return Err(ConfigError::InvalidRequestTimeout {
                value: value.clone(),
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(timeout)
    }
}
