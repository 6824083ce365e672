// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Fluent assembly of an [`Authz`].

use axum::http::StatusCode;
use url::Url;

use super::config::{AuthzConfig, AuthzDomain, RefreshInterval};
use super::engine::{Authz, Providers};
use super::implementation::Implementation;
use super::strategy::{AuthnStrategy, HeaderStrategy};
use crate::config::{AppConfig, EndpointConfig};
use crate::error::ConfigError;

/// Strategy identifier: session cookie.
pub const STRATEGY_COOKIE_SESSION: &str = "cookie-session";
/// Strategy identifier: `Authorization` header.
pub const STRATEGY_HEADER_AUTHORIZATION: &str = "header-authorization";
/// Strategy identifier: `Proxy-Authorization` header.
pub const STRATEGY_HEADER_PROXY_AUTHORIZATION: &str = "header-proxy-authorization";
/// Strategy identifier: legacy combined header.
pub const STRATEGY_HEADER_LEGACY: &str = "header-legacy-combined";

/// Builds an [`Authz`].
///
/// Apply [`with_config`](Self::with_config) or
/// [`with_authz_config`](Self::with_authz_config) before
/// [`with_endpoint_config`](Self::with_endpoint_config): cookie strategies
/// take the refresh interval known at the time they are added.
#[derive(Debug)]
pub struct AuthzBuilder {
    config: AuthzConfig,
    strategies: Vec<AuthnStrategy>,
    implementation: Implementation,
    providers: Providers,
    unrecognized: Vec<String>,
}

impl AuthzBuilder {
    pub fn new(providers: Providers) -> Self {
        Self {
            config: AuthzConfig::default(),
            strategies: Vec::new(),
            implementation: Implementation::Legacy,
            providers,
            unrecognized: Vec::new(),
        }
    }

    /// Replace all strategies.
    pub fn with_strategies(mut self, strategies: Vec<AuthnStrategy>) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn with_strategy_cookie(mut self, refresh: RefreshInterval) -> Self {
        self.strategies.push(AuthnStrategy::session_cookie(refresh));
        self
    }

    pub fn with_strategy_authorization(mut self) -> Self {
        self.strategies.push(AuthnStrategy::authorization_header());
        self
    }

    pub fn with_strategy_proxy_authorization(mut self) -> Self {
        self.strategies.push(AuthnStrategy::proxy_authorization_header());
        self
    }

    pub fn with_implementation_legacy(mut self) -> Self {
        self.implementation = Implementation::Legacy;
        self
    }

    pub fn with_implementation_forward_auth(mut self) -> Self {
        self.implementation = Implementation::ForwardAuth;
        self
    }

    pub fn with_implementation_auth_request(mut self) -> Self {
        self.implementation = Implementation::AuthRequest;
        self
    }

    /// Derive the engine configuration from the application configuration.
    ///
    /// One domain is created per configured session cookie.
    pub fn with_config(mut self, config: &AppConfig) -> Result<Self, ConfigError> {
        let refresh_interval =
            RefreshInterval::parse(&config.authentication_backend.refresh_interval)?;

        let domains = config
            .session
            .cookies
            .iter()
            .map(|cookie| {
                let name = cookie.name.as_deref().unwrap_or(&config.session.name);
                let domain = AuthzDomain::new(&cookie.domain).with_cookie_name(name);

                match cookie.portal_url.as_deref() {
                    None => Ok(domain),
                    Some(portal_url) => Url::parse(portal_url)
                        .map(|url| domain.with_portal_url(url))
                        .map_err(|e| ConfigError::InvalidPortalUrl {
                            domain: cookie.domain.clone(),
                            value: portal_url.to_string(),
                            reason: e.to_string(),
                        }),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.config = AuthzConfig {
            refresh_interval,
            domains,
        };

        Ok(self)
    }

    /// Select the implementation and strategies of a named endpoint.
    ///
    /// Strategies are cleared first. Unknown identifiers are skipped and
    /// reported by [`unrecognized_strategies`](Self::unrecognized_strategies).
    pub fn with_endpoint_config(mut self, endpoint: &EndpointConfig) -> Self {
        self.implementation = Implementation::from_name(&endpoint.implementation);
        self.strategies.clear();

        for strategy in &endpoint.authn_strategies {
            match strategy.name.as_str() {
                STRATEGY_COOKIE_SESSION => self
                    .strategies
                    .push(AuthnStrategy::session_cookie(self.config.refresh_interval)),
                STRATEGY_HEADER_AUTHORIZATION => {
                    self.strategies.push(AuthnStrategy::authorization_header())
                }
                STRATEGY_HEADER_PROXY_AUTHORIZATION => {
                    self.strategies.push(AuthnStrategy::proxy_authorization_header())
                }
                STRATEGY_HEADER_LEGACY => self.strategies.push(AuthnStrategy::legacy_header()),
                unknown => {
                    tracing::warn!(
                        endpoint = %endpoint.name,
                        strategy = unknown,
                        "Ignoring unrecognized authentication strategy"
                    );
                    self.unrecognized.push(unknown.to_string());
                }
            }
        }

        self
    }

    pub fn with_authz_config(mut self, config: AuthzConfig) -> Self {
        self.config = config;
        self
    }

    /// Strategy identifiers skipped by `with_endpoint_config`.
    pub fn unrecognized_strategies(&self) -> &[String] {
        &self.unrecognized
    }

    /// Produce the engine. Empty strategy lists get the implementation's defaults.
    pub fn build(self) -> Authz {
        let strategies = if self.strategies.is_empty() {
            default_strategies(self.implementation, self.config.refresh_interval)
        } else {
            self.strategies
        };

        Authz::new(self.config, strategies, self.implementation, self.providers)
    }
}

fn default_strategies(implementation: Implementation, refresh: RefreshInterval) -> Vec<AuthnStrategy> {
    match implementation {
        Implementation::Legacy => vec![
            AuthnStrategy::legacy_header(),
            AuthnStrategy::session_cookie(refresh),
        ],
        Implementation::AuthRequest => vec![
            AuthnStrategy::Header(
                HeaderStrategy::proxy_authorization().with_challenge(StatusCode::UNAUTHORIZED),
            ),
            AuthnStrategy::session_cookie(RefreshInterval::Always),
        ],
        Implementation::ForwardAuth => vec![
            AuthnStrategy::proxy_authorization_header(),
            AuthnStrategy::session_cookie(refresh),
        ],
    }
}
