// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::authz::{Authz, AuthzBuilder, Providers};
use crate::config::AppConfig;
use crate::error::ConfigError;

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    endpoints: Arc<HashMap<String, Arc<Authz>>>,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(request_timeout: Duration) -> Self {
        Self {
            endpoints: Arc::new(HashMap::new()),
            request_timeout,
        }
    }

    /// Build one engine per configured endpoint.
    pub fn from_config(config: &AppConfig, providers: Providers) -> Result<Self, ConfigError> {
        let mut state = Self::new(config.request_timeout()?);

        for endpoint in config.endpoints() {
            let builder = AuthzBuilder::new(providers.clone())
                .with_config(config)?
                .with_endpoint_config(&endpoint);
            let authz = builder.build();

            tracing::info!(
                endpoint = %endpoint.name,
                implementation = %authz.implementation(),
                strategies = ?authz.strategies().iter().map(|s| s.name()).collect::<Vec<_>>(),
                "Configured authorization endpoint"
            );

            state = state.with_endpoint(&endpoint.name, authz);
        }

        Ok(state)
    }

    pub fn with_endpoint(mut self, name: &str, authz: Authz) -> Self {
        Arc::make_mut(&mut self.endpoints).insert(name.to_string(), Arc::new(authz));
        self
    }

    pub fn endpoint(&self, name: &str) -> Option<Arc<Authz>> {
        self.endpoints.get(name).cloned()
    }

    pub fn endpoint_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.endpoints.keys().cloned().collect();
        names.sort();
        names
    }
}
