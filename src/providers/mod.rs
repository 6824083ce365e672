// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process collaborators: sessions, users and access rules.
//!
//! Deployments with an external user directory or session store provide
//! their own [`UserProvider`](crate::authz::UserProvider) and
//! [`SessionStore`](crate::authz::SessionStore) instead.

use std::sync::Arc;

use crate::authz::Providers;
use crate::config::AppConfig;
use crate::error::ConfigError;

pub mod memory_sessions;
pub mod static_policy;
pub mod static_users;

pub use memory_sessions::MemorySessionStore;
pub use static_policy::{AccessRule, StaticPolicy, SubjectMatcher};
pub use static_users::StaticUserProvider;

/// Build the in-process providers described by the configuration.
pub fn from_config(config: &AppConfig) -> Result<Providers, ConfigError> {
    let users = StaticUserProvider::from_config(&config.users)?;
    let policy = StaticPolicy::from_config(&config.access_control)?;

    if users.is_empty() {
        tracing::warn!("No users configured, header authentication will always fail");
    }

    Ok(Providers::new(
        Arc::new(users),
        Arc::new(MemorySessionStore::new()),
        Arc::new(policy),
    ))
}
