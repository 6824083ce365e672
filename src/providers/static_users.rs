// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User backend read from the configuration file.
//!
//! Passwords are stored as hex-encoded SHA-256 digests.

use std::collections::HashMap;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::authz::{ProviderError, UserDetails, UserProvider};
use crate::config::UserConfig;
use crate::error::ConfigError;

struct StaticUser {
    digest: [u8; 32],
    details: UserDetails,
}

/// Fixed set of users.
#[derive(Default)]
pub struct StaticUserProvider {
    users: HashMap<String, StaticUser>,
}

impl StaticUserProvider {
    pub fn from_config(users: &[UserConfig]) -> Result<Self, ConfigError> {
        let mut provider = Self::default();

        for user in users {
            let digest = hex::decode(user.password_digest.trim())
                .ok()
                .and_then(|bytes| <[u8; 32]>::try_from(bytes).ok())
                .ok_or_else(|| ConfigError::InvalidPasswordDigest(user.username.clone()))?;

            provider.users.insert(
                user.username.clone(),
                StaticUser {
                    digest,
                    details: UserDetails {
                        username: user.username.clone(),
                        display_name: user.display_name.clone(),
                        groups: user.groups.clone(),
                        emails: user.emails.clone(),
                    },
                },
            );
        }

        tracing::debug!(count = provider.users.len(), "Loaded static users");

        Ok(provider)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// Hex SHA-256 digest of a password, as stored in the configuration.
pub fn digest(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Compared against for unknown usernames so both paths hash and compare.
const UNKNOWN_USER_DIGEST: [u8; 32] = [0; 32];

#[async_trait]
impl UserProvider for StaticUserProvider {
    async fn check_password(&self, username: &str, password: &str) -> Result<bool, ProviderError> {
        let user = self.users.get(username);
        let stored = user.map_or(&UNKNOWN_USER_DIGEST, |user| &user.digest);

        let presented = Sha256::digest(password.as_bytes());
        let matches: bool = presented.as_slice().ct_eq(stored.as_slice()).into();

        Ok(user.is_some() && matches)
    }

    async fn details(&self, username: &str) -> Result<UserDetails, ProviderError> {
        self.users
            .get(username)
            .map(|user| user.details.clone())
            .ok_or_else(|| ProviderError::UserNotFound(username.to_string()))
    }
}
