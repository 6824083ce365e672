// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process session store.
//!
//! Sessions live only as long as the process. Suitable for a single
//! instance sitting next to a portal that shares the process.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::authz::{ProviderError, SessionStore, UserDetails, UserSession};

/// Session store backed by a mutex-guarded map.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, UserSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new session under a random id and return the id.
    pub fn create(&self, session: UserSession) -> Result<String, ProviderError> {
        let id = Uuid::new_v4().to_string();
        self.insert(&id, session)?;
        Ok(id)
    }

    /// Store a session under a known id, replacing any previous one.
    pub fn insert(&self, id: &str, session: UserSession) -> Result<(), ProviderError> {
        self.lock()?.insert(id.to_string(), session);
        Ok(())
    }

    /// Snapshot of a session.
    pub fn session(&self, id: &str) -> Option<UserSession> {
        self.sessions.lock().ok()?.get(id).cloned()
    }

    /// Overwrite the last validation time. Returns `false` for unknown ids.
    pub fn set_last_validated(&self, id: &str, at: DateTime<Utc>) -> bool {
        let Ok(mut sessions) = self.sessions.lock() else {
            return false;
        };
        match sessions.get_mut(id) {
            Some(session) => {
                session.last_validated_at = at;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, UserSession>>, ProviderError> {
        self.sessions
            .lock()
            .map_err(|_| ProviderError::SessionStore("session map lock poisoned".to_string()))
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, id: &str) -> Result<Option<UserSession>, ProviderError> {
        Ok(self.lock()?.get(id).cloned())
    }

    async fn claim_refresh(
        &self,
        id: &str,
        window: Duration,
        now: DateTime<Utc>,
    ) -> Result<bool, ProviderError> {
        let mut sessions = self.lock()?;
        let session = sessions.get_mut(id).ok_or(ProviderError::SessionNotFound)?;

        // A stamp in the future (clock skew between callers) counts as fresh
        let elapsed = (now - session.last_validated_at)
            .to_std()
            .unwrap_or(Duration::ZERO);

        if window.is_zero() || elapsed >= window {
            session.last_validated_at = now;
            return Ok(true);
        }

        Ok(false)
    }

    async fn update_details(&self, id: &str, details: UserDetails) -> Result<(), ProviderError> {
        let mut sessions = self.lock()?;
        let session = sessions.get_mut(id).ok_or(ProviderError::SessionNotFound)?;
        session.details = details;
        Ok(())
    }

    async fn destroy(&self, id: &str) -> Result<(), ProviderError> {
        self.lock()?.remove(id);
        Ok(())
    }
}
