// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared fixtures for authorization tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::http::{request::Parts, Method, Request};
use base64::Engine;
use chrono::{DateTime, Utc};
use url::Url;

use super::config::{AuthzConfig, AuthzDomain, RefreshInterval};
use super::engine::{Providers, RequestContext};
use super::error::ProviderError;
use super::object::Object;
use super::policy::{PolicyMatch, PolicyMatcher, RequiredLevel};
use super::session::{SessionStore, UserSession};
use super::subject::{AuthenticationLevel, Subject, UserDetails, UserProvider};
use crate::providers::{AccessRule, MemorySessionStore, StaticPolicy, SubjectMatcher};

pub(crate) const PORTAL_URL: &str = "https://login.example.com/";

/// Known test users: `john` / `password` and `alice` / `secret`.
pub(crate) fn details(username: &str) -> UserDetails {
    match username {
        "john" => UserDetails {
            username: "john".to_string(),
            display_name: "John Doe".to_string(),
            groups: vec!["admins".to_string(), "dev".to_string()],
            emails: vec!["john@example.com".to_string()],
        },
        "alice" => UserDetails {
            username: "alice".to_string(),
            display_name: "Alice".to_string(),
            groups: vec!["dev".to_string()],
            emails: vec!["alice@example.com".to_string()],
        },
        other => UserDetails {
            username: other.to_string(),
            ..UserDetails::default()
        },
    }
}

pub(crate) fn subject(username: &str, level: AuthenticationLevel) -> Subject {
    Subject::new(details(username), level)
}

pub(crate) fn object(url: &str) -> Object {
    Object::new(Url::parse(url).unwrap(), Method::GET)
}

/// `Basic` credentials header value.
pub(crate) fn basic(username: &str, password: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"));
    format!("Basic {encoded}")
}

/// Callback request to `/api/verify` with the given headers.
pub(crate) fn request(headers: &[(&str, &str)]) -> Parts {
    request_with_uri("/api/verify", headers)
}

pub(crate) fn request_with_uri(uri: &str, headers: &[(&str, &str)]) -> Parts {
    let mut builder = Request::builder().uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(()).unwrap().into_parts().0
}

/// User backend with call counting and failure injection.
pub(crate) struct TestUsers {
    users: Mutex<HashMap<String, (String, UserDetails)>>,
    details_calls: AtomicUsize,
    failing: AtomicBool,
}

impl TestUsers {
    pub(crate) fn new() -> Self {
        let users = [("john", "password"), ("alice", "secret")]
            .into_iter()
            .map(|(name, password)| (name.to_string(), (password.to_string(), details(name))))
            .collect();

        Self {
            users: Mutex::new(users),
            details_calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        }
    }

    pub(crate) fn details_calls(&self) -> usize {
        self.details_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn fail_backend(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub(crate) fn remove(&self, username: &str) {
        self.users.lock().unwrap().remove(username);
    }

    pub(crate) fn set_groups(&self, username: &str, groups: &[&str]) {
        if let Some((_, details)) = self.users.lock().unwrap().get_mut(username) {
            details.groups = groups.iter().map(|g| g.to_string()).collect();
        }
    }

    fn check_failing(&self) -> Result<(), ProviderError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ProviderError::UserBackend("backend offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl UserProvider for TestUsers {
    async fn check_password(&self, username: &str, password: &str) -> Result<bool, ProviderError> {
        self.check_failing()?;
        let users = self.users.lock().unwrap();
        Ok(users.get(username).is_some_and(|(expected, _)| expected == password))
    }

    async fn details(&self, username: &str) -> Result<UserDetails, ProviderError> {
        self.details_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failing()?;
        let users = self.users.lock().unwrap();
        users
            .get(username)
            .map(|(_, details)| details.clone())
            .ok_or_else(|| ProviderError::UserNotFound(username.to_string()))
    }
}

/// In-memory sessions counting reads, with failure injection.
pub(crate) struct CountingSessions {
    inner: MemorySessionStore,
    reads: AtomicUsize,
    failing: AtomicBool,
}

impl CountingSessions {
    fn new() -> Self {
        Self {
            inner: MemorySessionStore::new(),
            reads: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        }
    }

    pub(crate) fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub(crate) fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    fn check_failing(&self) -> Result<(), ProviderError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ProviderError::SessionStore("store offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl SessionStore for CountingSessions {
    async fn get(&self, id: &str) -> Result<Option<UserSession>, ProviderError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check_failing()?;
        self.inner.get(id).await
    }

    async fn claim_refresh(
        &self,
        id: &str,
        window: Duration,
        now: DateTime<Utc>,
    ) -> Result<bool, ProviderError> {
        self.check_failing()?;
        self.inner.claim_refresh(id, window, now).await
    }

    async fn update_details(&self, id: &str, details: UserDetails) -> Result<(), ProviderError> {
        self.check_failing()?;
        self.inner.update_details(id, details).await
    }

    async fn destroy(&self, id: &str) -> Result<(), ProviderError> {
        self.check_failing()?;
        self.inner.destroy(id).await
    }
}

/// Policy whose matcher is always unavailable.
pub(crate) struct FailingPolicy;

#[async_trait]
impl PolicyMatcher for FailingPolicy {
    async fn required_level(
        &self,
        _subject: Option<&Subject>,
        _object: &Object,
    ) -> Result<PolicyMatch, ProviderError> {
        Err(ProviderError::Policy("rules unavailable".to_string()))
    }
}

/// Rules for `*.example.com`:
///
/// - `public.example.com`: bypass
/// - `secure.example.com`: two factor
/// - `vault.example.com`: denied
/// - `ops.example.com`: two factor for `admins`, denied for everyone else
/// - anything else: one factor
pub(crate) fn example_policy() -> StaticPolicy {
    StaticPolicy::new(
        RequiredLevel::OneFactor,
        vec![
            AccessRule::new(RequiredLevel::Bypass).with_domains(&["public.example.com"]),
            AccessRule::new(RequiredLevel::TwoFactor).with_domains(&["secure.example.com"]),
            AccessRule::new(RequiredLevel::Denied).with_domains(&["vault.example.com"]),
            AccessRule::new(RequiredLevel::TwoFactor)
                .with_domains(&["ops.example.com"])
                .with_subjects(vec![SubjectMatcher::Group("admins".to_string())]),
            AccessRule::new(RequiredLevel::Denied).with_domains(&["ops.example.com"]),
        ],
    )
}

/// Providers plus the `.example.com` domain.
pub(crate) struct Fixture {
    pub(crate) users: Arc<TestUsers>,
    pub(crate) sessions: Arc<CountingSessions>,
    pub(crate) providers: Providers,
    domain: AuthzDomain,
}

impl Fixture {
    pub(crate) fn new() -> Self {
        Self::build(Arc::new(example_policy()), true)
    }

    pub(crate) fn with_failing_policy() -> Self {
        Self::build(Arc::new(FailingPolicy), true)
    }

    pub(crate) fn without_portal() -> Self {
        Self::build(Arc::new(example_policy()), false)
    }

    fn build(policy: Arc<dyn PolicyMatcher>, portal: bool) -> Self {
        let users = Arc::new(TestUsers::new());
        let sessions = Arc::new(CountingSessions::new());
        let providers = Providers::new(users.clone(), sessions.clone(), policy);

        let mut domain = AuthzDomain::new("example.com");
        if portal {
            domain = domain.with_portal_url(Url::parse(PORTAL_URL).unwrap());
        }

        Self {
            users,
            sessions,
            providers,
            domain,
        }
    }

    pub(crate) fn config(&self) -> AuthzConfig {
        AuthzConfig {
            refresh_interval: RefreshInterval::Every(Duration::from_secs(300)),
            domains: vec![self.domain.clone()],
        }
    }

    pub(crate) fn context<'a>(&'a self, parts: &'a Parts) -> RequestContext<'a> {
        RequestContext::new(parts, &self.domain, &self.providers, Utc::now())
    }

    /// Store a freshly validated session for a known user and return its id.
    pub(crate) fn session(&self, username: &str, level: AuthenticationLevel) -> String {
        self.sessions
            .inner
            .create(UserSession::new(details(username), level, Utc::now()))
            .unwrap()
    }

    pub(crate) fn anonymous_session(&self) -> String {
        self.sessions
            .inner
            .create(UserSession::new(
                UserDetails::default(),
                AuthenticationLevel::NotAuthenticated,
                Utc::now(),
            ))
            .unwrap()
    }

    /// Pretend the session was last validated `age` ago.
    pub(crate) fn age_session(&self, id: &str, age: Duration) {
        let at = Utc::now() - chrono::Duration::from_std(age).unwrap();
        self.sessions.inner.set_last_validated(id, at);
    }

    pub(crate) fn stored_session(&self, id: &str) -> Option<UserSession> {
        self.sessions.inner.session(id)
    }
}
