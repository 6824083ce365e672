// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authorization Decision Engine
//!
//! Answers the sub-request a reverse proxy issues for every client request
//! with a definite Allow or Deny, shaped for the proxy integration in use.
//!
//! ## Decision Flow
//!
//! 1. The configured [`Implementation`] extracts the target [`Object`]
//!    (scheme, host, path, method) from the proxy's headers
//! 2. Targets must be `https`/`wss` and fall under a configured domain
//! 3. Public (bypass) objects are allowed before any strategy runs
//! 4. [`AuthnStrategy`] values are tried in order:
//!    - first `Authenticated` wins
//!    - first `Challenge` short-circuits
//!    - when none decides, an object forbidden to anonymous requests is a 403
//! 5. The policy matcher verifies the subject against the object
//! 6. Allow → identity headers + 200; Deny → adapter-specific response;
//!    Forbidden → 403
//!
//! ## Security
//!
//! - Collaborator failures (session store, user backend, policy) deny
//! - Missing or malformed forwarded headers are never guessed
//! - Every request ends in a definite response, including on abort

pub mod builder;
pub mod config;
pub mod engine;
pub mod error;
pub mod headers;
pub mod implementation;
pub mod object;
pub mod policy;
pub mod response;
pub mod session;
pub mod strategy;
pub mod subject;

#[cfg(test)]
pub(crate) mod test_support;

pub use builder::AuthzBuilder;
pub use config::{AuthzConfig, AuthzDomain, RefreshInterval};
pub use engine::{Authz, Providers, RequestContext};
pub use error::{ProviderError, TransportError};
pub use implementation::Implementation;
pub use object::Object;
pub use policy::{PolicyDecision, PolicyMatch, PolicyMatcher, RequiredLevel};
pub use session::{SessionStore, UserSession};
pub use strategy::{AuthnStrategy, Challenge, Outcome};
pub use subject::{AuthenticationLevel, Subject, UserDetails, UserProvider};
