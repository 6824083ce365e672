// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `Authorization` / `Proxy-Authorization` header strategies.
//!
//! Only the `Basic` scheme is understood. A missing header never challenges;
//! a present header that fails validation challenges when configured to.

use axum::http::{
    header::{AUTHORIZATION, PROXY_AUTHORIZATION},
    HeaderName, StatusCode,
};
use base64ct::{Base64, Encoding};

use super::{Challenge, Outcome};
use crate::authz::engine::RequestContext;
use crate::authz::headers::QUERY_AUTH;
use crate::authz::subject::{AuthenticationLevel, Subject};

/// Which header carries the credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialHeader {
    Authorization,
    ProxyAuthorization,
}

impl CredentialHeader {
    pub fn header_name(&self) -> HeaderName {
        match self {
            CredentialHeader::Authorization => AUTHORIZATION,
            CredentialHeader::ProxyAuthorization => PROXY_AUTHORIZATION,
        }
    }
}

/// Credential read from a single header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderStrategy {
    header: CredentialHeader,
    challenge: Option<StatusCode>,
}

impl HeaderStrategy {
    /// `Authorization`, challenging with `401` + `WWW-Authenticate`.
    pub fn authorization() -> Self {
        Self {
            header: CredentialHeader::Authorization,
            challenge: Some(StatusCode::UNAUTHORIZED),
        }
    }

    /// `Proxy-Authorization`, passing control on failure.
    pub fn proxy_authorization() -> Self {
        Self {
            header: CredentialHeader::ProxyAuthorization,
            challenge: None,
        }
    }

    /// Challenge with `status` when validation fails.
    pub fn with_challenge(mut self, status: StatusCode) -> Self {
        self.challenge = Some(status);
        self
    }

    /// Never challenge.
    pub fn without_challenge(mut self) -> Self {
        self.challenge = None;
        self
    }

    pub fn header(&self) -> CredentialHeader {
        self.header
    }

    pub fn challenge(&self) -> Option<StatusCode> {
        self.challenge
    }

    pub(super) async fn authenticate(&self, ctx: &RequestContext<'_>) -> Outcome {
        match verify(ctx, self.header).await {
            Verification::Absent => Outcome::NotAuthenticated,
            Verification::Valid(subject) => Outcome::Authenticated(subject),
            Verification::Invalid => match self.challenge {
                Some(status) => Outcome::Challenge(Challenge::new(status)),
                None => Outcome::NotAuthenticated,
            },
        }
    }
}

/// Legacy combined header.
///
/// The callback query `auth=basic` selects `Authorization` (challenge `401`);
/// otherwise `Proxy-Authorization` is read (challenge `407`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LegacyHeaderStrategy;

impl LegacyHeaderStrategy {
    pub(super) async fn authenticate(&self, ctx: &RequestContext<'_>) -> Outcome {
        let basic = ctx
            .query(QUERY_AUTH)
            .is_some_and(|value| value.eq_ignore_ascii_case("basic"));

        let (header, status) = if basic {
            (CredentialHeader::Authorization, StatusCode::UNAUTHORIZED)
        } else {
            (
                CredentialHeader::ProxyAuthorization,
                StatusCode::PROXY_AUTHENTICATION_REQUIRED,
            )
        };

        match verify(ctx, header).await {
            Verification::Absent => Outcome::NotAuthenticated,
            Verification::Valid(subject) => Outcome::Authenticated(subject),
            Verification::Invalid => Outcome::Challenge(Challenge::new(status)),
        }
    }
}

enum Verification {
    Absent,
    Invalid,
    Valid(Subject),
}

async fn verify(ctx: &RequestContext<'_>, header: CredentialHeader) -> Verification {
    let name = header.header_name();
    let Some(value) = ctx.headers().get(&name) else {
        return Verification::Absent;
    };

    let Some((username, password)) = value.to_str().ok().and_then(parse_basic) else {
        tracing::debug!(header = %name, "Credential header is not valid Basic credentials");
        return Verification::Invalid;
    };

    let users = &ctx.providers().users;

    match users.check_password(&username, &password).await {
        Ok(true) => {}
        Ok(false) => {
            tracing::info!(header = %name, username = %username, "Invalid credentials");
            return Verification::Invalid;
        }
        Err(e) => {
            tracing::error!(error = %e, username = %username, "Credential check failed");
            return Verification::Invalid;
        }
    }

    match users.details(&username).await {
        Ok(details) => Verification::Valid(Subject::new(details, AuthenticationLevel::OneFactor)),
        Err(e) => {
            tracing::error!(error = %e, username = %username, "Failed to load user details");
            Verification::Invalid
        }
    }
}

/// Decode `Basic <base64(username:password)>`.
fn parse_basic(value: &str) -> Option<(String, String)> {
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = Base64::decode_vec(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;

    if username.is_empty() {
        return None;
    }

    Some((username.to_string(), password.to_string()))
}
