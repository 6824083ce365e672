// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Header names exchanged with reverse proxies.
//!
//! Names are lowercase so they can be used both for lookups and with
//! `HeaderName::from_static`.

/// Full original URL (NGINX `auth_request`, legacy callers).
pub const X_ORIGINAL_URL: &str = "x-original-url";
/// Original request method (NGINX `auth_request`, legacy callers).
pub const X_ORIGINAL_METHOD: &str = "x-original-method";

/// Forward-auth style headers (Traefik, Caddy, Skipper).
pub const X_FORWARDED_METHOD: &str = "x-forwarded-method";
pub const X_FORWARDED_PROTO: &str = "x-forwarded-proto";
pub const X_FORWARDED_HOST: &str = "x-forwarded-host";
pub const X_FORWARDED_URI: &str = "x-forwarded-uri";

pub const X_REQUESTED_WITH: &str = "x-requested-with";

/// Identity headers set on an authorized response for the upstream.
pub const REMOTE_USER: &str = "remote-user";
pub const REMOTE_GROUPS: &str = "remote-groups";
pub const REMOTE_NAME: &str = "remote-name";
pub const REMOTE_EMAIL: &str = "remote-email";

/// Value of `WWW-Authenticate` / `Proxy-Authenticate` on a challenge.
pub const BASIC_REALM: &str = r#"Basic realm="Authorization Required""#;

/// Query parameter carrying the original URL to the portal.
pub const QUERY_REDIRECT: &str = "rd";
/// Query parameter carrying the original method to the portal.
pub const QUERY_METHOD: &str = "rm";
/// Legacy callback query parameter selecting the `Authorization` header.
pub const QUERY_AUTH: &str = "auth";
