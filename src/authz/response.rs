// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Response shapes returned to the proxy.

use axum::http::{
    header::{ACCEPT, LOCATION},
    HeaderMap, HeaderValue, Method, StatusCode,
};
use axum::response::{IntoResponse, Response};
use url::Url;

use super::engine::RequestContext;
use super::headers::{
    BASIC_REALM, QUERY_METHOD, QUERY_REDIRECT, REMOTE_EMAIL, REMOTE_GROUPS, REMOTE_NAME,
    REMOTE_USER, X_REQUESTED_WITH,
};
use super::object::Object;
use super::strategy::Challenge;
use super::subject::Subject;

/// Why a request is being answered as unauthorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unauthorized {
    /// The client must log in (or step up) at the portal
    Login,
    /// A strategy demanded fresh credentials
    Challenge(Challenge),
}

/// `200 OK` with identity headers for the upstream.
pub fn authorized(subject: Option<&Subject>) -> Response {
    let mut response = StatusCode::OK.into_response();

    if let Some(subject) = subject {
        let headers = response.headers_mut();
        set_identity(headers, REMOTE_USER, &subject.username);
        set_identity(headers, REMOTE_GROUPS, &subject.groups.join(","));
        set_identity(headers, REMOTE_NAME, &subject.display_name);
        set_identity(headers, REMOTE_EMAIL, &subject.emails.join(","));
    }

    response
}

fn set_identity(headers: &mut HeaderMap, name: &'static str, value: &str) {
    match HeaderValue::from_bytes(value.as_bytes()) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(_) => {
            tracing::warn!(header = name, "Identity value is not a valid header value, omitting");
        }
    }
}

/// `403 Forbidden` without body.
pub fn forbidden() -> Response {
    bare(StatusCode::FORBIDDEN)
}

/// Status only: no body, no `Location`.
pub fn bare(status: StatusCode) -> Response {
    status.into_response()
}

/// Challenge status with its authenticate header.
pub fn challenge(challenge: &Challenge) -> Response {
    (
        challenge.status,
        [(challenge.authenticate_header(), HeaderValue::from_static(BASIC_REALM))],
    )
        .into_response()
}

/// Send the client to the login portal.
///
/// Browsers navigating with a safe method get `302`, other methods `303`.
/// XHR and non-HTML clients get `401` carrying the same `Location`.
/// Without a portal the answer is a bare `401`.
pub fn portal_redirect(ctx: &RequestContext<'_>, object: &Object) -> Response {
    let Some(location) = redirect_url(ctx, object) else {
        tracing::debug!(domain = %ctx.domain().name, "No portal URL available, answering 401");
        return bare(StatusCode::UNAUTHORIZED);
    };

    let Ok(location) = HeaderValue::from_str(location.as_str()) else {
        tracing::warn!(location = %location, "Portal redirect is not a valid header value");
        return bare(StatusCode::UNAUTHORIZED);
    };

    let status = redirect_status(ctx.headers(), object.method());

    tracing::debug!(status = %status, url = %object.url(), "Redirecting to portal");

    (status, [(LOCATION, location)]).into_response()
}

/// `portal?rd=<target>&rm=<method>`.
pub(crate) fn redirect_url(ctx: &RequestContext<'_>, object: &Object) -> Option<Url> {
    let mut portal = match &ctx.domain().portal_url {
        Some(portal) => portal.clone(),
        None => {
            let rd = ctx.query(QUERY_REDIRECT)?;
            match Url::parse(&rd) {
                Ok(portal) => portal,
                Err(e) => {
                    tracing::warn!(error = %e, rd = %rd, "Invalid portal URL in redirect parameter");
                    return None;
                }
            }
        }
    };

    portal
        .query_pairs_mut()
        .append_pair(QUERY_REDIRECT, object.url().as_str())
        .append_pair(QUERY_METHOD, object.method().as_str());

    Some(portal)
}

fn redirect_status(headers: &HeaderMap, method: &Method) -> StatusCode {
    if is_xhr(headers) || !accepts_html(headers) {
        return StatusCode::UNAUTHORIZED;
    }

    match *method {
        Method::GET | Method::HEAD | Method::OPTIONS => StatusCode::FOUND,
        _ => StatusCode::SEE_OTHER,
    }
}

fn is_xhr(headers: &HeaderMap) -> bool {
    headers
        .get(X_REQUESTED_WITH)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.eq_ignore_ascii_case("XMLHttpRequest"))
}

/// Missing `Accept` counts as a browser.
fn accepts_html(headers: &HeaderMap) -> bool {
    let mut values = headers.get_all(ACCEPT).iter().peekable();
    if values.peek().is_none() {
        return true;
    }

    values
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(|range| range.split(';').next().unwrap_or_default().trim())
        .any(|range| {
            range.eq_ignore_ascii_case("text/html")
                || range.eq_ignore_ascii_case("text/*")
                || range == "*/*"
        })
}
