// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The target resource of a proxied request and the per-proxy extractors
//! that rebuild it from forwarded headers.

use axum::http::{HeaderMap, Method};
use url::Url;

use super::error::TransportError;
use super::headers::{
    X_FORWARDED_HOST, X_FORWARDED_METHOD, X_FORWARDED_PROTO, X_FORWARDED_URI, X_ORIGINAL_METHOD,
    X_ORIGINAL_URL,
};

/// Target resource under request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Object {
    url: Url,
    method: Method,
}

impl Object {
    pub fn new(url: Url, method: Method) -> Self {
        Self { url, method }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    /// Host without port.
    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Session cookies may only travel over `https` and `wss`.
    pub fn is_secure(&self) -> bool {
        matches!(self.scheme(), "https" | "wss")
    }
}

/// `X-Original-URL` + `X-Original-Method` (NGINX `auth_request`).
pub(crate) fn from_original_headers(headers: &HeaderMap) -> Result<Object, TransportError> {
    let method = parse_method(required(headers, X_ORIGINAL_METHOD)?)?;
    let url = parse_url(required(headers, X_ORIGINAL_URL)?)?;

    Ok(Object::new(url, method))
}

/// `X-Forwarded-Method/Proto/Host/URI` (Traefik, Caddy, Skipper).
pub(crate) fn from_forwarded_headers(headers: &HeaderMap) -> Result<Object, TransportError> {
    let method = parse_method(required(headers, X_FORWARDED_METHOD)?)?;
    let url = forwarded_url(headers)?;

    Ok(Object::new(url, method))
}

/// `X-Original-URL` when present, otherwise the forwarded set. The method
/// may come from either convention.
pub(crate) fn from_legacy_headers(headers: &HeaderMap) -> Result<Object, TransportError> {
    let method = match optional(headers, X_ORIGINAL_METHOD)? {
        Some(method) => method,
        None => required(headers, X_FORWARDED_METHOD)?,
    };
    let method = parse_method(method)?;

    let url = match optional(headers, X_ORIGINAL_URL)? {
        Some(url) => parse_url(url)?,
        None => forwarded_url(headers)?,
    };

    Ok(Object::new(url, method))
}

fn forwarded_url(headers: &HeaderMap) -> Result<Url, TransportError> {
    let proto = required(headers, X_FORWARDED_PROTO)?;
    let host = required(headers, X_FORWARDED_HOST)?;
    let uri = required(headers, X_FORWARDED_URI)?;

    let url = if uri.starts_with('/') {
        format!("{proto}://{host}{uri}")
    } else {
        format!("{proto}://{host}/{uri}")
    };

    parse_url(&url)
}

fn optional<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<Option<&'a str>, TransportError> {
    match headers.get(name) {
        None => Ok(None),
        Some(value) => {
            let value = value
                .to_str()
                .map_err(|_| TransportError::InvalidHeader(name))?
                .trim();
            Ok((!value.is_empty()).then_some(value))
        }
    }
}

fn required<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, TransportError> {
    optional(headers, name)?.ok_or(TransportError::MissingHeader(name))
}

fn parse_method(value: &str) -> Result<Method, TransportError> {
    Method::from_bytes(value.to_ascii_uppercase().as_bytes())
        .map_err(|_| TransportError::InvalidMethod(value.to_string()))
}

fn parse_url(value: &str) -> Result<Url, TransportError> {
    let url = Url::parse(value).map_err(|e| TransportError::InvalidUrl {
        url: value.to_string(),
        reason: e.to_string(),
    })?;

    if url.host_str().map_or(true, str::is_empty) {
        return Err(TransportError::InvalidUrl {
            url: value.to_string(),
            reason: "missing host".to_string(),
        });
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn forwarded_headers_build_object() {
        let object = from_forwarded_headers(&headers(&[
            (X_FORWARDED_METHOD, "post"),
            (X_FORWARDED_PROTO, "https"),
            (X_FORWARDED_HOST, "app.example.com:8443"),
            (X_FORWARDED_URI, "/api/items?id=7"),
        ]))
        .unwrap();

        assert_eq!(object.method(), Method::POST);
        assert_eq!(object.scheme(), "https");
        assert_eq!(object.host(), "app.example.com");
        assert_eq!(object.path(), "/api/items");
        assert_eq!(object.url().as_str(), "https://app.example.com:8443/api/items?id=7");
        assert!(object.is_secure());
    }

    #[test]
    fn forwarded_headers_require_every_header() {
        let err = from_forwarded_headers(&headers(&[
            (X_FORWARDED_METHOD, "GET"),
            (X_FORWARDED_PROTO, "https"),
            (X_FORWARDED_URI, "/"),
        ]))
        .unwrap_err();

        assert!(matches!(err, TransportError::MissingHeader(X_FORWARDED_HOST)));
    }

    #[test]
    fn original_headers_build_object() {
        let object = from_original_headers(&headers(&[
            (X_ORIGINAL_METHOD, "GET"),
            (X_ORIGINAL_URL, "https://app.example.com/dashboard"),
        ]))
        .unwrap();

        assert_eq!(object.method(), Method::GET);
        assert_eq!(object.path(), "/dashboard");
    }

    #[test]
    fn original_headers_ignore_forwarded_set() {
        let err = from_original_headers(&headers(&[
            (X_FORWARDED_METHOD, "GET"),
            (X_FORWARDED_PROTO, "https"),
            (X_FORWARDED_HOST, "app.example.com"),
            (X_FORWARDED_URI, "/"),
        ]))
        .unwrap_err();

        assert!(matches!(err, TransportError::MissingHeader(X_ORIGINAL_METHOD)));
    }

    #[test]
    fn legacy_prefers_original_url() {
        let object = from_legacy_headers(&headers(&[
            (X_ORIGINAL_URL, "https://one.example.com/a"),
            (X_FORWARDED_METHOD, "DELETE"),
            (X_FORWARDED_PROTO, "https"),
            (X_FORWARDED_HOST, "two.example.com"),
            (X_FORWARDED_URI, "/b"),
        ]))
        .unwrap();

        assert_eq!(object.host(), "one.example.com");
        assert_eq!(object.method(), Method::DELETE);
    }

    #[test]
    fn legacy_falls_back_to_forwarded_set() {
        let object = from_legacy_headers(&headers(&[
            (X_FORWARDED_METHOD, "GET"),
            (X_FORWARDED_PROTO, "https"),
            (X_FORWARDED_HOST, "two.example.com"),
            (X_FORWARDED_URI, "b"),
        ]))
        .unwrap();

        assert_eq!(object.url().as_str(), "https://two.example.com/b");
    }

    #[test]
    fn legacy_without_method_is_rejected() {
        let err = from_legacy_headers(&headers(&[(X_ORIGINAL_URL, "https://app.example.com/")]))
            .unwrap_err();
        assert!(matches!(err, TransportError::MissingHeader(X_FORWARDED_METHOD)));
    }

    #[test]
    fn malformed_url_and_method_are_rejected() {
        let err = from_original_headers(&headers(&[
            (X_ORIGINAL_METHOD, "GET"),
            (X_ORIGINAL_URL, "not a url"),
        ]))
        .unwrap_err();
        assert!(matches!(err, TransportError::InvalidUrl { .. }));

        let err = from_original_headers(&headers(&[
            (X_ORIGINAL_METHOD, "GE T"),
            (X_ORIGINAL_URL, "https://app.example.com/"),
        ]))
        .unwrap_err();
        assert!(matches!(err, TransportError::InvalidMethod(_)));
    }

    #[test]
    fn plain_http_is_not_secure() {
        let object = Object::new(Url::parse("http://app.example.com/").unwrap(), Method::GET);
        assert!(!object.is_secure());
        let object = Object::new(Url::parse("wss://app.example.com/ws").unwrap(), Method::GET);
        assert!(object.is_secure());
    }
}
