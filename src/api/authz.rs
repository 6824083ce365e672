// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, Request, State},
    response::Response,
};

use crate::{config::LEGACY_ENDPOINT, error::ApiError, state::AppState};

/// Legacy verification endpoint (`/api/verify`).
pub async fn verify_legacy(
    State(state): State<AppState>,
    request: Request,
) -> Result<Response, ApiError> {
    decide(&state, LEGACY_ENDPOINT, request).await
}

/// Named verification endpoint (`/api/authz/{name}`).
pub async fn verify_endpoint(
    Path(name): Path<String>,
    State(state): State<AppState>,
    request: Request,
) -> Result<Response, ApiError> {
    decide(&state, &name, request).await
}

async fn decide(state: &AppState, name: &str, request: Request) -> Result<Response, ApiError> {
    let Some(authz) = state.endpoint(name) else {
        tracing::debug!(endpoint = name, "Unknown authorization endpoint");
        return Err(ApiError::not_found(format!("authorization endpoint '{name}' not found")));
    };

    let (parts, _body) = request.into_parts();
    let deadline = tokio::time::sleep(state.request_timeout);

    Ok(authz.handle(&parts, deadline).await)
}
