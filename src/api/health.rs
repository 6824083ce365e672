// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::AppState;

/// Liveness response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    /// Configured authorization endpoints.
    pub endpoints: Vec<String>,
}

/// Liveness probe handler.
///
/// Always returns 200 if the process is running. Collaborators are not
/// probed: they are consulted per request and fail closed.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        endpoints: state.endpoint_names(),
    })
}
