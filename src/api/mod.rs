// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{any, get},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub mod authz;
pub mod health;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/verify", any(authz::verify_legacy))
        .route("/api/authz/{name}", any(authz::verify_endpoint))
        .route("/health", get(health::health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
