// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Portal Authz - Reverse Proxy Authorization Service
//!
//! Answers the authorization sub-request a reverse proxy issues for every
//! client request (Traefik/Caddy forward-auth, NGINX `auth_request`, and the
//! legacy combination) with an Allow or Deny decision.
//!
//! ## Modules
//!
//! - `api` - HTTP handlers (Axum)
//! - `authz` - Authorization decision engine
//! - `config` - Configuration file and environment
//! - `providers` - In-process users, sessions and access rules

pub mod api;
pub mod authz;
pub mod config;
pub mod error;
pub mod providers;
pub mod state;
