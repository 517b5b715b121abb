//! # health Routes Module
//!
//! This module defines and wires up routes for the `/health` endpoint group.
//!
//! ## Structure
//! - `get.rs` — GET handlers (ping, deployment info, derived system health)
//!
//! ## Usage
//! The `health_routes()` function returns a `Router` which is nested under
//! `/health` in the main application.

pub mod get;

use axum::{Router, routing::get};
use util::state::AppState;

use get::{deployment, health, ping, status};

/// Builds the `/health` route group, mapping HTTP methods to handlers.
///
/// - `GET /health` → `health` (combined status + deployment overview)
/// - `GET /health/ping` → `ping`
/// - `GET /health/deployment` → `deployment`
/// - `GET /health/status` → `status`
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health))
        .route("/ping", get(ping))
        .route("/deployment", get(deployment))
        .route("/status", get(status))
}
