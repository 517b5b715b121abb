//! # metrics Routes Module
//!
//! This module defines and wires up routes for the `/metrics` endpoint
//! group: the one-call aggregation of a monitored account's CloudWatch
//! metrics into a dashboard snapshot.
//!
//! ## Structure
//! - `post.rs` — POST handler (aggregate metrics for an account)

pub mod post;

use axum::{Router, routing::post};
use util::state::AppState;

use post::get_metrics;

/// Builds the `/metrics` route group, mapping HTTP methods to handlers.
///
/// - `POST /metrics` → `get_metrics`
pub fn metrics_routes() -> Router<AppState> {
    Router::new().route("/", post(get_metrics))
}
