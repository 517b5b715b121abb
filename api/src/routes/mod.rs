//! HTTP route entry point for `/api/...`.
//!
//! Route groups include:
//! - `/health` → liveness, deployment info and derived system health (public)
//! - `/auth` → authentication endpoints (login, session handling, public)
//! - `/settings` → dashboard settings, account and resource management
//! - `/metrics` → one-call metrics aggregation for a monitored account

use axum::Router;
use util::state::AppState;

pub mod auth;
pub mod health;
pub mod metrics;
pub mod settings;

/// Builds the complete application router for all HTTP endpoints.
///
/// The returned router is fully stated and ready to be nested under `/api`.
/// Protected handlers authenticate through the `AuthSession` extractor
/// rather than a route-layer guard, since every group mixes public and
/// protected endpoints.
pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .nest("/health", health::health_routes())
        .nest("/auth", auth::auth_routes())
        .nest("/settings", settings::settings_routes())
        .nest("/metrics", metrics::metrics_routes())
        .with_state(app_state)
}
