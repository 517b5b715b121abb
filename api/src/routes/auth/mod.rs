//! # auth Routes Module
//!
//! This module defines and wires up routes for the `/auth` endpoint group.
//!
//! ## Structure
//! - `post.rs` — POST handlers (login, session and password management)
//!
//! ## Usage
//! The `auth_routes()` function returns a `Router` which is nested under
//! `/auth` in the main application.

pub mod post;

use axum::{Router, routing::post};
use util::state::AppState;

use post::{login, reset_password, validate_session, verify_email};

/// Builds the `/auth` route group, mapping HTTP methods to handlers.
///
/// - `POST /auth/login` → `login`
/// - `POST /auth/verify-email` → `verify_email`
/// - `POST /auth/reset-password` → `reset_password`
/// - `POST /auth/validate-session` → `validate_session`
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/verify-email", post(verify_email))
        .route("/reset-password", post(reset_password))
        .route("/validate-session", post(validate_session))
}
