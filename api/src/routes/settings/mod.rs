//! # settings Routes Module
//!
//! This module defines and wires up routes for the `/settings` endpoint
//! group: the SSM-backed dashboard settings blob, credential validation,
//! resource discovery, and the account / monitored-resource registry.
//!
//! ## Structure
//! - `get.rs` — GET handlers (settings, validation flags, accounts, resources)
//! - `post.rs` — POST handlers (save settings, validate credentials,
//!   discover resources, upsert accounts, replace resources)
//! - `delete.rs` — DELETE handlers (account removal)

pub mod delete;
pub mod get;
pub mod post;

use axum::{
    Router,
    routing::{delete, get, post},
};
use util::state::AppState;

use delete::delete_account;
use get::{get_settings, list_accounts, list_resources, validate_settings};
use post::{
    discover_resources, replace_resources, save_settings, upsert_account, validate_credentials,
};

/// Builds the `/settings` route group, mapping HTTP methods to handlers.
///
/// - `GET /settings` → `get_settings`
/// - `POST /settings` → `save_settings`
/// - `GET /settings/validate` → `validate_settings`
/// - `POST /settings/validate-credentials` → `validate_credentials`
/// - `POST /settings/discover-resources` → `discover_resources`
/// - `GET /settings/accounts` → `list_accounts`
/// - `POST /settings/accounts` → `upsert_account`
/// - `DELETE /settings/accounts/{id}` → `delete_account`
/// - `GET /settings/accounts/{account_id}/resources` → `list_resources`
/// - `POST /settings/accounts/{account_id}/resources` → `replace_resources`
pub fn settings_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_settings).post(save_settings))
        .route("/validate", get(validate_settings))
        .route("/validate-credentials", post(validate_credentials))
        .route("/discover-resources", post(discover_resources))
        .route("/accounts", get(list_accounts).post(upsert_account))
        .route("/accounts/{id}", delete(delete_account))
        .route(
            "/accounts/{account_id}/resources",
            get(list_resources).post(replace_resources),
        )
}
