use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use db::models::aws_account::Model as AwsAccount;
use util::state::AppState;

use crate::auth::AuthSession;
use crate::response::ApiResponse;

/// DELETE /settings/accounts/{id}
///
/// Remove one of the caller's accounts. Its monitored resources go with it
/// via the foreign-key cascade. Deleting someone else's account id reports
/// `404`, the same as a nonexistent one.
pub async fn delete_account(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match AwsAccount::delete_for_user(state.db(), session.user_id, &id).await {
        Ok(true) => (
            StatusCode::OK,
            Json(ApiResponse::success((), "Account deleted")),
        ),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<()>::error("Account not found")),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<()>::error(format!("Database error: {e}"))),
        ),
    }
}
