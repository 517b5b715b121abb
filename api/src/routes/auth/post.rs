use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::SecondsFormat;
use db::models::user::Model as User;
use db::models::user_session::Model as UserSession;
use serde::{Deserialize, Serialize};
use util::{config, format_validation_errors, state::AppState};
use validator::Validate;

use crate::response::ApiResponse;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize, Default)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub admin: bool,
}

#[derive(Debug, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub session_token: String,
    pub expires_at: String,
    pub user: UserInfo,
}

/// POST /auth/login
///
/// Verify credentials and issue a bearer session token.
///
/// ### Request Body
/// ```json
/// {
///   "username": "admin",
///   "password": "strongpassword"
/// }
/// ```
///
/// ### Responses
///
/// - `200 OK`
/// ```json
/// {
///   "success": true,
///   "data": {
///     "sessionToken": "9f8e...",
///     "expiresAt": "2025-08-16T11:00:00Z",
///     "user": { "id": 1, "username": "admin", "email": "a@b.c", "admin": true }
///   },
///   "message": "Login successful"
/// }
/// ```
///
/// - `401 Unauthorized` (bad credentials)
/// - `400 Bad Request` (validation failure)
/// - `500 Internal Server Error`
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> impl IntoResponse {
    if let Err(validation_errors) = req.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<LoginResponse>::error(
                format_validation_errors(&validation_errors),
            )),
        );
    }

    let user = match User::verify_credentials(state.db(), &req.username, &req.password).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(ApiResponse::<LoginResponse>::error(
                    "Invalid username or password",
                )),
            );
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<LoginResponse>::error(format!(
                    "Database error: {e}"
                ))),
            );
        }
    };

    match UserSession::create(state.db(), user.id, config::session_duration_hours()).await {
        Ok(session) => {
            let response = LoginResponse {
                session_token: session.session_token,
                expires_at: session
                    .expires_at
                    .to_rfc3339_opts(SecondsFormat::Micros, true),
                user: UserInfo {
                    id: user.id,
                    username: user.username,
                    email: user.email,
                    admin: user.admin,
                },
            };
            (
                StatusCode::OK,
                Json(ApiResponse::success(response, "Login successful")),
            )
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<LoginResponse>::error(format!(
                "Database error: {e}"
            ))),
        ),
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct VerifyEmailRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

#[derive(Debug, Serialize, Default)]
pub struct VerifyEmailResponse {
    pub exists: bool,
}

/// POST /auth/verify-email
///
/// Check whether an account exists for the given email, as the first step of
/// the password reset flow.
///
/// ### Responses
/// - `200 OK` when the email is registered
/// - `404 Not Found` when it is not
pub async fn verify_email(
    State(state): State<AppState>,
    Json(req): Json<VerifyEmailRequest>,
) -> impl IntoResponse {
    if let Err(validation_errors) = req.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<VerifyEmailResponse>::error(
                format_validation_errors(&validation_errors),
            )),
        );
    }

    match User::find_by_email(state.db(), &req.email).await {
        Ok(Some(_)) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                VerifyEmailResponse { exists: true },
                "Email verified",
            )),
        ),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<VerifyEmailResponse>::error(
                "No account with this email",
            )),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<VerifyEmailResponse>::error(format!(
                "Database error: {e}"
            ))),
        ),
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub new_password: String,
}

/// POST /auth/reset-password
///
/// Replace the password of the account registered under the given email.
///
/// ### Responses
/// - `200 OK` on success
/// - `400 Bad Request` on validation failure or unknown email
pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> impl IntoResponse {
    if let Err(validation_errors) = req.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error(format_validation_errors(
                &validation_errors,
            ))),
        );
    }

    match User::reset_password(state.db(), &req.email, &req.new_password).await {
        Ok(true) => (
            StatusCode::OK,
            Json(ApiResponse::success((), "Password updated")),
        ),
        Ok(false) => (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error("No account with this email")),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<()>::error(format!("Database error: {e}"))),
        ),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateSessionRequest {
    pub session_token: String,
}

#[derive(Debug, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ValidateSessionResponse {
    pub is_valid: bool,
}

/// POST /auth/validate-session
///
/// Check whether a session token is known and unexpired. Always `200 OK`;
/// the verdict is in the body.
pub async fn validate_session(
    State(state): State<AppState>,
    Json(req): Json<ValidateSessionRequest>,
) -> impl IntoResponse {
    match UserSession::is_valid(state.db(), &req.session_token).await {
        Ok(is_valid) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                ValidateSessionResponse { is_valid },
                "Session checked",
            )),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<ValidateSessionResponse>::error(format!(
                "Database error: {e}"
            ))),
        ),
    }
}
