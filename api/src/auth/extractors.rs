use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use axum_extra::extract::TypedHeader;
use db::models::user_session::Model as UserSession;
use headers::{Authorization, authorization::Bearer};
use util::state::AppState;

/// Authenticated caller, resolved from the `Authorization` header.
///
/// The bearer token is looked up in `user_sessions` with its expiry checked
/// in the query, so an expired token fails exactly like a bogus one.
///
/// # Errors
/// - Returns `401 Unauthorized` if the header is missing, malformed, or the
///   token is unknown or expired.
///
/// # Example
/// ```ignore
/// async fn protected_route(session: AuthSession) -> impl IntoResponse {
///     // session.user_id identifies the caller
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user_id: i64,
    pub token: String,
}

impl FromRequestParts<AppState> for AuthSession {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    (
                        StatusCode::UNAUTHORIZED,
                        "Missing or invalid Authorization header",
                    )
                })?;

        let token = bearer.token().to_owned();
        let user_id = UserSession::resolve_user_id(state.db(), &token)
            .await
            .map_err(|_| (StatusCode::UNAUTHORIZED, "Session lookup failed"))?
            .ok_or((StatusCode::UNAUTHORIZED, "Invalid or expired session"))?;

        Ok(AuthSession { user_id, token })
    }
}
