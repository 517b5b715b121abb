use api::routes::routes;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::Request;
use axum::response::Response;
use db::models::user::Model as User;
use db::models::user_session::Model as UserSession;
use db::test_utils::setup_test_db;
use sea_orm::DatabaseConnection;
use util::state::AppState;

/// Builds a full application router over a fresh in-memory database.
pub async fn make_test_app() -> (Router, DatabaseConnection) {
    let db = setup_test_db().await;
    let state = AppState::new(db.clone());
    let app = Router::new().nest("/api", routes(state));
    (app, db)
}

/// Creates a user and an active session, returning the user id and token.
pub async fn auth_user(db: &DatabaseConnection, username: &str) -> (i64, String) {
    let user = User::create(db, username, &format!("{username}@test.local"), "password123", false)
        .await
        .expect("Failed to create user");
    let session = UserSession::create(db, user.id, 24)
        .await
        .expect("Failed to create session");
    (user.id, session.session_token)
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method(method)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn authed_json_request(
    method: &str,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method(method)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn response_json(response: Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    serde_json::from_slice(&bytes).expect("Response body was not JSON")
}
