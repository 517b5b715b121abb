use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;
use serial_test::serial;
use tower::util::ServiceExt;

mod helpers;
use helpers::app::{auth_user, authed_json_request, make_test_app, response_json};

#[tokio::test]
#[serial]
async fn ping_reports_healthy_with_a_timestamp() {
    let (app, _db) = make_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health/ping")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["status"], "healthy");
    let timestamp = body["data"]["timestamp"].as_str().unwrap();
    assert!(timestamp.ends_with('Z'));
    assert!(timestamp.contains('.'));
}

#[tokio::test]
#[serial]
async fn deployment_info_carries_the_build_id() {
    let (app, _db) = make_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health/deployment")
                .method("GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let build_id = body["data"]["buildId"].as_str().unwrap();
    assert!(build_id.starts_with("build-"));
    assert_eq!(body["data"]["status"], "success");
}

#[tokio::test]
#[serial]
async fn metrics_requires_a_session() {
    let (app, _db) = make_test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/metrics")
                .method("POST")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({"accessKeyId": "k", "secretAccessKey": "s", "region": "r"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[serial]
async fn metrics_rejects_missing_credentials_before_touching_the_provider() {
    let (app, db) = make_test_app().await;
    let (_user_id, token) = auth_user(&db, "alice").await;

    let response = app
        .oneshot(authed_json_request(
            "POST",
            "/api/metrics",
            &token,
            json!({"accessKeyId": "", "secretAccessKey": "", "region": ""}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
#[serial]
async fn metrics_rejects_a_request_naming_no_resources() {
    let (app, db) = make_test_app().await;
    let (_user_id, token) = auth_user(&db, "alice").await;

    let response = app
        .oneshot(authed_json_request(
            "POST",
            "/api/metrics",
            &token,
            json!({
                "accessKeyId": "AKIAEXAMPLE",
                "secretAccessKey": "secret",
                "region": "ap-southeast-1"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[serial]
async fn metrics_rejects_an_unknown_account_id() {
    let (app, db) = make_test_app().await;
    let (_user_id, token) = auth_user(&db, "alice").await;

    let response = app
        .oneshot(authed_json_request(
            "POST",
            "/api/metrics",
            &token,
            json!({
                "accessKeyId": "AKIAEXAMPLE",
                "secretAccessKey": "secret",
                "region": "ap-southeast-1",
                "accountId": "no-such-account"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
