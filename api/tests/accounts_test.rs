use axum::http::StatusCode;
use serde_json::json;
use serial_test::serial;
use tower::util::ServiceExt;

mod helpers;
use helpers::app::{auth_user, authed_json_request, make_test_app, response_json};

fn account_body(id: &str, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "accountName": name,
        "accountId": "123456789012",
        "accessKeyId": "AKIAEXAMPLE",
        "secretAccessKey": "secret",
        "region": "ap-southeast-1",
        "isValidated": false
    })
}

#[tokio::test]
#[serial]
async fn upsert_then_list_returns_the_account() {
    let (app, db) = make_test_app().await;
    let (_user_id, token) = auth_user(&db, "alice").await;

    let response = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/api/settings/accounts",
            &token,
            account_body("acct-1", "Production"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Same id again updates in place instead of duplicating.
    let response = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/api/settings/accounts",
            &token,
            account_body("acct-1", "Production (renamed)"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(authed_json_request(
            "GET",
            "/api/settings/accounts",
            &token,
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let accounts = body["data"].as_array().unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0]["account_name"], "Production (renamed)");
}

#[tokio::test]
#[serial]
async fn accounts_are_scoped_to_their_owner() {
    let (app, db) = make_test_app().await;
    let (_alice_id, alice_token) = auth_user(&db, "alice").await;
    let (_bob_id, bob_token) = auth_user(&db, "bob").await;

    let response = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/api/settings/accounts",
            &alice_token,
            account_body("acct-1", "Alice's"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Bob cannot see or delete Alice's account.
    let response = app
        .clone()
        .oneshot(authed_json_request(
            "GET",
            "/api/settings/accounts",
            &bob_token,
            json!({}),
        ))
        .await
        .unwrap();
    let body = response_json(response).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let response = app
        .clone()
        .oneshot(authed_json_request(
            "DELETE",
            "/api/settings/accounts/acct-1",
            &bob_token,
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(authed_json_request(
            "DELETE",
            "/api/settings/accounts/acct-1",
            &alice_token,
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
#[serial]
async fn resource_save_replaces_the_previous_set() {
    let (app, db) = make_test_app().await;
    let (_user_id, token) = auth_user(&db, "alice").await;

    let response = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/api/settings/accounts",
            &token,
            account_body("acct-1", "Production"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/api/settings/accounts/acct-1/resources",
            &token,
            json!([
                {"type": "ec2", "resource_id": "i-old", "name": "old web"},
                {"type": "lambda", "resource_id": "fn-old", "name": "old fn"}
            ]),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/api/settings/accounts/acct-1/resources",
            &token,
            json!([
                {"type": "ec2", "resource_id": "i-new", "name": "new web"}
            ]),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(authed_json_request(
            "GET",
            "/api/settings/accounts/acct-1/resources",
            &token,
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let resources = body["data"].as_array().unwrap();
    assert_eq!(resources.len(), 1);
    assert_eq!(resources[0]["resource_id"], "i-new");
}

#[tokio::test]
#[serial]
async fn account_listing_embeds_enabled_global_resource_ids() {
    let (app, db) = make_test_app().await;
    let (_user_id, token) = auth_user(&db, "alice").await;

    let response = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/api/settings/accounts",
            &token,
            account_body("acct-1", "Production"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/api/settings/accounts/acct-1/resources",
            &token,
            json!([
                {"type": "cloudfront", "resource_id": "E123", "name": "cdn"},
                {"type": "s3", "resource_id": "assets-bucket", "name": "assets"},
                {"type": "route53", "resource_id": "hc-1", "name": "hc", "is_enabled": false}
            ]),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(authed_json_request(
            "GET",
            "/api/settings/accounts",
            &token,
            json!({}),
        ))
        .await
        .unwrap();
    let body = response_json(response).await;
    let account = &body["data"].as_array().unwrap()[0];
    assert_eq!(account["cloudfrontDistributionId"], "E123");
    assert_eq!(account["s3BucketName"], "assets-bucket");
    // Disabled resources are not embedded.
    assert!(account["route53HealthCheckId"].is_null());
}

#[tokio::test]
#[serial]
async fn resource_routes_reject_a_foreign_account() {
    let (app, db) = make_test_app().await;
    let (_alice_id, alice_token) = auth_user(&db, "alice").await;
    let (_bob_id, bob_token) = auth_user(&db, "bob").await;

    let response = app
        .clone()
        .oneshot(authed_json_request(
            "POST",
            "/api/settings/accounts",
            &alice_token,
            account_body("acct-1", "Alice's"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(authed_json_request(
            "POST",
            "/api/settings/accounts/acct-1/resources",
            &bob_token,
            json!([{"type": "ec2", "resource_id": "i-1", "name": "web"}]),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
