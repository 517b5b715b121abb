use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use db::models::aws_account::{AccountInput, Model as AwsAccount};
use db::models::monitored_resource::{Model as MonitoredResource, ResourceInput};
use monitor::credentials::AwsCredentials;
use monitor::discovery::{self, DiscoveredResources};
use monitor::settings::{MonitoringSettings, SettingsStore};
use serde::Deserialize;
use util::{config, format_validation_errors, state::AppState};
use validator::Validate;

use crate::auth::AuthSession;
use crate::response::ApiResponse;

/// POST /settings
///
/// Persist the dashboard settings blob to Parameter Store. The stored copy,
/// with its fresh `updatedAt` stamp, is echoed back.
pub async fn save_settings(Json(settings): Json<MonitoringSettings>) -> impl IntoResponse {
    let store = SettingsStore::from_default_chain(config::settings_parameter_name()).await;
    match store.save(settings).await {
        Ok(saved) => (
            StatusCode::OK,
            Json(ApiResponse::success(saved, "Settings saved")),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<MonitoringSettings>::error(format!(
                "Failed to save settings: {e}"
            ))),
        ),
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsRequest {
    #[validate(length(min = 1, message = "Access key id is required"))]
    pub access_key_id: String,

    #[validate(length(min = 1, message = "Secret access key is required"))]
    pub secret_access_key: String,

    #[validate(length(min = 1, message = "Region is required"))]
    pub region: String,
}

/// POST /settings/validate-credentials
///
/// Make the cheapest authenticated CloudWatch call with the supplied key
/// pair. The provider's own error message is passed through on failure so
/// the operator can see exactly what AWS rejected.
///
/// ### Responses
/// - `200 OK` when the credentials work
/// - `400 Bad Request` with the AWS error otherwise
pub async fn validate_credentials(
    _session: AuthSession,
    Json(req): Json<CredentialsRequest>,
) -> impl IntoResponse {
    if let Err(validation_errors) = req.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error(format_validation_errors(
                &validation_errors,
            ))),
        );
    }

    let credentials = AwsCredentials::new(req.access_key_id, req.secret_access_key);
    match discovery::validate_credentials(&credentials, &req.region).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::success((), "Credentials are valid")),
        ),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error(e.to_string())),
        ),
    }
}

/// POST /settings/discover-resources
///
/// List the monitorable EC2, RDS, Lambda and S3 resources visible to the
/// supplied credentials. Each service degrades to an empty list on error so
/// one missing permission does not hide the rest.
pub async fn discover_resources(
    _session: AuthSession,
    Json(req): Json<CredentialsRequest>,
) -> impl IntoResponse {
    if let Err(validation_errors) = req.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<DiscoveredResources>::error(
                format_validation_errors(&validation_errors),
            )),
        );
    }

    let credentials = AwsCredentials::new(req.access_key_id, req.secret_access_key);
    let discovered = discovery::discover_resources(&credentials, &req.region).await;
    (
        StatusCode::OK,
        Json(ApiResponse::success(discovered, "Resources discovered")),
    )
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AccountRequest {
    #[validate(length(min = 1, message = "Account id is required"))]
    pub id: String,

    #[validate(length(min = 1, message = "Account name is required"))]
    pub account_name: String,

    pub account_id: String,

    #[validate(length(min = 1, message = "Access key id is required"))]
    pub access_key_id: String,

    #[validate(length(min = 1, message = "Secret access key is required"))]
    pub secret_access_key: String,

    #[validate(length(min = 1, message = "Region is required"))]
    pub region: String,

    #[serde(default)]
    pub is_validated: bool,
}

/// POST /settings/accounts
///
/// Register an AWS account, or update it in place when the id already
/// belongs to the caller.
pub async fn upsert_account(
    State(state): State<AppState>,
    session: AuthSession,
    Json(req): Json<AccountRequest>,
) -> impl IntoResponse {
    if let Err(validation_errors) = req.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<Option<AwsAccount>>::error(
                format_validation_errors(&validation_errors),
            )),
        );
    }

    let input = AccountInput {
        id: req.id,
        account_name: req.account_name,
        account_id: req.account_id,
        access_key_id: req.access_key_id,
        secret_access_key: req.secret_access_key,
        region: req.region,
        is_validated: req.is_validated,
    };

    match AwsAccount::upsert(state.db(), session.user_id, input).await {
        Ok(account) => (
            StatusCode::OK,
            Json(ApiResponse::success(Some(account), "Account saved")),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<Option<AwsAccount>>::error(format!(
                "Database error: {e}"
            ))),
        ),
    }
}

/// POST /settings/accounts/{account_id}/resources
///
/// Replace the account's full monitored-resource set with the posted list.
pub async fn replace_resources(
    State(state): State<AppState>,
    session: AuthSession,
    Path(account_id): Path<String>,
    Json(resources): Json<Vec<ResourceInput>>,
) -> impl IntoResponse {
    match AwsAccount::find_for_user(state.db(), session.user_id, &account_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<()>::error("Account not found")),
            );
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error(format!("Database error: {e}"))),
            );
        }
    }

    match MonitoredResource::replace_for_account(state.db(), &account_id, resources).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::success((), "Resources saved")),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<()>::error(format!("Database error: {e}"))),
        ),
    }
}
