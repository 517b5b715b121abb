use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use db::models::aws_account::Model as AwsAccount;
use db::models::monitored_resource::Model as MonitoredResource;
use monitor::settings::{MonitoringSettings, SettingsStore, SettingsValidation};
use serde::Serialize;
use util::{config, state::AppState};

use crate::auth::AuthSession;
use crate::response::ApiResponse;

/// GET /settings
///
/// Current dashboard settings from Parameter Store. Missing or corrupt
/// parameters fall back to defaults, so this never fails for a fresh
/// deployment.
pub async fn get_settings() -> impl IntoResponse {
    let store = SettingsStore::from_default_chain(config::settings_parameter_name()).await;
    let settings = store.load().await;
    (
        StatusCode::OK,
        Json(ApiResponse::success(settings, "Settings loaded")),
    )
}

/// GET /settings/validate
///
/// Completeness flags of the saved settings, so the client can tell which
/// dashboard sections are configured.
pub async fn validate_settings() -> impl IntoResponse {
    let store = SettingsStore::from_default_chain(config::settings_parameter_name()).await;
    let settings: MonitoringSettings = store.load().await;
    let flags: SettingsValidation = settings.validation_flags();
    (
        StatusCode::OK,
        Json(ApiResponse::success(flags, "Settings validated")),
    )
}

/// One registered account with the ids of its enabled single-target
/// resources, so the client can render the dashboard without a second fetch.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    #[serde(flatten)]
    pub account: AwsAccount,
    pub cloudfront_distribution_id: Option<String>,
    pub s3_bucket_name: Option<String>,
    pub route53_health_check_id: Option<String>,
}

/// GET /settings/accounts
///
/// The caller's registered AWS accounts.
pub async fn list_accounts(
    State(state): State<AppState>,
    session: AuthSession,
) -> impl IntoResponse {
    let accounts = match AwsAccount::list_for_user(state.db(), session.user_id).await {
        Ok(accounts) => accounts,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<Vec<AccountSummary>>::error(format!(
                    "Database error: {e}"
                ))),
            );
        }
    };

    let mut summaries = Vec::with_capacity(accounts.len());
    for account in accounts {
        let resources =
            match MonitoredResource::list_enabled_for_account(state.db(), &account.id).await {
                Ok(resources) => resources,
                Err(e) => {
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(ApiResponse::<Vec<AccountSummary>>::error(format!(
                            "Database error: {e}"
                        ))),
                    );
                }
            };

        let pick = |resource_type: &str| {
            resources
                .iter()
                .find(|r| r.resource_type == resource_type)
                .map(|r| r.resource_id.clone())
        };

        summaries.push(AccountSummary {
            cloudfront_distribution_id: pick("cloudfront"),
            s3_bucket_name: pick("s3"),
            route53_health_check_id: pick("route53"),
            account,
        });
    }

    (
        StatusCode::OK,
        Json(ApiResponse::success(summaries, "Accounts listed")),
    )
}

/// GET /settings/accounts/{account_id}/resources
///
/// All monitored resources saved under one of the caller's accounts,
/// enabled or not.
pub async fn list_resources(
    State(state): State<AppState>,
    session: AuthSession,
    Path(account_id): Path<String>,
) -> impl IntoResponse {
    match AwsAccount::find_for_user(state.db(), session.user_id, &account_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<Vec<MonitoredResource>>::error(
                    "Account not found",
                )),
            );
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<Vec<MonitoredResource>>::error(format!(
                    "Database error: {e}"
                ))),
            );
        }
    }

    match MonitoredResource::list_for_account(state.db(), &account_id).await {
        Ok(resources) => (
            StatusCode::OK,
            Json(ApiResponse::success(resources, "Resources listed")),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<Vec<MonitoredResource>>::error(format!(
                "Database error: {e}"
            ))),
        ),
    }
}
