use axum::{Json, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use monitor::GLOBAL_METRICS_REGION;
use monitor::fetch::{CloudWatchSource, Fetcher};
use monitor::orchestrate::{ApiGatewayTarget, MonitoringPlan, Target, aggregate};
use monitor::settings::{MonitoringSettings, SettingsStore};
use monitor::types::{DeploymentInfo, HealthStatus, response_timestamp};
use serde::Serialize;
use util::config;

use crate::response::ApiResponse;

#[derive(Debug, Serialize, Default)]
pub struct PingResponse {
    pub status: String,
    pub timestamp: String,
}

/// GET /health/ping
///
/// Liveness probe. Always `200 OK` while the process is serving.
pub async fn ping() -> impl IntoResponse {
    let response = PingResponse {
        status: "healthy".to_owned(),
        timestamp: response_timestamp(Utc::now()),
    };
    (
        StatusCode::OK,
        Json(ApiResponse::success(response, "Service is up")),
    )
}

/// GET /health/deployment
///
/// Deployment metadata baked in at deploy time (`BUILD_ID`, `GIT_BRANCH`).
pub async fn deployment() -> impl IntoResponse {
    let info = DeploymentInfo::gather(&config::build_id(), &config::git_branch());
    (
        StatusCode::OK,
        Json(ApiResponse::success(info, "Deployment info gathered")),
    )
}

/// GET /health/status
///
/// Derived subsystem health for the deployment's own account, using the
/// saved monitoring settings and the ambient AWS credential chain. Provider
/// failures degrade inside the fetcher, so this never returns an error for
/// missing metrics.
pub async fn status() -> impl IntoResponse {
    let health = gather_health_status().await;
    (
        StatusCode::OK,
        Json(ApiResponse::success(health, "Health status evaluated")),
    )
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthOverview {
    pub health_status: HealthStatus,
    pub deployment_info: DeploymentInfo,
    pub timestamp: String,
}

/// GET /health
///
/// Combined health overview: subsystem status and deployment info, gathered
/// concurrently.
pub async fn health() -> impl IntoResponse {
    let status_fut = gather_health_status();
    let deployment_fut = async { DeploymentInfo::gather(&config::build_id(), &config::git_branch()) };
    let (health_status, deployment_info) = tokio::join!(status_fut, deployment_fut);

    let overview = HealthOverview {
        health_status,
        deployment_info,
        timestamp: response_timestamp(Utc::now()),
    };
    (
        StatusCode::OK,
        Json(ApiResponse::success(overview, "Health overview gathered")),
    )
}

/// Monitoring plan for the deployment's own account, from the saved settings.
fn plan_from_settings(settings: &MonitoringSettings) -> MonitoringPlan {
    let mut plan = MonitoringPlan::default();

    if !settings.ec2.instance_id.is_empty() {
        plan.ec2_instance = Some(Target::new(settings.ec2.instance_id.clone()));
    }
    if !settings.rds.db_instance_identifier.is_empty() {
        plan.rds_instance = Some(Target::new(settings.rds.db_instance_identifier.clone()));
    }
    plan.lambda_functions = settings.serverless.lambda_function_names.clone();
    if !settings.serverless.api_gateway_id.is_empty() {
        plan.api_gateway = Some(ApiGatewayTarget {
            api_id: settings.serverless.api_gateway_id.clone(),
            stage: settings.serverless.api_gateway_stage.clone(),
        });
    }

    plan
}

async fn gather_health_status() -> HealthStatus {
    let store = SettingsStore::from_default_chain(config::settings_parameter_name()).await;
    let settings = store.load().await;
    let plan = plan_from_settings(&settings);

    let timeout = config::metric_call_timeout_secs();
    let regional = Fetcher::new(
        CloudWatchSource::from_default_chain(Some(settings.aws.region.clone())).await,
        timeout,
    );
    let global = Fetcher::new(
        CloudWatchSource::from_default_chain(Some(GLOBAL_METRICS_REGION.to_owned())).await,
        timeout,
    );

    aggregate(&regional, &global, &plan, &settings.thresholds)
        .await
        .health
}
