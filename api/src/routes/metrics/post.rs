use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use db::models::aws_account::Model as AwsAccount;
use db::models::monitored_resource::Model as MonitoredResource;
use monitor::GLOBAL_METRICS_REGION;
use monitor::credentials::AwsCredentials;
use monitor::fetch::{CloudWatchSource, Fetcher};
use monitor::orchestrate::{ApiGatewayTarget, DashboardSnapshot, MonitoringPlan, Target, aggregate};
use monitor::settings::SettingsStore;
use monitor::types::DeploymentInfo;
use serde::{Deserialize, Serialize};
use util::{config, format_validation_errors, state::AppState};
use validator::Validate;

use crate::auth::AuthSession;
use crate::response::ApiResponse;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MetricsRequest {
    #[validate(length(min = 1, message = "Access key id is required"))]
    pub access_key_id: String,

    #[validate(length(min = 1, message = "Secret access key is required"))]
    pub secret_access_key: String,

    #[validate(length(min = 1, message = "Region is required"))]
    pub region: String,

    /// When set, the account's stored enabled resources seed the plan and
    /// the per-type fields below only fill the gaps.
    pub account_id: Option<String>,

    pub ec2_instance_id: Option<String>,
    pub rds_instance_id: Option<String>,
    pub lambda_function_name: Option<String>,
    pub api_gateway_id: Option<String>,
    pub api_gateway_stage: Option<String>,
}

/// The snapshot plus the deployment metadata the dashboard header shows.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsResponse {
    #[serde(flatten)]
    pub snapshot: DashboardSnapshot,
    pub deployment_info: DeploymentInfo,
}

/// POST /metrics
///
/// Aggregate a monitored account's metrics into one dashboard snapshot.
///
/// The plan is the union of the account's stored enabled resources and the
/// request's per-type fallbacks; the snapshot never partially fails because
/// individual metric failures already degraded to zero values inside the
/// fetcher.
///
/// ### Responses
/// - `200 OK` with the snapshot
/// - `400 Bad Request` on validation failure
/// - `404 Not Found` when `accountId` is not one of the caller's accounts
/// - `500 Internal Server Error` with a generic message on unexpected errors
pub async fn get_metrics(
    State(state): State<AppState>,
    session: AuthSession,
    Json(req): Json<MetricsRequest>,
) -> impl IntoResponse {
    if let Err(validation_errors) = req.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<Option<MetricsResponse>>::error(
                format_validation_errors(&validation_errors),
            )),
        );
    }

    let mut plan = MonitoringPlan::default();

    if let Some(account_id) = &req.account_id {
        match AwsAccount::find_for_user(state.db(), session.user_id, account_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return (
                    StatusCode::NOT_FOUND,
                    Json(ApiResponse::<Option<MetricsResponse>>::error(
                        "Account not found",
                    )),
                );
            }
            Err(e) => {
                tracing::error!(error = %e, "account lookup failed");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponse::<Option<MetricsResponse>>::error(
                        "Failed to aggregate metrics",
                    )),
                );
            }
        }

        let resources =
            match MonitoredResource::list_enabled_for_account(state.db(), account_id).await {
                Ok(resources) => resources,
                Err(e) => {
                    tracing::error!(error = %e, "resource lookup failed");
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(ApiResponse::<Option<MetricsResponse>>::error(
                            "Failed to aggregate metrics",
                        )),
                    );
                }
            };

        seed_plan(&mut plan, &resources, req.api_gateway_stage.as_deref());
    }

    apply_fallbacks(&mut plan, &req);

    // Configuration errors are caught before any provider call is issued.
    if plan.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<Option<MetricsResponse>>::error(
                "No monitored resources configured for this request",
            )),
        );
    }

    let store = SettingsStore::from_default_chain(config::settings_parameter_name()).await;
    let thresholds = store.load().await.thresholds;

    let credentials = AwsCredentials::new(req.access_key_id, req.secret_access_key);
    let timeout = config::metric_call_timeout_secs();
    let regional = Fetcher::new(CloudWatchSource::new(&credentials, &req.region), timeout);
    let global = Fetcher::new(
        CloudWatchSource::new(&credentials, GLOBAL_METRICS_REGION),
        timeout,
    );

    let snapshot = aggregate(&regional, &global, &plan, &thresholds).await;
    let response = MetricsResponse {
        snapshot,
        deployment_info: DeploymentInfo::gather(&config::build_id(), &config::git_branch()),
    };
    (
        StatusCode::OK,
        Json(ApiResponse::success(Some(response), "Metrics aggregated")),
    )
}

fn target_for(resource: &MonitoredResource) -> Target {
    if resource.resource_name.is_empty() {
        Target::new(resource.resource_id.clone())
    } else {
        Target::named(resource.resource_id.clone(), resource.resource_name.clone())
    }
}

/// Fills the plan from the account's stored enabled resources. Single-target
/// slots take the first resource of their type; lambdas all fan out.
fn seed_plan(plan: &mut MonitoringPlan, resources: &[MonitoredResource], stage: Option<&str>) {
    for resource in resources {
        match resource.resource_type.as_str() {
            "ec2" if plan.ec2_instance.is_none() => {
                plan.ec2_instance = Some(target_for(resource));
            }
            "rds" if plan.rds_instance.is_none() => {
                plan.rds_instance = Some(target_for(resource));
            }
            "lambda" => plan.lambda_functions.push(resource.resource_id.clone()),
            "api_gateway" if plan.api_gateway.is_none() => {
                plan.api_gateway = Some(ApiGatewayTarget {
                    api_id: resource.resource_id.clone(),
                    stage: stage.unwrap_or("prod").to_owned(),
                });
            }
            "cloudfront" if plan.cloudfront_distribution.is_none() => {
                plan.cloudfront_distribution = Some(target_for(resource));
            }
            "s3" if plan.s3_bucket.is_none() => {
                plan.s3_bucket = Some(target_for(resource));
            }
            "route53" if plan.route53_health_check.is_none() => {
                plan.route53_health_check = Some(target_for(resource));
            }
            _ => {}
        }
    }
}

/// Request-level per-type fields only fill slots the stored resources left
/// empty.
fn apply_fallbacks(plan: &mut MonitoringPlan, req: &MetricsRequest) {
    if plan.ec2_instance.is_none() {
        if let Some(id) = req.ec2_instance_id.as_deref().filter(|s| !s.is_empty()) {
            plan.ec2_instance = Some(Target::new(id));
        }
    }
    if plan.rds_instance.is_none() {
        if let Some(id) = req.rds_instance_id.as_deref().filter(|s| !s.is_empty()) {
            plan.rds_instance = Some(Target::new(id));
        }
    }
    if let Some(name) = req.lambda_function_name.as_deref().filter(|s| !s.is_empty()) {
        if !plan.lambda_functions.iter().any(|f| f == name) {
            plan.lambda_functions.push(name.to_owned());
        }
    }
    if plan.api_gateway.is_none() {
        if let Some(id) = req.api_gateway_id.as_deref().filter(|s| !s.is_empty()) {
            plan.api_gateway = Some(ApiGatewayTarget {
                api_id: id.to_owned(),
                stage: req
                    .api_gateway_stage
                    .clone()
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| "prod".to_owned()),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(resource_type: &str, id: &str) -> MonitoredResource {
        MonitoredResource {
            id: 0,
            aws_account_id: "acct".to_owned(),
            resource_type: resource_type.to_owned(),
            resource_id: id.to_owned(),
            resource_name: String::new(),
            is_enabled: true,
        }
    }

    fn request() -> MetricsRequest {
        MetricsRequest {
            access_key_id: "AKIA".to_owned(),
            secret_access_key: "secret".to_owned(),
            region: "ap-southeast-1".to_owned(),
            account_id: None,
            ec2_instance_id: None,
            rds_instance_id: None,
            lambda_function_name: None,
            api_gateway_id: None,
            api_gateway_stage: None,
        }
    }

    #[test]
    fn stored_resources_win_over_request_fallbacks() {
        let mut plan = MonitoringPlan::default();
        seed_plan(
            &mut plan,
            &[resource("ec2", "i-stored"), resource("lambda", "fn-a")],
            None,
        );

        let mut req = request();
        req.ec2_instance_id = Some("i-fallback".to_owned());
        req.lambda_function_name = Some("fn-b".to_owned());
        apply_fallbacks(&mut plan, &req);

        assert_eq!(plan.ec2_instance.as_ref().unwrap().id, "i-stored");
        assert_eq!(plan.lambda_functions, vec!["fn-a", "fn-b"]);
    }

    #[test]
    fn fallbacks_fill_empty_slots() {
        let mut plan = MonitoringPlan::default();
        let mut req = request();
        req.rds_instance_id = Some("db-1".to_owned());
        req.api_gateway_id = Some("api-1".to_owned());
        apply_fallbacks(&mut plan, &req);

        assert_eq!(plan.rds_instance.as_ref().unwrap().id, "db-1");
        let gateway = plan.api_gateway.as_ref().unwrap();
        assert_eq!(gateway.api_id, "api-1");
        assert_eq!(gateway.stage, "prod");
        assert!(plan.ec2_instance.is_none());
    }

    #[test]
    fn duplicate_lambda_fallback_is_ignored() {
        let mut plan = MonitoringPlan::default();
        seed_plan(&mut plan, &[resource("lambda", "fn-a")], None);

        let mut req = request();
        req.lambda_function_name = Some("fn-a".to_owned());
        apply_fallbacks(&mut plan, &req);

        assert_eq!(plan.lambda_functions, vec!["fn-a"]);
    }

    #[test]
    fn single_target_slots_take_the_first_of_each_type() {
        let mut plan = MonitoringPlan::default();
        seed_plan(
            &mut plan,
            &[
                resource("ec2", "i-first"),
                resource("ec2", "i-second"),
                resource("cloudfront", "E1"),
                resource("s3", "bucket"),
                resource("route53", "hc-1"),
            ],
            None,
        );

        assert_eq!(plan.ec2_instance.as_ref().unwrap().id, "i-first");
        assert_eq!(plan.cloudfront_distribution.as_ref().unwrap().id, "E1");
        assert_eq!(plan.s3_bucket.as_ref().unwrap().id, "bucket");
        assert_eq!(plan.route53_health_check.as_ref().unwrap().id, "hc-1");
    }
}
