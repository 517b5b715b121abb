//! One-call aggregation of a monitoring plan into a dashboard snapshot.
//!
//! The plan is resolved at the request boundary (stored enabled resources
//! merged with request fallbacks); this module only fans it out. Every
//! applicable assembler runs concurrently and nothing short-circuits: a
//! failed constituent fetch already degraded inside the fetcher.

use crate::assemble::Assembler;
use crate::fetch::{Fetcher, MetricSource};
use crate::health::{self, Thresholds};
use crate::types::{
    ApiGatewayMetrics, CloudFrontMetrics, Ec2Metrics, HealthStatus, LambdaMetrics, RdsMetrics,
    Route53Metrics, S3Metrics, response_timestamp,
};
use chrono::Utc;
use serde::Serialize;

/// One monitored resource: provider identifier plus optional display name.
#[derive(Debug, Clone)]
pub struct Target {
    pub id: String,
    pub name: Option<String>,
}

impl Target {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }

    pub fn named(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiGatewayTarget {
    pub api_id: String,
    pub stage: String,
}

/// What to aggregate in one call: at most one target per resource type,
/// except lambdas which fan out over the whole enabled set.
#[derive(Debug, Clone, Default)]
pub struct MonitoringPlan {
    pub ec2_instance: Option<Target>,
    pub rds_instance: Option<Target>,
    pub lambda_functions: Vec<String>,
    pub api_gateway: Option<ApiGatewayTarget>,
    pub cloudfront_distribution: Option<Target>,
    pub s3_bucket: Option<Target>,
    pub route53_health_check: Option<Target>,
}

impl MonitoringPlan {
    /// True when no resource of any type is named.
    pub fn is_empty(&self) -> bool {
        self.ec2_instance.is_none()
            && self.rds_instance.is_none()
            && self.lambda_functions.is_empty()
            && self.api_gateway.is_none()
            && self.cloudfront_distribution.is_none()
            && self.s3_bucket.is_none()
            && self.route53_health_check.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub ec2: Option<Ec2Metrics>,
    pub rds: Option<RdsMetrics>,
    pub lambda: Vec<LambdaMetrics>,
    pub api_gateway: Option<ApiGatewayMetrics>,
    pub cloudfront: Option<CloudFrontMetrics>,
    pub s3: Option<S3Metrics>,
    pub route53: Option<Route53Metrics>,
    pub health: HealthStatus,
    pub timestamp: String,
}

/// Run every assembler named by the plan and derive health from the result.
///
/// CloudFront and Route53 metrics only exist in the global metrics region,
/// so those assemblers run against `global` while everything else uses the
/// account-region `regional` fetcher.
pub async fn aggregate<S: MetricSource, G: MetricSource>(
    regional: &Fetcher<S>,
    global: &Fetcher<G>,
    plan: &MonitoringPlan,
    thresholds: &Thresholds,
) -> DashboardSnapshot {
    let assembler = Assembler::new(regional);
    let global_assembler = Assembler::new(global);

    let ec2_fut = async {
        match &plan.ec2_instance {
            Some(t) => Some(assembler.ec2(&t.id, t.name.clone()).await),
            None => None,
        }
    };
    let rds_fut = async {
        match &plan.rds_instance {
            Some(t) => Some(assembler.rds(&t.id, t.name.clone()).await),
            None => None,
        }
    };
    let lambda_fut =
        futures::future::join_all(plan.lambda_functions.iter().map(|f| assembler.lambda(f)));
    let gateway_fut = async {
        match &plan.api_gateway {
            Some(t) => Some(assembler.api_gateway(&t.api_id, &t.stage).await),
            None => None,
        }
    };
    let cloudfront_fut = async {
        match &plan.cloudfront_distribution {
            Some(t) => Some(global_assembler.cloudfront(&t.id, t.name.clone()).await),
            None => None,
        }
    };
    let s3_fut = async {
        match &plan.s3_bucket {
            Some(t) => Some(assembler.s3(&t.id, t.name.clone()).await),
            None => None,
        }
    };
    let route53_fut = async {
        match &plan.route53_health_check {
            Some(t) => Some(global_assembler.route53(&t.id, t.name.clone()).await),
            None => None,
        }
    };

    let (ec2, rds, lambda, api_gateway, cloudfront, s3, route53) = tokio::join!(
        ec2_fut,
        rds_fut,
        lambda_fut,
        gateway_fut,
        cloudfront_fut,
        s3_fut,
        route53_fut,
    );

    let gateway_for_health = api_gateway.clone().unwrap_or_default();
    let health = health::evaluate(
        ec2.as_ref(),
        rds.as_ref(),
        &lambda,
        &gateway_for_health,
        thresholds,
    );

    DashboardSnapshot {
        ec2,
        rds,
        lambda,
        api_gateway,
        cloudfront,
        s3,
        route53,
        health,
        timestamp: response_timestamp(Utc::now()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::test_support::{MockSource, point};
    use crate::types::HealthState;

    #[tokio::test]
    async fn single_ec2_plan_leaves_other_subsystems_healthy() {
        let source = MockSource::new()
            .with_metric("CPUUtilization", vec![point(600, 75.0)])
            .with_metric("mem_used_percent", vec![point(600, 40.0)]);
        let regional = Fetcher::new(source, 5);
        let global = Fetcher::new(MockSource::new(), 5);

        let plan = MonitoringPlan {
            ec2_instance: Some(Target::named("i-abc", "web")),
            ..Default::default()
        };
        let snapshot = aggregate(&regional, &global, &plan, &Thresholds::default()).await;

        let ec2 = snapshot.ec2.expect("ec2 metrics assembled");
        assert_eq!(ec2.cpu_utilization, 75.0);
        assert_eq!(snapshot.health.backend, HealthState::Warning);
        assert_eq!(snapshot.health.database, HealthState::Healthy);
        assert_eq!(snapshot.health.lambda, HealthState::Healthy);
        assert_eq!(snapshot.health.cdn, HealthState::Healthy);
        assert!(snapshot.rds.is_none());
        assert!(snapshot.api_gateway.is_none());
    }

    #[tokio::test]
    async fn lambda_fleet_fans_out_and_feeds_health() {
        let source = MockSource::new()
            .with_metric("Invocations", vec![point(600, 100.0)])
            .with_metric("Errors", vec![point(600, 12.0)]);
        let regional = Fetcher::new(source, 5);
        let global = Fetcher::new(MockSource::new(), 5);

        let plan = MonitoringPlan {
            lambda_functions: vec!["checkout".into(), "ingest".into()],
            ..Default::default()
        };
        let snapshot = aggregate(&regional, &global, &plan, &Thresholds::default()).await;

        assert_eq!(snapshot.lambda.len(), 2);
        assert_eq!(snapshot.lambda[0].resource_name.as_deref(), Some("checkout"));
        // 24 errors over 200 invocations is past the critical error rate.
        assert_eq!(snapshot.health.lambda, HealthState::Error);
    }

    #[tokio::test]
    async fn global_targets_run_against_the_global_fetcher() {
        let regional = Fetcher::new(MockSource::new(), 5);
        let global_source = MockSource::new()
            .with_metric("Requests", vec![point(600, 500.0)])
            .with_metric("HealthCheckStatus", vec![point(600, 1.0)]);
        let global = Fetcher::new(global_source, 5);

        let plan = MonitoringPlan {
            cloudfront_distribution: Some(Target::new("E123")),
            route53_health_check: Some(Target::new("hc-1")),
            ..Default::default()
        };
        let snapshot = aggregate(&regional, &global, &plan, &Thresholds::default()).await;

        assert_eq!(snapshot.cloudfront.unwrap().requests, 500.0);
        assert_eq!(snapshot.route53.unwrap().health_check_status, 1.0);
        assert!(regional.source().calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_plan_produces_a_stamped_healthy_snapshot() {
        let regional = Fetcher::new(MockSource::new(), 5);
        let global = Fetcher::new(MockSource::new(), 5);

        let snapshot = aggregate(
            &regional,
            &global,
            &MonitoringPlan::default(),
            &Thresholds::default(),
        )
        .await;

        assert!(snapshot.ec2.is_none() && snapshot.lambda.is_empty());
        assert_eq!(snapshot.health.backend, HealthState::Healthy);
        assert!(snapshot.timestamp.ends_with('Z'));
        assert!(snapshot.timestamp.contains('.'));
    }
}
