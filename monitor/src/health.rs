//! Threshold-based health derivation.
//!
//! Health is computed from already-assembled metric records, never from the
//! provider directly. Classification checks the critical threshold before the
//! warning threshold, and each threshold is inclusive at its lower bound.

use crate::types::{
    ApiGatewayMetrics, Ec2Metrics, HealthState, HealthStatus, LambdaMetrics, RdsMetrics,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thresholds {
    pub cpu_warning: f64,
    pub cpu_critical: f64,
    pub memory_warning: f64,
    pub memory_critical: f64,
    pub error_rate_warning: f64,
    pub error_rate_critical: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            cpu_warning: 70.0,
            cpu_critical: 90.0,
            memory_warning: 80.0,
            memory_critical: 95.0,
            error_rate_warning: 5.0,
            error_rate_critical: 10.0,
        }
    }
}

/// Critical first, then warning, inclusive at each bound.
pub fn classify(value: f64, warning: f64, critical: f64) -> HealthState {
    if value >= critical {
        HealthState::Error
    } else if value >= warning {
        HealthState::Warning
    } else {
        HealthState::Healthy
    }
}

fn worst(a: HealthState, b: HealthState) -> HealthState {
    use HealthState::*;
    match (a, b) {
        (Error, _) | (_, Error) => Error,
        (Warning, _) | (_, Warning) => Warning,
        _ => Healthy,
    }
}

/// Fleet-wide lambda error rate as a percentage. Zero invocations across the
/// fleet means zero error rate, not a division error.
pub fn lambda_error_rate(functions: &[LambdaMetrics]) -> f64 {
    let invocations: i64 = functions.iter().map(|f| f.invocations).sum();
    if invocations == 0 {
        return 0.0;
    }
    let errors: i64 = functions.iter().map(|f| f.errors).sum();
    errors as f64 / invocations as f64 * 100.0
}

/// Gateway error rate as a percentage of total requests.
fn gateway_error_rate(gateway: &ApiGatewayMetrics) -> f64 {
    if gateway.request_count == 0 {
        return 0.0;
    }
    (gateway.count_4xx + gateway.count_5xx) as f64 / gateway.request_count as f64 * 100.0
}

/// Derive subsystem health for one account's assembled metrics.
///
/// Backend follows the worst of EC2 CPU and memory; database follows RDS
/// CPU; lambda follows the fleet-wide error rate; cdn follows the gateway
/// error rate. Unconfigured subsystems stay healthy. The 2xx count is derived
/// from the gateway total minus the error counts.
pub fn evaluate(
    instance: Option<&Ec2Metrics>,
    database: Option<&RdsMetrics>,
    functions: &[LambdaMetrics],
    gateway: &ApiGatewayMetrics,
    thresholds: &Thresholds,
) -> HealthStatus {
    let backend = instance
        .map(|i| {
            worst(
                classify(i.cpu_utilization, thresholds.cpu_warning, thresholds.cpu_critical),
                classify(
                    i.memory_utilization,
                    thresholds.memory_warning,
                    thresholds.memory_critical,
                ),
            )
        })
        .unwrap_or_default();

    let database = database
        .map(|d| classify(d.cpu_utilization, thresholds.cpu_warning, thresholds.cpu_critical))
        .unwrap_or_default();

    let lambda = classify(
        lambda_error_rate(functions),
        thresholds.error_rate_warning,
        thresholds.error_rate_critical,
    );

    let cdn = classify(
        gateway_error_rate(gateway),
        thresholds.error_rate_warning,
        thresholds.error_rate_critical,
    );

    let http2xx = (gateway.request_count - gateway.count_4xx - gateway.count_5xx).max(0);

    HealthStatus {
        backend,
        database,
        lambda,
        cdn,
        http2xx,
        http4xx: gateway.count_4xx,
        http5xx: gateway.count_5xx,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_checks_critical_before_warning() {
        assert_eq!(classify(90.0, 70.0, 90.0), HealthState::Error);
        assert_eq!(classify(89.999, 70.0, 90.0), HealthState::Warning);
        assert_eq!(classify(70.0, 70.0, 90.0), HealthState::Warning);
        assert_eq!(classify(69.999, 70.0, 90.0), HealthState::Healthy);
    }

    #[test]
    fn lambda_error_rate_aggregates_across_functions() {
        let functions = vec![
            LambdaMetrics {
                invocations: 100,
                errors: 5,
                ..Default::default()
            },
            LambdaMetrics {
                invocations: 200,
                errors: 0,
                ..Default::default()
            },
        ];
        let rate = lambda_error_rate(&functions);
        assert!((rate - 5.0 / 300.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn zero_invocations_yield_zero_error_rate() {
        let functions = vec![LambdaMetrics::default()];
        assert_eq!(lambda_error_rate(&functions), 0.0);
    }

    #[test]
    fn backend_follows_the_worse_of_cpu_and_memory() {
        let instance = Ec2Metrics {
            cpu_utilization: 10.0,
            memory_utilization: 96.0,
            ..Default::default()
        };
        let status = evaluate(
            Some(&instance),
            None,
            &[],
            &ApiGatewayMetrics::default(),
            &Thresholds::default(),
        );
        assert_eq!(status.backend, HealthState::Error);
        assert_eq!(status.database, HealthState::Healthy);
    }

    #[test]
    fn cdn_follows_gateway_error_rate() {
        let gateway = ApiGatewayMetrics {
            request_count: 100,
            count_4xx: 8,
            count_5xx: 3,
            ..Default::default()
        };
        let status = evaluate(None, None, &[], &gateway, &Thresholds::default());
        assert_eq!(status.cdn, HealthState::Error);
        assert_eq!(status.http2xx, 89);
    }

    #[test]
    fn http_2xx_is_never_negative() {
        let inconsistent = ApiGatewayMetrics {
            request_count: 3,
            count_4xx: 5,
            count_5xx: 0,
            ..Default::default()
        };
        let status = evaluate(None, None, &[], &inconsistent, &Thresholds::default());
        assert_eq!(status.http2xx, 0);
    }

    #[test]
    fn unconfigured_subsystems_stay_healthy() {
        let status = evaluate(
            None,
            None,
            &[],
            &ApiGatewayMetrics::default(),
            &Thresholds::default(),
        );
        assert_eq!(status.backend, HealthState::Healthy);
        assert_eq!(status.database, HealthState::Healthy);
        assert_eq!(status.lambda, HealthState::Healthy);
        assert_eq!(status.cdn, HealthState::Healthy);
    }
}
