//! Metrics aggregation layer for the monitoring dashboard.
//!
//! Given an account's monitored resources and a time window, this crate fans
//! out concurrent CloudWatch queries per resource type, normalizes units,
//! derives health from thresholds, and assembles one merged snapshot. A
//! failed or missing metric degrades to a zero value rather than failing the
//! whole request.

pub mod assemble;
pub mod credentials;
pub mod discovery;
pub mod fetch;
pub mod health;
pub mod orchestrate;
pub mod settings;
pub mod types;
pub mod units;

/// CloudFront and Route53 are global services whose metrics are only
/// queryable from this region, regardless of the account's configured region.
pub const GLOBAL_METRICS_REGION: &str = "us-east-1";
