//! Single-statistic metric queries with a fail-soft boundary.
//!
//! `MetricSource` is the seam to the provider: one GetMetricStatistics-shaped
//! call in, zero or more timestamped datapoints out. `Fetcher` layers the
//! dashboard's contract on top: lookback windows, ascending ordering, a
//! per-call timeout, and the policy that any provider failure degrades to a
//! zero value / empty series instead of propagating.

use crate::credentials::AwsCredentials;
use crate::types::MetricDataPoint;
use async_trait::async_trait;
use aws_sdk_cloudwatch::config::{BehaviorVersion, Region};
use aws_sdk_cloudwatch::primitives::DateTime as AwsDateTime;
use chrono::{DateTime, Duration, TimeZone, Utc};
use tracing::warn;

/// Lookback for latest-value reads of metrics that update continuously.
const LATEST_LOOKBACK_MINUTES: i64 = 10;
/// Lookback for metrics the provider only reports daily (storage sizes).
const DAILY_LOOKBACK_HOURS: i64 = 48;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimension {
    pub name: String,
    pub value: String,
}

impl Dimension {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Aggregation the provider applies within each period bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Statistic {
    #[default]
    Average,
    Sum,
    Minimum,
    Maximum,
}

impl Statistic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Statistic::Average => "Average",
            Statistic::Sum => "Sum",
            Statistic::Minimum => "Minimum",
            Statistic::Maximum => "Maximum",
        }
    }
}

/// One statistic query: namespace, metric, dimension set, bucket width and
/// aggregation statistic.
#[derive(Debug, Clone)]
pub struct MetricQuery {
    pub namespace: String,
    pub metric_name: String,
    pub dimensions: Vec<Dimension>,
    pub period_seconds: i32,
    pub statistic: Statistic,
}

impl MetricQuery {
    pub fn new(namespace: impl Into<String>, metric_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            metric_name: metric_name.into(),
            dimensions: Vec::new(),
            period_seconds: 300,
            statistic: Statistic::Average,
        }
    }

    pub fn dimension(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.dimensions.push(Dimension::new(name, value));
        self
    }

    pub fn period(mut self, seconds: i32) -> Self {
        self.period_seconds = seconds;
        self
    }

    pub fn statistic(mut self, statistic: Statistic) -> Self {
        self.statistic = statistic;
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MetricError {
    #[error("provider call failed: {0}")]
    Provider(String),
    #[error("provider call timed out after {0}s")]
    Timeout(u64),
}

/// Seam to the metrics provider. Implementations return raw datapoints in
/// whatever order the provider produced them; ordering and failure policy
/// live in [`Fetcher`].
#[async_trait]
pub trait MetricSource: Send + Sync {
    async fn query(
        &self,
        query: &MetricQuery,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<MetricDataPoint>, MetricError>;
}

/// CloudWatch-backed [`MetricSource`], scoped to one region and one set of
/// request credentials.
pub struct CloudWatchSource {
    client: aws_sdk_cloudwatch::Client,
}

impl CloudWatchSource {
    /// Client for the account's own credentials in the given region.
    pub fn new(credentials: &AwsCredentials, region: &str) -> Self {
        let config = aws_sdk_cloudwatch::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(region.to_owned()))
            .credentials_provider(credentials.provider())
            .build();

        Self {
            client: aws_sdk_cloudwatch::Client::from_conf(config),
        }
    }

    /// Client from the ambient credential chain (instance role), used by the
    /// health endpoints which monitor the deployment's own account.
    pub async fn from_default_chain(region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        let config = loader.load().await;

        Self {
            client: aws_sdk_cloudwatch::Client::new(&config),
        }
    }
}

#[async_trait]
impl MetricSource for CloudWatchSource {
    async fn query(
        &self,
        query: &MetricQuery,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<MetricDataPoint>, MetricError> {
        let dimensions = query
            .dimensions
            .iter()
            .map(|d| {
                aws_sdk_cloudwatch::types::Dimension::builder()
                    .name(&d.name)
                    .value(&d.value)
                    .build()
            })
            .collect();

        let statistic = match query.statistic {
            Statistic::Average => aws_sdk_cloudwatch::types::Statistic::Average,
            Statistic::Sum => aws_sdk_cloudwatch::types::Statistic::Sum,
            Statistic::Minimum => aws_sdk_cloudwatch::types::Statistic::Minimum,
            Statistic::Maximum => aws_sdk_cloudwatch::types::Statistic::Maximum,
        };

        let response = self
            .client
            .get_metric_statistics()
            .namespace(&query.namespace)
            .metric_name(&query.metric_name)
            .set_dimensions(Some(dimensions))
            .start_time(AwsDateTime::from_secs(start.timestamp()))
            .end_time(AwsDateTime::from_secs(end.timestamp()))
            .period(query.period_seconds)
            .statistics(statistic)
            .send()
            .await
            .map_err(|e| MetricError::Provider(e.to_string()))?;

        let points = response
            .datapoints()
            .iter()
            .filter_map(|d| {
                let timestamp = d.timestamp().and_then(|t| {
                    Utc.timestamp_opt(t.secs(), t.subsec_nanos()).single()
                })?;
                let value = match query.statistic {
                    Statistic::Average => d.average(),
                    Statistic::Sum => d.sum(),
                    Statistic::Minimum => d.minimum(),
                    Statistic::Maximum => d.maximum(),
                }?;
                Some(MetricDataPoint::new(timestamp, value))
            })
            .collect();

        Ok(points)
    }
}

/// Metric fetcher with the dashboard's failure policy baked in.
pub struct Fetcher<S: MetricSource> {
    source: S,
    timeout: std::time::Duration,
}

impl<S: MetricSource> Fetcher<S> {
    pub fn new(source: S, timeout_secs: u64) -> Self {
        Self {
            source,
            timeout: std::time::Duration::from_secs(timeout_secs),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Most recent bucket's value over a short lookback window, or `0.0`
    /// when the metric has no data or the call fails.
    pub async fn fetch_latest(&self, query: &MetricQuery) -> f64 {
        let end = Utc::now();
        let start = end - Duration::minutes(LATEST_LOOKBACK_MINUTES);
        self.latest_in_window(query, start, end).await
    }

    /// Latest value for metrics the provider only reports daily.
    pub async fn fetch_latest_daily(&self, query: &MetricQuery) -> f64 {
        let end = Utc::now();
        let start = end - Duration::hours(DAILY_LOOKBACK_HOURS);
        self.latest_in_window(query, start, end).await
    }

    /// All buckets in `[start, end)`, sorted ascending by timestamp. Empty
    /// on no data or on provider failure.
    pub async fn fetch_series(
        &self,
        query: &MetricQuery,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<MetricDataPoint> {
        match self.query_with_timeout(query, start, end).await {
            Ok(mut points) => {
                points.sort_by_key(|p| p.timestamp);
                points
            }
            Err(e) => {
                warn!(
                    namespace = %query.namespace,
                    metric = %query.metric_name,
                    error = %e,
                    "metric series query failed, returning empty series"
                );
                Vec::new()
            }
        }
    }

    async fn latest_in_window(
        &self,
        query: &MetricQuery,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> f64 {
        match self.query_with_timeout(query, start, end).await {
            Ok(points) => points
                .into_iter()
                .max_by_key(|p| p.timestamp)
                .map(|p| p.value)
                .unwrap_or(0.0),
            Err(e) => {
                warn!(
                    namespace = %query.namespace,
                    metric = %query.metric_name,
                    error = %e,
                    "metric query failed, returning zero value"
                );
                0.0
            }
        }
    }

    async fn query_with_timeout(
        &self,
        query: &MetricQuery,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<MetricDataPoint>, MetricError> {
        match tokio::time::timeout(self.timeout, self.source.query(query, start, end)).await {
            Ok(result) => result,
            Err(_) => Err(MetricError::Timeout(self.timeout.as_secs())),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{MockSource, point};
    use super::*;

    fn query(metric: &str) -> MetricQuery {
        MetricQuery::new("AWS/EC2", metric).dimension("InstanceId", "i-123")
    }

    #[tokio::test]
    async fn latest_returns_zero_on_no_data() {
        let fetcher = Fetcher::new(MockSource::new().with_metric("CPUUtilization", vec![]), 5);
        assert_eq!(fetcher.fetch_latest(&query("CPUUtilization")).await, 0.0);
    }

    #[tokio::test]
    async fn latest_returns_zero_on_provider_error() {
        let fetcher = Fetcher::new(MockSource::new().with_failure("CPUUtilization"), 5);
        assert_eq!(fetcher.fetch_latest(&query("CPUUtilization")).await, 0.0);
    }

    #[tokio::test]
    async fn latest_picks_most_recent_bucket() {
        let source = MockSource::new().with_metric(
            "CPUUtilization",
            vec![point(300, 40.0), point(900, 55.0), point(600, 70.0)],
        );
        let fetcher = Fetcher::new(source, 5);
        assert_eq!(fetcher.fetch_latest(&query("CPUUtilization")).await, 55.0);
    }

    #[tokio::test]
    async fn series_is_sorted_ascending_for_any_permutation() {
        let source = MockSource::new().with_metric(
            "NetworkIn",
            vec![point(900, 3.0), point(300, 1.0), point(600, 2.0)],
        );
        let fetcher = Fetcher::new(source, 5);

        let series = fetcher
            .fetch_series(&query("NetworkIn"), Utc::now() - Duration::minutes(30), Utc::now())
            .await;
        let values: Vec<f64> = series.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
        assert!(series.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[tokio::test]
    async fn series_is_empty_on_provider_error() {
        let fetcher = Fetcher::new(MockSource::new().with_failure("NetworkIn"), 5);
        let series = fetcher
            .fetch_series(&query("NetworkIn"), Utc::now() - Duration::minutes(30), Utc::now())
            .await;
        assert!(series.is_empty());
    }
}
