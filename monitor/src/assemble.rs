//! Per-resource-type metric assembly.
//!
//! Each assembler knows the fixed set of (namespace, metric, dimensions)
//! queries for its resource type, issues them concurrently, converts units,
//! and builds one record. Total provider unavailability yields a zero-value
//! record, never an error.

use crate::fetch::{Fetcher, MetricQuery, MetricSource, Statistic};
use crate::types::{
    ApiGatewayMetrics, CloudFrontMetrics, Ec2Metrics, LambdaMetrics, RdsMetrics, Route53Metrics,
    S3Metrics,
};
use crate::units::{bytes_to_gb, bytes_to_mb};
use chrono::{DateTime, Duration, Utc};

/// History window for per-resource time series.
const HISTORY_WINDOW_MINUTES: i64 = 30;

fn history_window() -> (DateTime<Utc>, DateTime<Utc>) {
    let end = Utc::now();
    (end - Duration::minutes(HISTORY_WINDOW_MINUTES), end)
}

/// Issues the fixed query set for each resource type against one
/// region-scoped fetcher. CloudFront and Route53 assemblers must be given a
/// fetcher pinned to [`crate::GLOBAL_METRICS_REGION`].
pub struct Assembler<'a, S: MetricSource> {
    fetcher: &'a Fetcher<S>,
}

impl<'a, S: MetricSource> Assembler<'a, S> {
    pub fn new(fetcher: &'a Fetcher<S>) -> Self {
        Self { fetcher }
    }

    pub async fn ec2(&self, instance_id: &str, name: Option<String>) -> Ec2Metrics {
        let (start, end) = history_window();

        let cpu_q = MetricQuery::new("AWS/EC2", "CPUUtilization").dimension("InstanceId", instance_id);
        let net_in_q = MetricQuery::new("AWS/EC2", "NetworkIn").dimension("InstanceId", instance_id);
        let net_out_q = MetricQuery::new("AWS/EC2", "NetworkOut").dimension("InstanceId", instance_id);
        // Agent-reported metrics live in their own namespace.
        let mem_q = MetricQuery::new("CWAgent", "mem_used_percent").dimension("InstanceId", instance_id);
        let disk_q = MetricQuery::new("CWAgent", "disk_used_percent").dimension("InstanceId", instance_id);

        let (cpu, net_in, net_out, memory, disk, cpu_history, memory_history) = tokio::join!(
            self.fetcher.fetch_latest(&cpu_q),
            self.fetcher.fetch_latest(&net_in_q),
            self.fetcher.fetch_latest(&net_out_q),
            self.fetcher.fetch_latest(&mem_q),
            self.fetcher.fetch_latest(&disk_q),
            self.fetcher.fetch_series(&cpu_q, start, end),
            self.fetcher.fetch_series(&mem_q, start, end),
        );

        Ec2Metrics {
            resource_name: name,
            cpu_utilization: cpu,
            memory_utilization: memory,
            disk_usage: disk,
            network_in: bytes_to_mb(net_in),
            network_out: bytes_to_mb(net_out),
            cpu_history,
            memory_history,
        }
    }

    pub async fn rds(&self, db_instance_identifier: &str, name: Option<String>) -> RdsMetrics {
        let (start, end) = history_window();
        let dim = |metric: &str| {
            MetricQuery::new("AWS/RDS", metric)
                .dimension("DBInstanceIdentifier", db_instance_identifier)
        };

        let cpu_q = dim("CPUUtilization");
        let connections_q = dim("DatabaseConnections");

        let (cpu, freeable, connections, read_iops, write_iops, cpu_history, connections_history) =
            tokio::join!(
                self.fetcher.fetch_latest(&cpu_q),
                self.fetcher.fetch_latest(&dim("FreeableMemory")),
                self.fetcher.fetch_latest(&connections_q),
                self.fetcher.fetch_latest(&dim("ReadIOPS")),
                self.fetcher.fetch_latest(&dim("WriteIOPS")),
                self.fetcher.fetch_series(&cpu_q, start, end),
                self.fetcher.fetch_series(&connections_q, start, end),
            );

        RdsMetrics {
            resource_name: name,
            cpu_utilization: cpu,
            freeable_memory: bytes_to_gb(freeable),
            database_connections: connections as i64,
            read_iops,
            write_iops,
            cpu_history,
            connections_history,
        }
    }

    pub async fn lambda(&self, function_name: &str) -> LambdaMetrics {
        let (start, end) = history_window();
        let dim = |metric: &str| {
            MetricQuery::new("AWS/Lambda", metric).dimension("FunctionName", function_name)
        };

        let invocations_q = dim("Invocations");
        let errors_q = dim("Errors");

        let (invocations, errors, duration, throttles, invocations_history, errors_history) =
            tokio::join!(
                self.fetcher.fetch_latest(&invocations_q),
                self.fetcher.fetch_latest(&errors_q),
                self.fetcher.fetch_latest(&dim("Duration")),
                self.fetcher.fetch_latest(&dim("Throttles")),
                self.fetcher.fetch_series(&invocations_q, start, end),
                self.fetcher.fetch_series(&errors_q, start, end),
            );

        LambdaMetrics {
            resource_name: Some(function_name.to_owned()),
            invocations: invocations as i64,
            errors: errors as i64,
            duration,
            throttles: throttles as i64,
            invocations_history,
            errors_history,
        }
    }

    pub async fn api_gateway(&self, api_id: &str, stage: &str) -> ApiGatewayMetrics {
        let (start, end) = history_window();
        let dim = |metric: &str| {
            MetricQuery::new("AWS/ApiGateway", metric)
                .dimension("ApiId", api_id)
                .dimension("Stage", stage)
        };

        let count_q = dim("Count");

        let (count, latency, count_4xx, count_5xx, request_history) = tokio::join!(
            self.fetcher.fetch_latest(&count_q),
            self.fetcher.fetch_latest(&dim("Latency")),
            self.fetcher.fetch_latest(&dim("4XXError")),
            self.fetcher.fetch_latest(&dim("5XXError")),
            self.fetcher.fetch_series(&count_q, start, end),
        );

        ApiGatewayMetrics {
            request_count: count as i64,
            latency,
            count_4xx: count_4xx as i64,
            count_5xx: count_5xx as i64,
            request_history,
        }
    }

    /// Requires a fetcher pinned to the global metrics region.
    pub async fn cloudfront(&self, distribution_id: &str, name: Option<String>) -> CloudFrontMetrics {
        let (start, end) = history_window();
        let dim = |metric: &str| {
            MetricQuery::new("AWS/CloudFront", metric)
                .dimension("DistributionId", distribution_id)
                .dimension("Region", "Global")
        };

        let requests_q = dim("Requests").statistic(Statistic::Sum);

        let (
            requests,
            bytes_downloaded,
            bytes_uploaded,
            error_rate_4xx,
            error_rate_5xx,
            total_error_rate,
            requests_history,
        ) = tokio::join!(
            self.fetcher.fetch_latest(&requests_q),
            self.fetcher.fetch_latest(&dim("BytesDownloaded").statistic(Statistic::Sum)),
            self.fetcher.fetch_latest(&dim("BytesUploaded").statistic(Statistic::Sum)),
            self.fetcher.fetch_latest(&dim("4xxErrorRate")),
            self.fetcher.fetch_latest(&dim("5xxErrorRate")),
            self.fetcher.fetch_latest(&dim("TotalErrorRate")),
            self.fetcher.fetch_series(&requests_q, start, end),
        );

        CloudFrontMetrics {
            resource_name: name,
            requests,
            bytes_downloaded: bytes_to_mb(bytes_downloaded),
            bytes_uploaded: bytes_to_mb(bytes_uploaded),
            error_rate_4xx,
            error_rate_5xx,
            total_error_rate,
            requests_history,
        }
    }

    pub async fn s3(&self, bucket_name: &str, name: Option<String>) -> S3Metrics {
        // Storage metrics are reported once a day and need a StorageType
        // dimension; request metrics need the bucket's EntireBucket filter.
        let size_q = MetricQuery::new("AWS/S3", "BucketSizeBytes")
            .dimension("BucketName", bucket_name)
            .dimension("StorageType", "StandardStorage")
            .period(86_400);
        let objects_q = MetricQuery::new("AWS/S3", "NumberOfObjects")
            .dimension("BucketName", bucket_name)
            .dimension("StorageType", "AllStorageTypes")
            .period(86_400);
        let request = |metric: &str| {
            MetricQuery::new("AWS/S3", metric)
                .dimension("BucketName", bucket_name)
                .dimension("FilterId", "EntireBucket")
                .statistic(Statistic::Sum)
        };

        let (size_bytes, objects, all_requests, errors_4xx, errors_5xx) = tokio::join!(
            self.fetcher.fetch_latest_daily(&size_q),
            self.fetcher.fetch_latest_daily(&objects_q),
            self.fetcher.fetch_latest(&request("AllRequests")),
            self.fetcher.fetch_latest(&request("4xxErrors")),
            self.fetcher.fetch_latest(&request("5xxErrors")),
        );

        S3Metrics {
            resource_name: name,
            bucket_size_gb: bytes_to_gb(size_bytes),
            number_of_objects: objects,
            all_requests,
            errors_4xx,
            errors_5xx,
        }
    }

    /// Requires a fetcher pinned to the global metrics region.
    pub async fn route53(&self, health_check_id: &str, name: Option<String>) -> Route53Metrics {
        let (start, end) = history_window();
        let dim = |metric: &str| {
            MetricQuery::new("AWS/Route53", metric).dimension("HealthCheckId", health_check_id)
        };

        let status_q = dim("HealthCheckStatus").statistic(Statistic::Minimum);

        let (status, percentage_healthy, connection_time, status_history) = tokio::join!(
            self.fetcher.fetch_latest(&status_q),
            self.fetcher.fetch_latest(&dim("HealthCheckPercentageHealthy")),
            self.fetcher.fetch_latest(&dim("ConnectionTime")),
            self.fetcher.fetch_series(&status_q, start, end),
        );

        Route53Metrics {
            resource_name: name,
            health_check_status: status,
            percentage_healthy,
            connection_time_ms: connection_time,
            status_history,
        }
    }
}
