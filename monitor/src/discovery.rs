//! Account resource discovery and credential validation.
//!
//! Discovery is best-effort: each service listing degrades to an empty list
//! so a missing IAM permission on one service does not hide the others.
//! Credential validation is the one place provider errors are surfaced
//! verbatim, so the operator can see exactly what AWS rejected.

use aws_sdk_cloudwatch::config::{BehaviorVersion, Region};
use serde::Serialize;
use tracing::warn;

use crate::credentials::AwsCredentials;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredResource {
    pub id: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredResources {
    pub ec2_instances: Vec<DiscoveredResource>,
    pub rds_instances: Vec<DiscoveredResource>,
    pub lambda_functions: Vec<DiscoveredResource>,
    pub s3_buckets: Vec<DiscoveredResource>,
}

#[derive(Debug, thiserror::Error)]
#[error("credential validation failed: {0}")]
pub struct CredentialValidationError(pub String);

fn sdk_region(region: &str) -> Region {
    Region::new(region.to_owned())
}

/// Cheapest authenticated CloudWatch call. Errors pass through so the
/// caller can report what the provider rejected.
pub async fn validate_credentials(
    credentials: &AwsCredentials,
    region: &str,
) -> Result<(), CredentialValidationError> {
    let config = aws_sdk_cloudwatch::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(sdk_region(region))
        .credentials_provider(credentials.provider())
        .build();
    let client = aws_sdk_cloudwatch::Client::from_conf(config);

    client
        .list_metrics()
        .send()
        .await
        .map_err(|e| CredentialValidationError(e.to_string()))?;

    Ok(())
}

/// List the account's monitorable resources across EC2, RDS, Lambda and S3.
pub async fn discover_resources(
    credentials: &AwsCredentials,
    region: &str,
) -> DiscoveredResources {
    let (ec2_instances, rds_instances, lambda_functions, s3_buckets) = tokio::join!(
        discover_ec2(credentials, region),
        discover_rds(credentials, region),
        discover_lambda(credentials, region),
        discover_s3(credentials, region),
    );

    DiscoveredResources {
        ec2_instances,
        rds_instances,
        lambda_functions,
        s3_buckets,
    }
}

async fn discover_ec2(credentials: &AwsCredentials, region: &str) -> Vec<DiscoveredResource> {
    let config = aws_sdk_ec2::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(sdk_region(region))
        .credentials_provider(credentials.provider())
        .build();
    let client = aws_sdk_ec2::Client::from_conf(config);

    match client.describe_instances().send().await {
        Ok(out) => out
            .reservations()
            .iter()
            .flat_map(|r| r.instances())
            .filter_map(|i| {
                let id = i.instance_id()?.to_owned();
                let name = i
                    .tags()
                    .iter()
                    .find(|t| t.key() == Some("Name"))
                    .and_then(|t| t.value())
                    .map(str::to_owned);
                Some(DiscoveredResource { id, name })
            })
            .collect(),
        Err(e) => {
            warn!(error = %e, "instance discovery failed");
            Vec::new()
        }
    }
}

async fn discover_rds(credentials: &AwsCredentials, region: &str) -> Vec<DiscoveredResource> {
    let config = aws_sdk_rds::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(sdk_region(region))
        .credentials_provider(credentials.provider())
        .build();
    let client = aws_sdk_rds::Client::from_conf(config);

    match client.describe_db_instances().send().await {
        Ok(out) => out
            .db_instances()
            .iter()
            .filter_map(|db| {
                let id = db.db_instance_identifier()?.to_owned();
                Some(DiscoveredResource { id, name: None })
            })
            .collect(),
        Err(e) => {
            warn!(error = %e, "database discovery failed");
            Vec::new()
        }
    }
}

async fn discover_lambda(credentials: &AwsCredentials, region: &str) -> Vec<DiscoveredResource> {
    let config = aws_sdk_lambda::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(sdk_region(region))
        .credentials_provider(credentials.provider())
        .build();
    let client = aws_sdk_lambda::Client::from_conf(config);

    match client.list_functions().send().await {
        Ok(out) => out
            .functions()
            .iter()
            .filter_map(|f| {
                let id = f.function_name()?.to_owned();
                Some(DiscoveredResource { id, name: None })
            })
            .collect(),
        Err(e) => {
            warn!(error = %e, "function discovery failed");
            Vec::new()
        }
    }
}

async fn discover_s3(credentials: &AwsCredentials, region: &str) -> Vec<DiscoveredResource> {
    let config = aws_sdk_s3::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(sdk_region(region))
        .credentials_provider(credentials.provider())
        .build();
    let client = aws_sdk_s3::Client::from_conf(config);

    match client.list_buckets().send().await {
        Ok(out) => out
            .buckets()
            .iter()
            .filter_map(|b| {
                let id = b.name()?.to_owned();
                Some(DiscoveredResource { id, name: None })
            })
            .collect(),
        Err(e) => {
            warn!(error = %e, "bucket discovery failed");
            Vec::new()
        }
    }
}
