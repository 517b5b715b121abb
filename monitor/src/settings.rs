//! Dashboard settings persisted as one JSON blob in SSM Parameter Store.
//!
//! Settings are read fresh on every request; request volume is low enough
//! that a cache buys nothing and staleness costs debugging time.

use aws_sdk_ssm::config::BehaviorVersion;
use aws_sdk_ssm::types::ParameterType;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::health::Thresholds;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsSettings {
    pub region: String,
    pub environment: String,
    pub source_account_id: String,
}

impl Default for AwsSettings {
    fn default() -> Self {
        Self {
            region: "ap-southeast-1".to_owned(),
            environment: "dev".to_owned(),
            source_account_id: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ec2Settings {
    pub instance_id: String,
    pub enable_detailed_monitoring: bool,
    pub refresh_interval: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RdsSettings {
    pub db_instance_identifier: String,
    pub enable_performance_insights: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerlessSettings {
    pub lambda_function_names: Vec<String>,
    pub api_gateway_id: String,
    pub api_gateway_stage: String,
}

impl Default for ServerlessSettings {
    fn default() -> Self {
        Self {
            lambda_function_names: Vec::new(),
            api_gateway_id: String::new(),
            api_gateway_stage: "prod".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringSettings {
    pub aws: AwsSettings,
    pub ec2: Ec2Settings,
    pub rds: RdsSettings,
    pub serverless: ServerlessSettings,
    pub thresholds: Thresholds,
    pub updated_at: Option<String>,
}

impl MonitoringSettings {
    /// Completeness flags reported by the validate endpoint.
    pub fn validation_flags(&self) -> SettingsValidation {
        SettingsValidation {
            has_region: !self.aws.region.is_empty(),
            has_ec2_instance: !self.ec2.instance_id.is_empty(),
            has_rds_instance: !self.rds.db_instance_identifier.is_empty(),
            has_lambda_functions: !self.serverless.lambda_function_names.is_empty(),
            has_api_gateway: !self.serverless.api_gateway_id.is_empty(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsValidation {
    pub has_region: bool,
    pub has_ec2_instance: bool,
    pub has_rds_instance: bool,
    pub has_lambda_functions: bool,
    pub has_api_gateway: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("settings serialization failed: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("parameter store write failed: {0}")]
    Store(String),
}

/// SSM-backed store for the settings blob.
pub struct SettingsStore {
    client: aws_sdk_ssm::Client,
    parameter_name: String,
}

impl SettingsStore {
    pub async fn from_default_chain(parameter_name: impl Into<String>) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        Self {
            client: aws_sdk_ssm::Client::new(&config),
            parameter_name: parameter_name.into(),
        }
    }

    /// Current settings, or defaults when the parameter is missing,
    /// unreadable or corrupt.
    pub async fn load(&self) -> MonitoringSettings {
        let response = self
            .client
            .get_parameter()
            .name(&self.parameter_name)
            .with_decryption(true)
            .send()
            .await;

        let value = match response {
            Ok(out) => out.parameter.and_then(|p| p.value),
            Err(e) => {
                warn!(parameter = %self.parameter_name, error = %e, "settings read failed, using defaults");
                return MonitoringSettings::default();
            }
        };

        match value {
            Some(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                warn!(parameter = %self.parameter_name, error = %e, "settings blob is corrupt, using defaults");
                MonitoringSettings::default()
            }),
            None => MonitoringSettings::default(),
        }
    }

    /// Persist the settings, stamping `updated_at` before the write.
    pub async fn save(&self, mut settings: MonitoringSettings) -> Result<MonitoringSettings, SettingsError> {
        settings.updated_at = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true));
        let json = serde_json::to_string(&settings)?;

        self.client
            .put_parameter()
            .name(&self.parameter_name)
            .value(json)
            .r#type(ParameterType::SecureString)
            .overwrite(true)
            .send()
            .await
            .map_err(|e| SettingsError::Store(e.to_string()))?;

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_a_fresh_deployment() {
        let settings = MonitoringSettings::default();
        assert_eq!(settings.aws.region, "ap-southeast-1");
        assert_eq!(settings.aws.environment, "dev");
        assert_eq!(settings.serverless.api_gateway_stage, "prod");
        assert_eq!(settings.thresholds.cpu_warning, 70.0);
        assert_eq!(settings.thresholds.memory_critical, 95.0);
        assert!(settings.updated_at.is_none());
    }

    #[test]
    fn blob_round_trips_through_json() {
        let mut settings = MonitoringSettings::default();
        settings.ec2.instance_id = "i-0abc".to_owned();
        settings.serverless.lambda_function_names = vec!["checkout".to_owned()];

        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("\"instanceId\":\"i-0abc\""));
        assert!(json.contains("\"lambdaFunctionNames\""));

        let back: MonitoringSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.ec2.instance_id, "i-0abc");
    }

    #[test]
    fn corrupt_blob_falls_back_to_defaults() {
        let parsed: MonitoringSettings =
            serde_json::from_str("not json").unwrap_or_default();
        assert_eq!(parsed.aws.region, "ap-southeast-1");
    }

    #[test]
    fn validation_flags_track_configured_sections() {
        let mut settings = MonitoringSettings::default();
        let flags = settings.validation_flags();
        assert!(flags.has_region);
        assert!(!flags.has_ec2_instance);
        assert!(!flags.has_lambda_functions);

        settings.ec2.instance_id = "i-0abc".to_owned();
        settings.serverless.lambda_function_names = vec!["checkout".to_owned()];
        let flags = settings.validation_flags();
        assert!(flags.has_ec2_instance);
        assert!(flags.has_lambda_functions);
        assert!(!flags.has_api_gateway);
    }
}
