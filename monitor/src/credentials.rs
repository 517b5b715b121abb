//! Per-request AWS credential handling.
//!
//! Credentials arrive on the request (or from a stored account row), are
//! turned into a value type once at the boundary, and are passed by
//! reference through the assembler chain. They are never stored beyond the
//! request's lifetime.

use aws_credential_types::Credentials;

#[derive(Debug, Clone)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl AwsCredentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }

    /// Static credentials provider for SDK client configs.
    pub fn provider(&self) -> Credentials {
        Credentials::new(
            self.access_key_id.clone(),
            self.secret_access_key.clone(),
            None,
            None,
            "cloudscope-request",
        )
    }
}
