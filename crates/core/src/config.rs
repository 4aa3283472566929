//! Remote store configuration shared across crates.

use std::time::Duration;

/// Default region when none is configured.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Connection settings for an S3-compatible store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteConfig {
    /// Bucket holding the objects to compare against.
    pub bucket: String,
    /// Custom endpoint for non-AWS stores (e.g. "http://minio:9000").
    pub endpoint: Option<String>,
    /// Region (default: us-east-1).
    pub region: Option<String>,
    /// Explicit access key; when unset the ambient AWS credential chain is used.
    pub access_key_id: Option<String>,
    /// Explicit secret key, required together with `access_key_id`.
    pub secret_access_key: Option<String>,
    /// Address objects as `endpoint/bucket/key` instead of `bucket.endpoint/key`.
    pub force_path_style: bool,
    /// Per-operation timeout for remote lookups.
    pub timeout: Option<Duration>,
}

impl RemoteConfig {
    /// Create a configuration for `bucket` with every other setting defaulted.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            endpoint: None,
            region: None,
            access_key_id: None,
            secret_access_key: None,
            force_path_style: false,
            timeout: None,
        }
    }

    /// Region to sign requests for.
    pub fn region_or_default(&self) -> &str {
        self.region.as_deref().unwrap_or(DEFAULT_REGION)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.bucket.trim().is_empty() {
            return Err("bucket must not be empty".to_string());
        }
        if self.access_key_id.is_some() != self.secret_access_key.is_some() {
            return Err(
                "access_key_id and secret_access_key must be set together".to_string(),
            );
        }
        if let Some(endpoint) = &self.endpoint
            && endpoint.trim().is_empty()
        {
            return Err("endpoint must not be empty when set".to_string());
        }
        if self.timeout == Some(Duration::ZERO) {
            return Err("timeout must be greater than zero".to_string());
        }
        Ok(())
    }
}
