//! S3-compatible ETag lookup using AWS SDK.

use crate::error::{StorageError, StorageResult};
use crate::traits::{EtagStore, ObjectMeta};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::default_provider::credentials::DefaultCredentialsChain;
use aws_credential_types::provider::ProvideCredentials;
use aws_credential_types::provider::error::CredentialsError;
use aws_credential_types::provider::future::ProvideCredentials as ProvideCredentialsFuture;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::config::timeout::TimeoutConfig;
use aws_sdk_s3::error::SdkError;
use aws_smithy_http_client::Builder as SmithyHttpClientBuilder;
use s3etag_core::{Etag, RemoteConfig};
use tokio::sync::OnceCell;
use tracing::instrument;

const AMBIENT_CREDENTIALS_MARKER: &str = "s3etag-ambient-credentials";

/// Default AWS credential chain, built on the first signed request.
///
/// Building the chain eagerly touches TLS trust roots, which breaks plain-HTTP
/// endpoints on hosts without them.
#[derive(Debug)]
struct AmbientCredentials {
    region: String,
    chain: OnceCell<DefaultCredentialsChain>,
}

impl AmbientCredentials {
    fn new(region: String) -> Self {
        Self {
            region,
            chain: OnceCell::new(),
        }
    }

    async fn resolve(&self) -> aws_credential_types::provider::Result {
        let chain = self
            .chain
            .get_or_try_init(|| async {
                let region = aws_config::Region::new(self.region.clone());
                tokio::task::spawn(async move {
                    DefaultCredentialsChain::builder().region(region).build().await
                })
                .await
                .map_err(|e| {
                    CredentialsError::provider_error(format!(
                        "{AMBIENT_CREDENTIALS_MARKER}: credential chain setup failed: {e}"
                    ))
                })
            })
            .await?;

        chain.provide_credentials().await.map_err(|e| {
            CredentialsError::provider_error(format!(
                "{AMBIENT_CREDENTIALS_MARKER}: no usable AWS credentials: {e}"
            ))
        })
    }
}

impl ProvideCredentials for AmbientCredentials {
    fn provide_credentials<'a>(&'a self) -> ProvideCredentialsFuture<'a>
    where
        Self: 'a,
    {
        ProvideCredentialsFuture::new(self.resolve())
    }
}

fn map_sdk_error<E>(err: SdkError<E>) -> StorageError
where
    E: std::error::Error + Send + Sync + 'static,
{
    if err.to_string().contains(AMBIENT_CREDENTIALS_MARKER) {
        return StorageError::Config(
            "could not resolve AWS credentials; pass --access-key-id and --secret-access-key or configure the AWS credential chain"
                .to_string(),
        );
    }
    StorageError::S3(Box::new(err))
}

fn is_not_found<E>(err: &SdkError<E>) -> bool {
    matches!(err, SdkError::ServiceError(service_err) if service_err.raw().status().as_u16() == 404)
}

/// Normalize an endpoint, treating bare `host:port` as plain HTTP.
fn normalize_endpoint(endpoint: &str) -> String {
    let lower = endpoint.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        endpoint.to_string()
    } else {
        format!("http://{endpoint}")
    }
}

/// Endpoint shown in logs: the configured one, or the regional AWS host.
fn endpoint_label(endpoint: Option<&str>, region: &str) -> String {
    match endpoint {
        Some(endpoint) => endpoint.to_string(),
        None => format!("s3.{region}.amazonaws.com"),
    }
}

fn client_config(
    config: &RemoteConfig,
    region: &str,
    endpoint: Option<&str>,
) -> aws_sdk_s3::Config {
    let mut builder = aws_sdk_s3::config::Builder::new()
        .behavior_version(BehaviorVersion::latest())
        .region(aws_config::Region::new(region.to_string()))
        .force_path_style(config.force_path_style);

    builder = match (&config.access_key_id, &config.secret_access_key) {
        (Some(key_id), Some(secret)) => builder.credentials_provider(Credentials::new(
            key_id.clone(),
            secret.clone(),
            None,
            None,
            "s3etag-config",
        )),
        _ => builder.credentials_provider(AmbientCredentials::new(region.to_string())),
    };

    if let Some(endpoint) = endpoint {
        builder = builder.endpoint_url(endpoint);
        // Plain HTTP endpoints get a client that never loads trust roots.
        if endpoint.to_ascii_lowercase().starts_with("http://") {
            builder = builder.http_client(SmithyHttpClientBuilder::new().build_http());
        }
    }

    if let Some(timeout) = config.timeout {
        builder =
            builder.timeout_config(TimeoutConfig::builder().operation_timeout(timeout).build());
    }

    builder.build()
}

/// Strip the quotes S3 wraps around ETag header values.
pub fn strip_etag_quotes(raw: &str) -> &str {
    raw.trim().trim_matches('"')
}

/// S3-compatible ETag store using AWS SDK.
pub struct S3Backend {
    client: Client,
    bucket: String,
    endpoint: String,
    region: String,
}

impl std::fmt::Debug for S3Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Backend")
            .field("bucket", &self.bucket)
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

impl S3Backend {
    /// Create a new S3 backend.
    ///
    /// `config.force_path_style` selects path-style URLs (`endpoint/bucket/key`)
    /// instead of virtual-hosted style (`bucket.endpoint/key`). MinIO and some
    /// other S3-compatible services require it.
    pub fn new(config: &RemoteConfig) -> StorageResult<Self> {
        config.validate().map_err(StorageError::Config)?;

        let region = config.region_or_default().to_string();
        let endpoint = config.endpoint.as_deref().map(normalize_endpoint);
        let client = Client::from_conf(client_config(config, &region, endpoint.as_deref()));

        Ok(Self {
            client,
            bucket: config.bucket.clone(),
            endpoint: endpoint_label(endpoint.as_deref(), &region),
            region,
        })
    }

    /// The bucket this backend reads from.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// The endpoint requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The region requests are signed for.
    pub fn region(&self) -> &str {
        &self.region
    }
}

#[async_trait]
impl EtagStore for S3Backend {
    #[instrument(skip(self), fields(backend = "s3", bucket = %self.bucket))]
    async fn head(&self, key: &str) -> StorageResult<Option<ObjectMeta>> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey("object key must not be empty".to_string()));
        }

        let output = match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) if is_not_found(&err) => {
                tracing::debug!(key = %key, "object not found");
                return Ok(None);
            }
            Err(err) => return Err(map_sdk_error(err)),
        };

        let raw = output.e_tag().ok_or_else(|| StorageError::InvalidEtag {
            key: key.to_string(),
            source: s3etag_core::Error::InvalidEtag("response has no ETag header".to_string()),
        })?;
        let etag = Etag::parse(strip_etag_quotes(raw)).map_err(|source| {
            StorageError::InvalidEtag {
                key: key.to_string(),
                source,
            }
        })?;

        Ok(Some(ObjectMeta {
            etag,
            size: output
                .content_length()
                .and_then(|len| u64::try_from(len).ok()),
        }))
    }

    fn backend_name(&self) -> &'static str {
        "s3"
    }
}
