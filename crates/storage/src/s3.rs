//! S3-compatible object store backed by `aws-sdk-s3`

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::RequestChecksumCalculation;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use secrecy::ExposeSecret;
use url::Url;
use voicecast_config::StorageConfig;

use crate::{ObjectStore, Result, StorageError, check_upload, public_url};

/// Object store speaking the S3 API against a custom endpoint
pub struct S3Store {
    client: Client,
    public_base: Url,
    public_read: bool,
}

impl S3Store {
    /// Create a store from configuration
    ///
    /// Credentials come from the configuration only; the default AWS
    /// credential chain is never consulted.
    pub async fn new(config: &StorageConfig) -> Self {
        let credentials = aws_credential_types::Credentials::new(
            config.access_key_id.expose_secret(),
            config.secret_access_key.expose_secret(),
            None, // session token
            None, // expiry
            "voicecast-config",
        );

        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()))
            .endpoint_url(config.endpoint.as_str())
            .credentials_provider(credentials)
            .load()
            .await;

        // Spaces and most S3 clones reject the flexible checksum headers
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.force_path_style)
            .request_checksum_calculation(RequestChecksumCalculation::WhenRequired)
            .build();

        tracing::debug!(
            endpoint = %config.endpoint,
            region = %config.region,
            "initialized S3 object store"
        );

        Self {
            client: Client::from_conf(s3_config),
            public_base: config.public_base_url().clone(),
            public_read: config.public_read,
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>, content_type: &str) -> Result<String> {
        check_upload(bucket, key, &body)?;

        let size = body.len();
        let mut request = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body));

        if self.public_read {
            request = request.acl(ObjectCannedAcl::PublicRead);
        }

        request.send().await.map_err(|e| {
            let message = aws_sdk_s3::error::DisplayErrorContext(&e).to_string();
            tracing::error!(bucket, key, error = %message, "object upload failed");

            StorageError::Upload {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message,
            }
        })?;

        tracing::info!(bucket, key, bytes = size, "uploaded object");

        Ok(public_url(&self.public_base, bucket, key))
    }
}
