#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod error;
mod key;
mod s3;

use async_trait::async_trait;

pub use error::{Result, StorageError};
pub use key::object_key;
pub use s3::S3Store;

/// Destination for synthesized audio files
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `body` under `bucket`/`key` and return its public URL
    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>, content_type: &str) -> Result<String>;
}

/// Reject uploads that can never succeed
///
/// Shared by every [`ObjectStore`] implementation so that empty payloads and
/// missing buckets fail the same way regardless of backend.
pub fn check_upload(bucket: &str, key: &str, body: &[u8]) -> Result<()> {
    if body.is_empty() {
        return Err(StorageError::InvalidRequest("audio data is empty".to_string()));
    }

    if bucket.trim().is_empty() {
        return Err(StorageError::InvalidRequest("bucket name is required".to_string()));
    }

    if key.is_empty() {
        return Err(StorageError::InvalidRequest("object key is required".to_string()));
    }

    Ok(())
}

/// Public URL of an object, in path style under `base`
pub fn public_url(base: &url::Url, bucket: &str, key: &str) -> String {
    format!("{}/{bucket}/{key}", base.as_str().trim_end_matches('/'))
}
