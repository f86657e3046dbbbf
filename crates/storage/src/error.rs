use thiserror::Error;

pub type Result<T> = std::result::Result<T, StorageError>;

/// Object store errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// The upload was rejected before reaching the store
    #[error("invalid upload: {0}")]
    InvalidRequest(String),

    /// The store refused or failed the upload
    #[error("failed to upload s3://{bucket}/{key}: {message}")]
    Upload {
        bucket: String,
        key: String,
        message: String,
    },
}
