use storage::StorageError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SynthesisError>;

/// Failure of one synthesis job, named by the stage that failed
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// Missing or out-of-range job input
    #[error("validation error: {0}")]
    Validation(String),

    /// Reference audio could not be downloaded
    #[error("retrieval error: {0}")]
    Retrieval(String),

    /// The speech model failed or returned unusable audio
    #[error("synthesis error: {0}")]
    Synthesis(String),

    /// The synthesized audio could not be encoded
    #[error("encoding error: {0}")]
    Encoding(String),

    /// The object store rejected the upload
    #[error("upload error: {0}")]
    Upload(String),

    /// The worker is misconfigured
    #[error("configuration error: {0}")]
    Config(String),
}

impl SynthesisError {
    /// Short stage name used in logs
    pub const fn stage(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Retrieval(_) => "retrieval",
            Self::Synthesis(_) => "synthesis",
            Self::Encoding(_) => "encoding",
            Self::Upload(_) => "upload",
            Self::Config(_) => "config",
        }
    }
}

impl From<StorageError> for SynthesisError {
    fn from(error: StorageError) -> Self {
        Self::Upload(error.to_string())
    }
}

impl From<hound::Error> for SynthesisError {
    fn from(error: hound::Error) -> Self {
        Self::Encoding(error.to_string())
    }
}
