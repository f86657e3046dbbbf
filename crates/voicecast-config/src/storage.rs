use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Bucket used for speech jobs that do not name one
pub const DEFAULT_SPEECH_BUCKET: &str = "playdiffusion-audio";

/// Bucket used for inpainting jobs that do not name one
pub const DEFAULT_INPAINT_BUCKET: &str = "playdiffusion-inpainted-audio";

/// S3-compatible object store configuration (e.g. `DigitalOcean` Spaces)
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// API endpoint of the object store
    pub endpoint: Url,
    /// Base URL used to build public object links, defaults to `endpoint`
    #[serde(default)]
    pub public_url: Option<Url>,
    /// Signing region
    #[serde(default = "default_region")]
    pub region: String,
    pub access_key_id: SecretString,
    pub secret_access_key: SecretString,
    /// Bucket for speech jobs without `bucket_name`
    #[serde(default = "default_speech_bucket")]
    pub default_bucket: String,
    /// Bucket for inpainting jobs without `bucket_name`
    #[serde(default = "default_inpaint_bucket")]
    pub inpaint_bucket: String,
    /// Upload objects with a `public-read` ACL
    #[serde(default)]
    pub public_read: bool,
    /// Address buckets as `{endpoint}/{bucket}` instead of `{bucket}.{host}`
    #[serde(default = "default_force_path_style")]
    pub force_path_style: bool,
}

impl StorageConfig {
    /// Build a config with defaults for everything but the endpoint and credentials
    pub fn new(endpoint: Url, access_key_id: SecretString, secret_access_key: SecretString) -> Self {
        Self {
            endpoint,
            public_url: None,
            region: default_region(),
            access_key_id,
            secret_access_key,
            default_bucket: default_speech_bucket(),
            inpaint_bucket: default_inpaint_bucket(),
            public_read: false,
            force_path_style: default_force_path_style(),
        }
    }

    /// Base URL for public object links
    pub fn public_base_url(&self) -> &Url {
        self.public_url.as_ref().unwrap_or(&self.endpoint)
    }
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_speech_bucket() -> String {
    DEFAULT_SPEECH_BUCKET.to_string()
}

fn default_inpaint_bucket() -> String {
    DEFAULT_INPAINT_BUCKET.to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_force_path_style() -> bool {
    true
}
