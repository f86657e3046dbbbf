use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// PlayDiffusion inference service configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    /// Base URL of the inference service
    #[serde(default = "default_base_url")]
    pub base_url: Url,
    /// Bearer token sent to the inference service
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Largest audio response accepted from the service, in bytes
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
            max_response_bytes: default_max_response_bytes(),
        }
    }
}

fn default_base_url() -> Url {
    Url::parse("http://127.0.0.1:8001").expect("static URL is valid")
}

#[allow(clippy::missing_const_for_fn)]
fn default_timeout_secs() -> u64 {
    600
}

#[allow(clippy::missing_const_for_fn)]
fn default_max_response_bytes() -> usize {
    256 << 20
}
