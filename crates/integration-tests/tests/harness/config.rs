//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;

use secrecy::SecretString;
use url::Url;
use voicecast_config::{Config, ModelConfig, ServerConfig, StorageConfig, SynthesisConfig, TelemetryConfig};

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a builder pointed at a model service and a storage endpoint
    pub fn new(model_url: &str, storage_endpoint: &str) -> Self {
        let storage = StorageConfig::new(
            Url::parse(storage_endpoint).expect("valid URL"),
            SecretString::from("test-access-key"),
            SecretString::from("test-secret-key"),
        );

        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    ..ServerConfig::default()
                },
                storage,
                model: ModelConfig {
                    base_url: Url::parse(model_url).expect("valid URL"),
                    timeout_secs: 10,
                    ..ModelConfig::default()
                },
                synthesis: SynthesisConfig {
                    fetch_timeout_secs: 5,
                    ..SynthesisConfig::default()
                },
                telemetry: TelemetryConfig::default(),
            },
        }
    }

    /// Send a bearer key with model requests
    pub fn with_model_api_key(mut self, key: &str) -> Self {
        self.config.model.api_key = Some(SecretString::from(key));
        self
    }

    /// Serve uploaded objects from a CDN base instead of the endpoint
    pub fn with_public_url(mut self, url: &str) -> Self {
        self.config.storage.public_url = Some(Url::parse(url).expect("valid URL"));
        self
    }

    /// Upload with a public-read ACL
    pub fn with_public_read(mut self) -> Self {
        self.config.storage.public_read = true;
        self
    }

    /// Override the longest chunk sent to the model
    pub fn with_max_chunk_chars(mut self, max: usize) -> Self {
        self.config.synthesis.max_chunk_chars = max;
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
