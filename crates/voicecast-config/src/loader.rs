use std::path::Path;

use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::{Config, ModelConfig, ServerConfig, StorageConfig, SynthesisConfig, TelemetryConfig};

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        tracing::debug!(path = %path.display(), "loading configuration file");

        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::parse(&raw)
    }

    /// Parse and validate configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing, or validation fails
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Build configuration from environment variables alone
    ///
    /// Requires `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` and
    /// `SPACES_ENDPOINT_URL`. `SPACES_PUBLIC_URL`, `SPACES_REGION`,
    /// `VOICECAST_BUCKET`, `PLAYDIFFUSION_URL` and `PLAYDIFFUSION_API_KEY`
    /// are optional.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is unset, a URL is
    /// malformed, or validation fails
    pub fn from_env() -> anyhow::Result<Self> {
        tracing::debug!("building configuration from environment");

        let endpoint = parse_url("SPACES_ENDPOINT_URL", &required_var("SPACES_ENDPOINT_URL")?)?;
        let access_key_id = SecretString::from(required_var("AWS_ACCESS_KEY_ID")?);
        let secret_access_key = SecretString::from(required_var("AWS_SECRET_ACCESS_KEY")?);

        let mut storage = StorageConfig::new(endpoint, access_key_id, secret_access_key);

        if let Some(public_url) = optional_var("SPACES_PUBLIC_URL") {
            storage.public_url = Some(parse_url("SPACES_PUBLIC_URL", &public_url)?);
        }
        if let Some(region) = optional_var("SPACES_REGION") {
            storage.region = region;
        }
        if let Some(bucket) = optional_var("VOICECAST_BUCKET") {
            storage.default_bucket = bucket;
        }

        let mut model = ModelConfig::default();

        if let Some(base_url) = optional_var("PLAYDIFFUSION_URL") {
            model.base_url = parse_url("PLAYDIFFUSION_URL", &base_url)?;
        }
        model.api_key = optional_var("PLAYDIFFUSION_API_KEY").map(SecretString::from);

        let config = Self {
            server: ServerConfig::default(),
            storage,
            model,
            synthesis: SynthesisConfig::default(),
            telemetry: TelemetryConfig::default(),
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_storage_config()?;
        self.validate_model_config()?;
        self.validate_synthesis_config()?;

        if !self.server.health.path.starts_with('/') {
            anyhow::bail!("server.health.path must start with '/'");
        }

        Ok(())
    }

    fn validate_storage_config(&self) -> anyhow::Result<()> {
        let storage = &self.storage;

        require_http("storage.endpoint", &storage.endpoint)?;

        if let Some(ref public_url) = storage.public_url {
            require_http("storage.public_url", public_url)?;
        }

        if storage.access_key_id.expose_secret().is_empty() {
            anyhow::bail!("storage.access_key_id must not be empty");
        }

        if storage.secret_access_key.expose_secret().is_empty() {
            anyhow::bail!("storage.secret_access_key must not be empty");
        }

        if storage.region.trim().is_empty() {
            anyhow::bail!("storage.region must not be empty");
        }

        if storage.default_bucket.trim().is_empty() || storage.inpaint_bucket.trim().is_empty() {
            anyhow::bail!("storage bucket names must not be empty");
        }

        Ok(())
    }

    fn validate_model_config(&self) -> anyhow::Result<()> {
        require_http("model.base_url", &self.model.base_url)?;

        if self.model.timeout_secs == 0 {
            anyhow::bail!("model.timeout_secs must be greater than 0");
        }

        if self.model.max_response_bytes == 0 {
            anyhow::bail!("model.max_response_bytes must be greater than 0");
        }

        Ok(())
    }

    fn validate_synthesis_config(&self) -> anyhow::Result<()> {
        let synthesis = &self.synthesis;

        for (field, rate) in [
            ("sample_rate", synthesis.sample_rate),
            ("inpaint_sample_rate", synthesis.inpaint_sample_rate),
        ] {
            if !(8_000..=192_000).contains(&rate) {
                anyhow::bail!("synthesis.{field} must be between 8000 and 192000, got {rate}");
            }
        }

        if synthesis.max_chunk_chars == 0 {
            anyhow::bail!("synthesis.max_chunk_chars must be greater than 0");
        }

        if synthesis.fetch_timeout_secs == 0 {
            anyhow::bail!("synthesis.fetch_timeout_secs must be greater than 0");
        }

        if synthesis.max_reference_bytes == 0 {
            anyhow::bail!("synthesis.max_reference_bytes must be greater than 0");
        }

        Ok(())
    }
}

fn require_http(field: &str, url: &Url) -> anyhow::Result<()> {
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => anyhow::bail!("{field} must use http or https, got '{other}'"),
    }
}

fn required_var(name: &str) -> anyhow::Result<String> {
    optional_var(name).ok_or_else(|| anyhow::anyhow!("environment variable not found: `{name}`"))
}

fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parse_url(name: &str, value: &str) -> anyhow::Result<Url> {
    Url::parse(value).map_err(|e| anyhow::anyhow!("{name} is not a valid URL: {e}"))
}
