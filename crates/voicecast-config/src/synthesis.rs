use serde::Deserialize;

/// Synthesis pipeline settings
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SynthesisConfig {
    /// Sample rate of the uploaded WAV file
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Sample rate of uploaded inpainting results
    #[serde(default = "default_inpaint_sample_rate")]
    pub inpaint_sample_rate: u32,
    /// Longest transcript chunk sent to the model in one call, in characters
    #[serde(default = "default_max_chunk_chars")]
    pub max_chunk_chars: usize,
    /// Timeout for downloading reference audio, in seconds
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    /// Largest reference audio body accepted, in bytes
    #[serde(default = "default_max_reference_bytes")]
    pub max_reference_bytes: usize,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            inpaint_sample_rate: default_inpaint_sample_rate(),
            max_chunk_chars: default_max_chunk_chars(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            max_reference_bytes: default_max_reference_bytes(),
        }
    }
}

#[allow(clippy::missing_const_for_fn)]
fn default_sample_rate() -> u32 {
    16_000
}

#[allow(clippy::missing_const_for_fn)]
fn default_inpaint_sample_rate() -> u32 {
    48_000
}

#[allow(clippy::missing_const_for_fn)]
fn default_max_chunk_chars() -> usize {
    500
}

#[allow(clippy::missing_const_for_fn)]
fn default_fetch_timeout_secs() -> u64 {
    30
}

#[allow(clippy::missing_const_for_fn)]
fn default_max_reference_bytes() -> usize {
    50 << 20
}
