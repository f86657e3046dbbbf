#![allow(clippy::must_use_candidate)]

mod env;
mod loader;
pub mod model;
pub mod server;
pub mod storage;
pub mod synthesis;
pub mod telemetry;

use serde::Deserialize;

pub use model::*;
pub use server::*;
pub use storage::*;
pub use synthesis::*;
pub use telemetry::*;

/// Top-level voicecast worker configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Job endpoint configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Object store the synthesized audio is uploaded to
    pub storage: StorageConfig,
    /// PlayDiffusion inference service
    #[serde(default)]
    pub model: ModelConfig,
    /// Synthesis pipeline tuning
    #[serde(default)]
    pub synthesis: SynthesisConfig,
    /// Logging configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}
