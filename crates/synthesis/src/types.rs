use serde::{Deserialize, Serialize};

/// Which operation a job asks for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    /// Speak a transcript in the voice of a reference recording
    #[default]
    Tts,
    /// Rewrite part of an existing recording to match a new transcript
    Inpaint,
}

/// Timing of one word in the source recording, in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordTime {
    pub word: String,
    pub start: f64,
    pub end: f64,
}

/// Job input as received, before validation
///
/// Every field is optional so that missing values surface as validation
/// errors naming the field rather than as deserialization failures.
#[derive(Debug, Default, Deserialize)]
pub struct RawInput {
    pub task: Option<Task>,
    pub reference_audio_url: Option<String>,
    pub transcript: Option<String>,
    pub audio_url: Option<String>,
    pub input_text: Option<String>,
    pub output_text: Option<String>,
    pub word_times: Option<Vec<WordTime>>,
    pub bucket_name: Option<String>,
    pub object_key_prefix: Option<String>,
    pub num_steps: Option<i64>,
    pub init_temp: Option<f64>,
    pub init_diversity: Option<f64>,
    pub guidance: Option<f64>,
    pub rescale: Option<f64>,
    pub topk: Option<i64>,
    pub audio_token_syllable_ratio: Option<f64>,
    pub use_manual_ratio: Option<bool>,
}

/// Diffusion sampling knobs forwarded to the model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SamplingParams {
    pub num_steps: u32,
    pub init_temp: f64,
    pub init_diversity: f64,
    pub guidance: f64,
    pub rescale: f64,
    pub topk: u32,
    /// Audio tokens per syllable; the model estimates it when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_token_syllable_ratio: Option<f64>,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            num_steps: 30,
            init_temp: 1.0,
            init_diversity: 1.0,
            guidance: 0.5,
            rescale: 0.7,
            topk: 25,
            audio_token_syllable_ratio: None,
        }
    }
}

/// Outcome of one job, serialized as the job response
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JobResult {
    Success(JobOutput),
    Error { message: String },
}

impl JobResult {
    /// Error result carrying the display form of `error`
    pub fn failure(error: &impl std::fmt::Display) -> Self {
        Self::Error {
            message: error.to_string(),
        }
    }

    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Payload of a successful job
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JobOutput {
    Speech {
        audio_url: String,
        transcript: String,
    },
    Inpaint {
        audio_url: String,
        input_text: String,
        word_times: Vec<WordTime>,
    },
}

impl JobOutput {
    pub fn audio_url(&self) -> &str {
        match self {
            Self::Speech { audio_url, .. } | Self::Inpaint { audio_url, .. } => audio_url,
        }
    }
}
