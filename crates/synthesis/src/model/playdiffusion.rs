//! Client for a PlayDiffusion inference service
//!
//! The service answers `POST /tts` and `POST /inpaint` with a WAV body.
//! Audio travels base64-encoded inside the JSON request.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use url::Url;

use crate::{
    audio::AudioSegment,
    error::{Result, SynthesisError},
    fetch::read_capped,
    job::InpaintJob,
    types::{SamplingParams, WordTime},
};

use super::SpeechModel;

/// PlayDiffusion served over HTTP
pub struct PlayDiffusionModel {
    client: Client,
    base_url: String,
    api_key: Option<SecretString>,
    max_response_bytes: usize,
}

impl PlayDiffusionModel {
    pub fn new(
        base_url: &Url,
        api_key: Option<SecretString>,
        timeout: Duration,
        max_response_bytes: usize,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .build()
            .map_err(|e| SynthesisError::Config(format!("failed to build model HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            api_key,
            max_response_bytes,
        })
    }

    async fn post<B: Serialize + Sync>(&self, route: &str, body: &B) -> Result<AudioSegment> {
        let url = format!("{}/{route}", self.base_url);

        let mut request = self.client.post(&url).json(body);
        if let Some(ref api_key) = self.api_key {
            request = request.bearer_auth(api_key.expose_secret());
        }

        let mut response = request.send().await.map_err(|e| {
            tracing::error!(%url, error = %e, "PlayDiffusion request failed");
            SynthesisError::Synthesis(format!("failed to reach PlayDiffusion: {e}"))
        })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());

            tracing::error!(%url, %status, "PlayDiffusion API error: {error_text}");

            return Err(SynthesisError::Synthesis(format!(
                "PlayDiffusion returned HTTP {}: {error_text}",
                status.as_u16()
            )));
        }

        let audio = read_capped(&mut response, self.max_response_bytes)
            .await
            .map_err(|e| SynthesisError::Synthesis(format!("failed to read PlayDiffusion response: {e}")))?
            .ok_or_else(|| {
                SynthesisError::Synthesis(format!(
                    "PlayDiffusion response exceeds the {} byte limit",
                    self.max_response_bytes
                ))
            })?;

        let segment = AudioSegment::from_wav(&audio)
            .map_err(|e| SynthesisError::Synthesis(format!("PlayDiffusion returned invalid audio: {e}")))?;

        if segment.samples.is_empty() {
            return Err(SynthesisError::Synthesis("PlayDiffusion returned no audio".to_string()));
        }

        Ok(segment)
    }
}

#[derive(Serialize)]
struct TtsRequest<'a> {
    text: &'a str,
    reference_audio: String,
    #[serde(flatten)]
    params: &'a SamplingParams,
}

#[derive(Serialize)]
struct InpaintRequest<'a> {
    input_text: &'a str,
    output_text: &'a str,
    input_word_times: &'a [WordTime],
    audio: String,
    #[serde(flatten)]
    params: &'a SamplingParams,
}

#[async_trait]
impl SpeechModel for PlayDiffusionModel {
    async fn synthesize(&self, reference: &[u8], text: &str, params: &SamplingParams) -> Result<AudioSegment> {
        tracing::debug!(text_chars = text.chars().count(), num_steps = params.num_steps, "PlayDiffusion TTS request");

        let body = TtsRequest {
            text,
            reference_audio: STANDARD.encode(reference),
            params,
        };

        let segment = self.post("tts", &body).await?;

        tracing::debug!(
            samples = segment.samples.len(),
            sample_rate = segment.sample_rate,
            "PlayDiffusion TTS complete"
        );

        Ok(segment)
    }

    async fn inpaint(&self, source: &[u8], job: &InpaintJob) -> Result<AudioSegment> {
        tracing::debug!(words = job.word_times.len(), "PlayDiffusion inpaint request");

        let body = InpaintRequest {
            input_text: &job.input_text,
            output_text: &job.output_text,
            input_word_times: &job.word_times,
            audio: STANDARD.encode(source),
            params: &job.params,
        };

        self.post("inpaint", &body).await
    }

    fn name(&self) -> &str {
        "playdiffusion"
    }
}
