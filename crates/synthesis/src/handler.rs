use std::{sync::Arc, time::Duration};

use serde_json::Value;
use storage::{ObjectStore, S3Store, object_key};
use tokio::sync::Semaphore;
use tracing::Instrument;

use crate::{
    audio::{AudioSegment, concatenate, encode_wav},
    chunk::chunk_transcript,
    error::{Result, SynthesisError},
    fetch::ReferenceFetcher,
    job::{Destination, InpaintJob, Job, SpeechJob},
    model::{SpeechModel, playdiffusion::PlayDiffusionModel},
    types::{JobOutput, JobResult},
};

const WAV_EXTENSION: &str = ".wav";
const WAV_CONTENT_TYPE: &str = "audio/wav";

/// Pipeline settings taken from configuration
#[derive(Debug, Clone)]
pub struct HandlerSettings {
    /// Sample rate of the uploaded WAV
    pub sample_rate: u32,
    /// Sample rate of uploaded inpainting results
    pub inpaint_sample_rate: u32,
    /// Longest transcript chunk per model call, in characters
    pub max_chunk_chars: usize,
    /// Bucket for speech jobs that do not name one
    pub default_bucket: String,
    /// Bucket for inpainting jobs that do not name one
    pub inpaint_bucket: String,
}

impl HandlerSettings {
    pub fn from_config(config: &voicecast_config::Config) -> Self {
        Self {
            sample_rate: config.synthesis.sample_rate,
            inpaint_sample_rate: config.synthesis.inpaint_sample_rate,
            max_chunk_chars: config.synthesis.max_chunk_chars,
            default_bucket: config.storage.default_bucket.clone(),
            inpaint_bucket: config.storage.inpaint_bucket.clone(),
        }
    }
}

/// Runs synthesis jobs, one at a time
pub struct Handler {
    settings: HandlerSettings,
    fetcher: ReferenceFetcher,
    model: Arc<dyn SpeechModel>,
    store: Arc<dyn ObjectStore>,
    jobs: Semaphore,
}

impl Handler {
    pub fn new(
        settings: HandlerSettings,
        fetcher: ReferenceFetcher,
        model: Arc<dyn SpeechModel>,
        store: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            settings,
            fetcher,
            model,
            store,
            jobs: Semaphore::new(1),
        }
    }

    /// Run one job event (`{"id"?: ..., "input": {...}}`) to completion
    ///
    /// Every failure is folded into the error result; this never panics on
    /// bad input and never returns both an error and an audio URL.
    pub async fn handle(&self, event: &Value) -> JobResult {
        let job_id = event.get("id").and_then(Value::as_str).unwrap_or("-").to_string();
        let span = tracing::info_span!("job", id = %job_id);

        async {
            let Ok(_permit) = self.jobs.acquire().await else {
                return JobResult::failure(&SynthesisError::Config("worker is shutting down".to_string()));
            };

            tracing::info!("worker start");

            match self.run(event).await {
                Ok(output) => {
                    tracing::info!(audio_url = output.audio_url(), "job succeeded");
                    JobResult::Success(output)
                }
                Err(e) => {
                    tracing::error!(stage = e.stage(), error = %e, "job failed");
                    JobResult::failure(&e)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run(&self, event: &Value) -> Result<JobOutput> {
        match Job::from_event(event)? {
            Job::Speech(job) => self.speak(job).await,
            Job::Inpaint(job) => self.inpaint(job).await,
        }
    }

    async fn speak(&self, job: SpeechJob) -> Result<JobOutput> {
        let chunks = chunk_transcript(&job.transcript, self.settings.max_chunk_chars);
        let reference = self.fetcher.fetch(&job.reference_audio_url).await?;

        tracing::info!(
            model = self.model.name(),
            chunks = chunks.len(),
            transcript_chars = job.transcript.chars().count(),
            "synthesizing transcript"
        );

        let mut segments = Vec::with_capacity(chunks.len());

        for (index, chunk) in chunks.iter().enumerate() {
            let segment = self.model.synthesize(&reference, chunk, &job.params).await?;

            tracing::debug!(
                chunk = index,
                seconds = segment.duration().as_secs_f64(),
                "chunk synthesized"
            );

            segments.push(segment);
        }

        let audio_url = self
            .upload(
                &segments,
                self.settings.sample_rate,
                &job.destination,
                &self.settings.default_bucket,
            )
            .await?;

        Ok(JobOutput::Speech {
            audio_url,
            transcript: job.transcript,
        })
    }

    async fn inpaint(&self, job: InpaintJob) -> Result<JobOutput> {
        let source = self.fetcher.fetch(&job.audio_url).await?;

        tracing::info!(model = self.model.name(), words = job.word_times.len(), "inpainting audio");

        let segment = self.model.inpaint(&source, &job).await?;

        let audio_url = self
            .upload(
                &[segment],
                self.settings.inpaint_sample_rate,
                &job.destination,
                &self.settings.inpaint_bucket,
            )
            .await?;

        Ok(JobOutput::Inpaint {
            audio_url,
            input_text: job.input_text,
            word_times: job.word_times,
        })
    }

    async fn upload(
        &self,
        segments: &[AudioSegment],
        sample_rate: u32,
        destination: &Destination,
        default_bucket: &str,
    ) -> Result<String> {
        let samples = concatenate(segments, sample_rate)?;
        let wav = encode_wav(&samples, sample_rate)?;

        let bucket = destination.bucket.as_deref().unwrap_or(default_bucket);
        let key = object_key(&destination.key_prefix, WAV_EXTENSION);

        tracing::debug!(
            bucket,
            key = %key,
            sample_rate,
            bytes = wav.len(),
            "uploading audio"
        );

        Ok(self.store.put(bucket, &key, wav, WAV_CONTENT_TYPE).await?)
    }
}

/// Builder for constructing the handler from configuration
pub struct HandlerBuilder<'a> {
    config: &'a voicecast_config::Config,
}

impl<'a> HandlerBuilder<'a> {
    pub const fn new(config: &'a voicecast_config::Config) -> Self {
        Self { config }
    }

    /// Wire the HTTP fetcher, the PlayDiffusion client and the S3 store
    pub async fn build(self) -> Result<Handler> {
        let config = self.config;

        let fetcher = ReferenceFetcher::new(
            Duration::from_secs(config.synthesis.fetch_timeout_secs),
            config.synthesis.max_reference_bytes,
        )?;

        let model = PlayDiffusionModel::new(
            &config.model.base_url,
            config.model.api_key.clone(),
            Duration::from_secs(config.model.timeout_secs),
            config.model.max_response_bytes,
        )?;

        let store = S3Store::new(&config.storage).await;

        tracing::debug!(
            model_url = %config.model.base_url,
            storage_endpoint = %config.storage.endpoint,
            sample_rate = config.synthesis.sample_rate,
            "synthesis handler initialized"
        );

        Ok(Handler::new(
            HandlerSettings::from_config(config),
            fetcher,
            Arc::new(model),
            Arc::new(store),
        ))
    }
}
