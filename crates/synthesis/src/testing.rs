//! In-process stand-ins for the model and the object store

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;

use async_trait::async_trait;
use storage::{ObjectStore, StorageError, check_upload};

use crate::{
    audio::{AudioSegment, encode_wav},
    error::{Result, SynthesisError},
    fetch::ReferenceFetcher,
    handler::{Handler, HandlerSettings},
    job::InpaintJob,
    model::SpeechModel,
    types::SamplingParams,
};

/// Samples emitted per transcript character by [`FakeModel`]
pub const SAMPLES_PER_CHAR: usize = 240;

/// Rate of the audio emitted by [`FakeModel`]
pub const MODEL_RATE: u32 = 24_000;

/// Model that speaks `SAMPLES_PER_CHAR` samples per character
#[derive(Default)]
pub struct FakeModel {
    pub texts: Mutex<Vec<String>>,
    pub inpaints: AtomicUsize,
    pub fail_with: Option<String>,
}

impl FakeModel {
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.texts.lock().unwrap().len() + self.inpaints.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechModel for FakeModel {
    async fn synthesize(&self, _reference: &[u8], text: &str, _params: &SamplingParams) -> Result<AudioSegment> {
        self.texts.lock().unwrap().push(text.to_string());

        if let Some(ref message) = self.fail_with {
            return Err(SynthesisError::Synthesis(message.clone()));
        }

        Ok(AudioSegment {
            samples: vec![0.1; text.chars().count() * SAMPLES_PER_CHAR],
            sample_rate: MODEL_RATE,
        })
    }

    async fn inpaint(&self, _source: &[u8], job: &InpaintJob) -> Result<AudioSegment> {
        self.inpaints.fetch_add(1, Ordering::SeqCst);

        Ok(AudioSegment {
            samples: vec![0.2; job.output_text.chars().count() * SAMPLES_PER_CHAR],
            sample_rate: MODEL_RATE,
        })
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// One recorded upload
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub bucket: String,
    pub key: String,
    pub body: Vec<u8>,
    pub content_type: String,
}

/// Object store that keeps uploads in memory
#[derive(Default)]
pub struct MemoryStore {
    pub objects: Mutex<Vec<StoredObject>>,
    pub reject: bool,
}

impl MemoryStore {
    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }

    pub fn uploads(&self) -> Vec<StoredObject> {
        self.objects.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(&self, bucket: &str, key: &str, body: Vec<u8>, content_type: &str) -> storage::Result<String> {
        check_upload(bucket, key, &body)?;

        if self.reject {
            return Err(StorageError::Upload {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: "AccessDenied".to_string(),
            });
        }

        self.objects.lock().unwrap().push(StoredObject {
            bucket: bucket.to_string(),
            key: key.to_string(),
            body,
            content_type: content_type.to_string(),
        });

        Ok(format!("https://cdn.test/{bucket}/{key}"))
    }
}

pub fn settings() -> HandlerSettings {
    HandlerSettings {
        sample_rate: 16_000,
        inpaint_sample_rate: 48_000,
        max_chunk_chars: 500,
        default_bucket: "speech-bucket".to_string(),
        inpaint_bucket: "inpaint-bucket".to_string(),
    }
}

pub fn handler(model: Arc<FakeModel>, store: Arc<MemoryStore>) -> Handler {
    let fetcher = ReferenceFetcher::new(Duration::from_secs(5), 1 << 20).unwrap();
    Handler::new(settings(), fetcher, model, store)
}

/// A short valid WAV usable as reference audio
pub fn reference_wav() -> Vec<u8> {
    encode_wav(&[0.0, 0.1, 0.2, 0.1], 16_000).unwrap()
}
