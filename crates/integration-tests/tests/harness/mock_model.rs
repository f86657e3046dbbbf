//! Mock PlayDiffusion inference service for integration tests
//!
//! Speaks a fixed number of samples per input character and also serves
//! the reference recording, so one mock covers both outbound calls.

use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

/// Samples produced per character of requested text
pub const SAMPLES_PER_CHAR: usize = 240;

/// Sample rate of the produced audio
pub const MODEL_RATE: u32 = 24_000;

/// Mock model backend with call accounting
pub struct MockPlayDiffusion {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    texts: Mutex<Vec<String>>,
    inpaint_count: AtomicU32,
    download_count: AtomicU32,
    authorization: Mutex<Option<String>>,
    /// Error body returned by every synthesis call, if set
    failure: Option<String>,
}

impl MockPlayDiffusion {
    /// Start the mock server, returning immediately
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_inner(None).await
    }

    /// Start a mock whose model calls all fail with 500 and `message`
    pub async fn start_failing(message: &str) -> anyhow::Result<Self> {
        Self::start_inner(Some(message.to_owned())).await
    }

    async fn start_inner(failure: Option<String>) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            texts: Mutex::new(Vec::new()),
            inpaint_count: AtomicU32::new(0),
            download_count: AtomicU32::new(0),
            authorization: Mutex::new(None),
            failure,
        });

        let app = Router::new()
            .route("/tts", routing::post(handle_tts))
            .route("/inpaint", routing::post(handle_inpaint))
            .route("/audio/voice.wav", routing::get(handle_reference))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL for configuring the mock as the model service
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// URL of the reference recording served by the mock
    pub fn reference_url(&self) -> String {
        format!("http://{}/audio/voice.wav", self.addr)
    }

    /// URL on the mock that answers 404
    pub fn missing_url(&self) -> String {
        format!("http://{}/audio/missing.wav", self.addr)
    }

    /// Texts received by `/tts`, in arrival order
    pub fn texts(&self) -> Vec<String> {
        self.state.texts.lock().unwrap().clone()
    }

    /// Number of `/tts` requests received
    pub fn tts_count(&self) -> usize {
        self.state.texts.lock().unwrap().len()
    }

    /// Number of `/inpaint` requests received
    pub fn inpaint_count(&self) -> u32 {
        self.state.inpaint_count.load(Ordering::Relaxed)
    }

    /// Number of reference downloads served
    pub fn download_count(&self) -> u32 {
        self.state.download_count.load(Ordering::Relaxed)
    }

    /// `Authorization` header of the last model request
    pub fn last_authorization(&self) -> Option<String> {
        self.state.authorization.lock().unwrap().clone()
    }
}

impl Drop for MockPlayDiffusion {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[derive(Debug, Deserialize)]
struct TtsRequest {
    text: String,
    reference_audio: String,
    num_steps: u32,
}

#[derive(Debug, Deserialize)]
struct InpaintRequest {
    #[allow(dead_code)]
    input_text: String,
    output_text: String,
    input_word_times: Vec<serde_json::Value>,
    audio: String,
}

/// Encode `len` samples of a quiet tone as 16-bit mono WAV
pub fn wav(len: usize, sample_rate: u32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut buffer = Vec::new();
    {
        let mut writer = hound::WavWriter::new(Cursor::new(&mut buffer), spec).unwrap();
        for i in 0..len {
            writer.write_sample(if i % 2 == 0 { 1_000_i16 } else { -1_000 }).unwrap();
        }
        writer.finalize().unwrap();
    }
    buffer
}

fn audio_response(bytes: Vec<u8>) -> Response {
    ([(header::CONTENT_TYPE, "audio/wav")], bytes).into_response()
}

fn record_authorization(state: &MockState, headers: &HeaderMap) {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    *state.authorization.lock().unwrap() = value;
}

async fn handle_tts(State(state): State<Arc<MockState>>, headers: HeaderMap, Json(req): Json<TtsRequest>) -> Response {
    record_authorization(&state, &headers);
    state.texts.lock().unwrap().push(req.text.clone());

    if let Some(ref message) = state.failure {
        return (StatusCode::INTERNAL_SERVER_ERROR, message.clone()).into_response();
    }

    if req.reference_audio.is_empty() || req.num_steps == 0 {
        return (StatusCode::UNPROCESSABLE_ENTITY, "missing reference audio or steps").into_response();
    }

    audio_response(wav(req.text.chars().count() * SAMPLES_PER_CHAR, MODEL_RATE))
}

async fn handle_inpaint(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(req): Json<InpaintRequest>,
) -> Response {
    record_authorization(&state, &headers);
    state.inpaint_count.fetch_add(1, Ordering::Relaxed);

    if let Some(ref message) = state.failure {
        return (StatusCode::INTERNAL_SERVER_ERROR, message.clone()).into_response();
    }

    if req.audio.is_empty() || req.input_word_times.is_empty() {
        return (StatusCode::UNPROCESSABLE_ENTITY, "missing audio or word times").into_response();
    }

    audio_response(wav(req.output_text.chars().count() * SAMPLES_PER_CHAR, MODEL_RATE))
}

async fn handle_reference(State(state): State<Arc<MockState>>) -> Response {
    state.download_count.fetch_add(1, Ordering::Relaxed);
    audio_response(wav(4_800, 48_000))
}
