#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod audio;
pub mod chunk;
mod error;
mod fetch;
mod handler;
pub mod job;
pub mod model;
mod request;
mod types;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::{get, post}};

pub use error::{Result, SynthesisError};
pub use fetch::ReferenceFetcher;
pub use handler::{Handler, HandlerBuilder, HandlerSettings};
pub use types::{JobOutput, JobResult, RawInput, SamplingParams, Task, WordTime};
use request::ExtractEvent;

/// Build the synthesis handler from configuration
pub async fn build_handler(config: &voicecast_config::Config) -> anyhow::Result<Arc<Handler>> {
    let handler = HandlerBuilder::new(config)
        .build()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize synthesis handler: {e}"))?;

    Ok(Arc::new(handler))
}

/// Create the job endpoint router
///
/// `/run` and `/runsync` both execute the job before responding; a job
/// result is always returned with status 200, whether it succeeded or not.
pub fn endpoint_router() -> Router<Arc<Handler>> {
    Router::new()
        .route("/run", post(run_job))
        .route("/runsync", post(run_job))
}

/// Full application router: job endpoints plus the optional health check
pub fn app_router(handler: Arc<Handler>, server: &voicecast_config::ServerConfig) -> Router {
    let mut router = endpoint_router().with_state(handler);

    if server.health.enabled {
        router = router.route(&server.health.path, get(health_handler));
    }

    router
}

/// Handle one job event
async fn run_job(State(handler): State<Arc<Handler>>, ExtractEvent(event): ExtractEvent) -> Json<JobResult> {
    tracing::debug!("job endpoint called");

    Json(handler.handle(&event).await)
}

/// Health check handler
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
