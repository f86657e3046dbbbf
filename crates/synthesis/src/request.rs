use axum::{
    Json,
    body::Body,
    response::{IntoResponse, Response},
};
use http::StatusCode;
use serde_json::Value;

use crate::{error::SynthesisError, types::JobResult};

/// Body limit for job events (1 MiB)
const BODY_LIMIT_BYTES: usize = 1 << 20;

/// Extractor for a raw job event
///
/// Rejections use the job error shape so callers always receive
/// `{"status": "error", "message": ...}`.
pub struct ExtractEvent(pub Value);

impl<S> axum::extract::FromRequest<S> for ExtractEvent
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(request: http::Request<Body>, _state: &S) -> Result<Self, Self::Rejection> {
        let bytes = axum::body::to_bytes(request.into_body(), BODY_LIMIT_BYTES)
            .await
            .map_err(|err| {
                if std::error::Error::source(&err)
                    .is_some_and(|source| source.is::<http_body_util::LengthLimitError>())
                {
                    reject(
                        StatusCode::PAYLOAD_TOO_LARGE,
                        format!("request body is too large, limit is {BODY_LIMIT_BYTES} bytes"),
                    )
                } else {
                    reject(StatusCode::BAD_REQUEST, format!("failed to read request body: {err}"))
                }
            })?;

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(event @ Value::Object(_)) => Ok(Self(event)),
            Ok(_) => Err(reject(StatusCode::BAD_REQUEST, "request body must be a JSON object".to_string())),
            Err(e) => Err(reject(
                StatusCode::BAD_REQUEST,
                format!("request body is not valid JSON: {e}"),
            )),
        }
    }
}

fn reject(status: StatusCode, message: String) -> Response {
    tracing::warn!(%status, "rejected job request: {message}");

    (status, Json(JobResult::failure(&SynthesisError::Validation(message)))).into_response()
}
