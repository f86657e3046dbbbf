use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::error::{Result, SynthesisError};

/// Downloads reference and source recordings
pub struct ReferenceFetcher {
    client: Client,
    max_bytes: usize,
}

impl ReferenceFetcher {
    pub fn new(timeout: Duration, max_bytes: usize) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Some(Duration::from_secs(5)))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| SynthesisError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, max_bytes })
    }

    /// Download `url` into memory
    ///
    /// Non-2xx responses, transport failures, empty bodies and bodies over
    /// the size limit are retrieval errors.
    pub async fn fetch(&self, url: &Url) -> Result<Vec<u8>> {
        tracing::info!(%url, "downloading audio");

        let mut response = self.client.get(url.clone()).send().await.map_err(|e| {
            tracing::error!(%url, error = %e, "audio download failed");
            SynthesisError::Retrieval(format!("failed to download audio from {url}: {e}"))
        })?;

        let status = response.status();

        if !status.is_success() {
            tracing::error!(%url, %status, "audio download returned an error status");
            return Err(SynthesisError::Retrieval(format!(
                "failed to download audio: HTTP {}",
                status.as_u16()
            )));
        }

        let body = read_capped(&mut response, self.max_bytes)
            .await
            .map_err(|e| SynthesisError::Retrieval(format!("failed to read audio body: {e}")))?
            .ok_or_else(|| self.too_large())?;

        if body.is_empty() {
            return Err(SynthesisError::Retrieval("downloaded audio is empty".to_string()));
        }

        tracing::debug!(%url, bytes = body.len(), "audio downloaded");

        Ok(body)
    }

    fn too_large(&self) -> SynthesisError {
        SynthesisError::Retrieval(format!("audio exceeds the {} byte limit", self.max_bytes))
    }
}

/// Read a response body, giving up once it exceeds `max_bytes`
///
/// Returns `Ok(None)` when the declared or actual length is over the limit.
pub async fn read_capped(
    response: &mut reqwest::Response,
    max_bytes: usize,
) -> std::result::Result<Option<Vec<u8>>, reqwest::Error> {
    if let Some(length) = response.content_length()
        && length > u64::try_from(max_bytes).unwrap_or(u64::MAX)
    {
        return Ok(None);
    }

    let mut body = Vec::new();

    while let Some(chunk) = response.chunk().await? {
        if body.len() + chunk.len() > max_bytes {
            return Ok(None);
        }
        body.extend_from_slice(&chunk);
    }

    Ok(Some(body))
}
