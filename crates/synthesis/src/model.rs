pub mod playdiffusion;

use async_trait::async_trait;

use crate::{
    audio::AudioSegment,
    job::InpaintJob,
    types::SamplingParams,
};

/// Voice-cloning speech model
#[async_trait]
pub trait SpeechModel: Send + Sync {
    /// Speak `text` in the voice of the `reference` recording (WAV bytes)
    async fn synthesize(
        &self,
        reference: &[u8],
        text: &str,
        params: &SamplingParams,
    ) -> crate::error::Result<AudioSegment>;

    /// Rewrite the `source` recording (WAV bytes) as described by `job`
    async fn inpaint(&self, source: &[u8], job: &InpaintJob) -> crate::error::Result<AudioSegment>;

    /// Model name for logs
    fn name(&self) -> &str;
}
