#![allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use std::io::Cursor;
use std::time::Duration;

use rubato::{FastFixedIn, PolynomialDegree, Resampler};

use crate::error::{Result, SynthesisError};

/// Mono audio produced by one model call
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSegment {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioSegment {
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }

        Duration::from_secs_f64(self.samples.len() as f64 / f64::from(self.sample_rate))
    }

    /// Decode a WAV file, downmixing to mono
    ///
    /// Accepts integer PCM of any bit depth and 32-bit float.
    pub fn from_wav(bytes: &[u8]) -> std::result::Result<Self, hound::Error> {
        let reader = hound::WavReader::new(Cursor::new(bytes))?;
        let spec = reader.spec();

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Int => {
                let shift = spec
                    .bits_per_sample
                    .checked_sub(1)
                    .filter(|shift| *shift < 32)
                    .ok_or(hound::Error::FormatError("unsupported bits per sample"))?;
                let scale = (1_i64 << shift) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|sample| sample.map(|s| s as f32 / scale))
                    .collect::<std::result::Result<_, _>>()?
            }
            hound::SampleFormat::Float => reader.into_samples::<f32>().collect::<std::result::Result<_, _>>()?,
        };

        let channels = usize::from(spec.channels.max(1));
        let samples = if channels == 1 {
            interleaved
        } else {
            interleaved
                .chunks(channels)
                .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
                .collect()
        };

        Ok(Self {
            samples,
            sample_rate: spec.sample_rate,
        })
    }

    /// Samples at `target_rate`
    ///
    /// The output holds exactly `len * target_rate / sample_rate` samples,
    /// with the resampler's output delay removed.
    pub fn resampled(&self, target_rate: u32) -> Result<Vec<f32>> {
        if self.sample_rate == target_rate || self.samples.is_empty() || self.sample_rate == 0 {
            return Ok(self.samples.clone());
        }

        let frames = (self.samples.len() as u64 * u64::from(target_rate) / u64::from(self.sample_rate)) as usize;

        let mut resampler = FastFixedIn::<f32>::new(
            f64::from(target_rate) / f64::from(self.sample_rate),
            1.0,
            PolynomialDegree::Septic,
            self.samples.len(),
            1,
        )
        .map_err(|e| SynthesisError::Encoding(format!("failed to create resampler: {e}")))?;

        let input = [self.samples.as_slice()];
        let output = resampler
            .process(&input[..], None)
            .map_err(|e| SynthesisError::Encoding(format!("resampling failed: {e}")))?;

        // flush the samples still held back by the output delay
        let tail = resampler
            .process_partial(None::<&[Vec<f32>]>, None)
            .map_err(|e| SynthesisError::Encoding(format!("resampling failed: {e}")))?;

        let mut samples: Vec<f32> = output.into_iter().chain(tail).flatten().collect();

        let delay = resampler.output_delay().min(samples.len());
        samples.drain(..delay);

        let last = samples.last().copied().unwrap_or_default();
        samples.resize(frames, last);

        tracing::trace!(
            from = self.sample_rate,
            to = target_rate,
            frames,
            "resampled audio segment"
        );

        Ok(samples)
    }
}

/// Join segments in order at a common sample rate
pub fn concatenate(segments: &[AudioSegment], sample_rate: u32) -> Result<Vec<f32>> {
    let mut samples = Vec::new();

    for segment in segments {
        samples.extend(segment.resampled(sample_rate)?);
    }

    Ok(samples)
}

/// Encode mono samples as a 16-bit PCM WAV file
///
/// Samples outside `[-1.0, 1.0]` are clipped.
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut buffer = Vec::with_capacity(44 + samples.len() * 2);
    {
        let mut writer = hound::WavWriter::new(Cursor::new(&mut buffer), spec)?;

        for &sample in samples {
            let value = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)).round() as i16;
            writer.write_sample(value)?;
        }

        writer.finalize()?;
    }

    Ok(buffer)
}
