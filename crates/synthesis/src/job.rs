//! Validation of raw job input into typed jobs
//!
//! Everything here is pure: a job that fails validation never causes a
//! network call or a model invocation.

use serde_json::Value;
use url::Url;

use crate::{
    error::{Result, SynthesisError},
    types::{RawInput, SamplingParams, Task, WordTime},
};

/// A validated job
#[derive(Debug, Clone, PartialEq)]
pub enum Job {
    Speech(SpeechJob),
    Inpaint(InpaintJob),
}

/// Speak `transcript` in the voice of the reference recording
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechJob {
    pub reference_audio_url: Url,
    pub transcript: String,
    pub destination: Destination,
    pub params: SamplingParams,
}

/// Rewrite the source recording so that it says `output_text`
#[derive(Debug, Clone, PartialEq)]
pub struct InpaintJob {
    pub audio_url: Url,
    pub input_text: String,
    pub output_text: String,
    pub word_times: Vec<WordTime>,
    pub destination: Destination,
    pub params: SamplingParams,
}

/// Where the job's audio is uploaded
///
/// `bucket` is `None` when the job did not name one and the configured
/// default applies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Destination {
    pub bucket: Option<String>,
    pub key_prefix: String,
}

impl Job {
    /// Validate the `input` object of a job event
    ///
    /// A missing `input` is treated as an empty object so that the
    /// resulting error names the missing fields.
    pub fn from_event(event: &Value) -> Result<Self> {
        let input = match event.get("input") {
            None | Some(Value::Null) => RawInput::default(),
            Some(value @ Value::Object(_)) => RawInput::deserialize_value(value)?,
            Some(_) => return Err(SynthesisError::Validation("input must be a JSON object".to_string())),
        };

        Self::from_input(input)
    }

    pub fn from_input(input: RawInput) -> Result<Self> {
        match input.task.unwrap_or_default() {
            Task::Tts => SpeechJob::from_input(input).map(Self::Speech),
            Task::Inpaint => InpaintJob::from_input(input).map(Self::Inpaint),
        }
    }
}

impl RawInput {
    fn deserialize_value(value: &Value) -> Result<Self> {
        serde::Deserialize::deserialize(value)
            .map_err(|e| SynthesisError::Validation(format!("invalid input: {e}")))
    }
}

impl SpeechJob {
    fn from_input(input: RawInput) -> Result<Self> {
        let (url, transcript) = (
            present(input.reference_audio_url.as_deref()),
            present(input.transcript.as_deref()),
        );

        let (url, transcript) = match (url, transcript) {
            (Some(url), Some(transcript)) => (url, transcript),
            (url, transcript) => {
                return Err(missing_fields(&[
                    ("reference_audio_url", url.is_none()),
                    ("transcript", transcript.is_none()),
                ]));
            }
        };

        let reference_audio_url = parse_audio_url("reference_audio_url", url)?;
        let params = sampling_params(&input, true)?;
        let destination = destination(&input)?;

        Ok(Self {
            reference_audio_url,
            transcript: transcript.to_string(),
            destination,
            params,
        })
    }
}

impl InpaintJob {
    fn from_input(input: RawInput) -> Result<Self> {
        let url = present(input.audio_url.as_deref());
        let input_text = present(input.input_text.as_deref());
        let output_text = present(input.output_text.as_deref());
        let word_times = input.word_times.as_deref().filter(|times| !times.is_empty());

        let (Some(url), Some(input_text), Some(output_text), Some(word_times)) =
            (url, input_text, output_text, word_times)
        else {
            return Err(missing_fields(&[
                ("audio_url", url.is_none()),
                ("input_text", input_text.is_none()),
                ("output_text", output_text.is_none()),
                ("word_times", word_times.is_none()),
            ]));
        };

        let audio_url = parse_audio_url("audio_url", url)?;

        for (index, time) in word_times.iter().enumerate() {
            check_word_time(index, time)?;
        }

        let params = sampling_params(&input, input.use_manual_ratio.unwrap_or(false))?;
        let destination = destination(&input)?;

        Ok(Self {
            audio_url,
            input_text: input_text.to_string(),
            output_text: output_text.to_string(),
            word_times: word_times.to_vec(),
            destination,
            params,
        })
    }
}

/// Present and not blank
fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}

fn missing_fields(fields: &[(&str, bool)]) -> SynthesisError {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, missing)| *missing)
        .map(|(name, _)| *name)
        .collect();

    SynthesisError::Validation(format!("missing required input fields: {}", missing.join(", ")))
}

fn parse_audio_url(field: &str, value: &str) -> Result<Url> {
    let url = Url::parse(value.trim())
        .map_err(|e| SynthesisError::Validation(format!("{field} is not a valid URL: {e}")))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(SynthesisError::Validation(format!(
            "{field} must use http or https, got '{other}'"
        ))),
    }
}

fn check_word_time(index: usize, time: &WordTime) -> Result<()> {
    let valid = time.start.is_finite() && time.end.is_finite() && time.start >= 0.0 && time.start <= time.end;

    if valid {
        Ok(())
    } else {
        Err(SynthesisError::Validation(format!(
            "word_times[{index}] ('{}') must have 0 <= start <= end, got start={} end={}",
            time.word, time.start, time.end
        )))
    }
}

fn destination(input: &RawInput) -> Result<Destination> {
    let bucket = match input.bucket_name.as_deref() {
        None => None,
        Some(name) if name.trim().is_empty() => {
            return Err(SynthesisError::Validation("bucket_name must not be empty".to_string()));
        }
        Some(name) => Some(name.trim().to_string()),
    };

    Ok(Destination {
        bucket,
        key_prefix: input.object_key_prefix.clone().unwrap_or_default(),
    })
}

/// Range-check the sampling parameters, falling back to defaults
///
/// Out-of-range values are rejected rather than clamped. The syllable ratio
/// is validated whenever present but forwarded only if `keep_ratio` is set.
fn sampling_params(input: &RawInput, keep_ratio: bool) -> Result<SamplingParams> {
    let defaults = SamplingParams::default();

    let ratio = input
        .audio_token_syllable_ratio
        .map(|value| check_float("audio_token_syllable_ratio", value, 5.0, 25.0))
        .transpose()?;

    Ok(SamplingParams {
        num_steps: check_int("num_steps", input.num_steps, 1, 100)?.unwrap_or(defaults.num_steps),
        init_temp: optional_float("init_temp", input.init_temp, 0.5, 10.0)?.unwrap_or(defaults.init_temp),
        init_diversity: optional_float("init_diversity", input.init_diversity, 0.0, 10.0)?
            .unwrap_or(defaults.init_diversity),
        guidance: optional_float("guidance", input.guidance, 0.0, 10.0)?.unwrap_or(defaults.guidance),
        rescale: optional_float("rescale", input.rescale, 0.0, 1.0)?.unwrap_or(defaults.rescale),
        topk: check_int("topk", input.topk, 1, 10_000)?.unwrap_or(defaults.topk),
        audio_token_syllable_ratio: ratio.filter(|_| keep_ratio),
    })
}

fn check_int(field: &str, value: Option<i64>, min: u32, max: u32) -> Result<Option<u32>> {
    let Some(value) = value else {
        return Ok(None);
    };

    u32::try_from(value)
        .ok()
        .filter(|value| (min..=max).contains(value))
        .map(Some)
        .ok_or_else(|| SynthesisError::Validation(format!("{field} must be between {min} and {max}, got {value}")))
}

fn optional_float(field: &str, value: Option<f64>, min: f64, max: f64) -> Result<Option<f64>> {
    value.map(|value| check_float(field, value, min, max)).transpose()
}

fn check_float(field: &str, value: f64, min: f64, max: f64) -> Result<f64> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(SynthesisError::Validation(format!(
            "{field} must be between {min} and {max}, got {value}"
        )))
    }
}
