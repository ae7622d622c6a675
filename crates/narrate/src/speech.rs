//! Waves "lightning" text-to-speech client.
//!
//! The service answers with headerless 16-bit mono PCM at the requested
//! sample rate. Some deployments wrap the audio in a JSON envelope with a
//! base64 payload instead; both shapes are accepted.

use std::time::Duration;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};

use crate::config::NarrateConfig;
use crate::format::AudioFormat;
use crate::provider::{ProviderError, Synthesizer, http_client, post_json};

const SERVICE: &str = "speech API";

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    voice_id: &'a str,
    text: &'a str,
    sample_rate: u32,
}

#[derive(Debug, Deserialize)]
struct SpeechEnvelope {
    audio_base64: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

#[derive(Debug)]
pub struct WavesSynthesizer {
    client: Client,
    url: String,
    api_key: String,
    format: AudioFormat,
}

impl WavesSynthesizer {
    pub fn new(
        url: impl Into<String>,
        api_key: impl Into<String>,
        sample_rate: u32,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(timeout)?,
            url: url.into(),
            api_key: api_key.into(),
            format: AudioFormat::mono16(sample_rate)?,
        })
    }

    pub fn from_config(cfg: &NarrateConfig) -> Result<Self, ProviderError> {
        let key = cfg
            .waves_api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(ProviderError::MissingCredential("WAVE_API_KEY"))?;
        Self::new(&cfg.speech_endpoint, key, cfg.sample_rate, cfg.timeout())
    }
}

impl Synthesizer for WavesSynthesizer {
    fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, ProviderError> {
        let body = SpeechRequest {
            voice_id: voice,
            text,
            sample_rate: self.format.sample_rate(),
        };
        let resp = post_json(&self.client, SERVICE, &self.url, &self.api_key, &body)?;
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let bytes = resp.bytes()?.to_vec();
        log::debug!(
            "{SERVICE}: {} bytes ({})",
            bytes.len(),
            content_type.as_deref().unwrap_or("no content type")
        );
        parse_speech_body(content_type.as_deref(), bytes)
    }

    fn format(&self) -> AudioFormat {
        self.format
    }
}

fn parse_speech_body(content_type: Option<&str>, body: Vec<u8>) -> Result<Vec<u8>, ProviderError> {
    let is_json = content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("json"));
    let pcm = if is_json {
        let env: SpeechEnvelope = serde_json::from_slice(&body)
            .map_err(|e| ProviderError::MalformedResponse(format!("speech json: {e}")))?;
        if !env.status.is_empty() && !env.status.eq_ignore_ascii_case("success") {
            log::warn!("{SERVICE}: status={} message={}", env.status, env.message);
        }
        STANDARD
            .decode(env.audio_base64.as_bytes())
            .map_err(|e| ProviderError::MalformedResponse(format!("audio_base64: {e}")))?
    } else {
        body
    };

    if pcm.is_empty() {
        return Err(ProviderError::EmptyResponse(SERVICE));
    }
    Ok(pcm)
}
