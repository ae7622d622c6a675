//! Service configuration (`narrate.json` plus environment overrides).

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_SPEECH_ENDPOINT, DEFAULT_SUMMARIZATION_ENDPOINT, DEFAULT_SUMMARIZATION_MODEL,
    DEFAULT_TIMEOUT_SECS, DEFAULT_VOICE_ID, SAMPLE_RATE_HZ,
};
use crate::summarize::SummaryParams;

pub const ENV_HUGGING_FACE_TOKEN: &str = "HUGGING_FACE_TOKEN";
pub const ENV_WAVE_API_KEY: &str = "WAVE_API_KEY";
pub const ENV_VOICE: &str = "NARRATE_VOICE";
pub const ENV_SAMPLE_RATE: &str = "NARRATE_SAMPLE_RATE";

/// Read from the working directory by [`NarrateConfig::load`].
pub const DOTENV_FILE: &str = ".env";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrateConfig {
    pub huggingface_token: Option<String>,
    pub waves_api_key: Option<String>,
    pub summarization_endpoint: String,
    pub summarization_model: String,
    pub summary: SummaryParams,
    pub speech_endpoint: String,
    pub voice_id: String,
    pub sample_rate: u32,
    pub timeout_secs: u64,
}

impl Default for NarrateConfig {
    fn default() -> Self {
        Self {
            huggingface_token: None,
            waves_api_key: None,
            summarization_endpoint: DEFAULT_SUMMARIZATION_ENDPOINT.to_string(),
            summarization_model: DEFAULT_SUMMARIZATION_MODEL.to_string(),
            summary: SummaryParams::default(),
            speech_endpoint: DEFAULT_SPEECH_ENDPOINT.to_string(),
            voice_id: DEFAULT_VOICE_ID.to_string(),
            sample_rate: SAMPLE_RATE_HZ,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl NarrateConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json).context("parse narrate config")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        let json = std::fs::read_to_string(path_ref)
            .with_context(|| format!("read {}", path_ref.display()))?;
        Self::from_json_str(&json)
    }

    /// Defaults or `path`, then `./.env`, then the process environment on top.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_dotenv(path, Path::new(DOTENV_FILE))
    }

    /// Like [`NarrateConfig::load`] with an explicit dotenv file. A missing file is skipped.
    pub fn load_with_dotenv(path: Option<&Path>, dotenv: &Path) -> Result<Self> {
        let mut cfg = match path {
            Some(p) => Self::from_path(p)?,
            None => Self::default(),
        };
        let file_vars = read_dotenv(dotenv)?;
        cfg.apply_env_with_dotenv(|key| std::env::var(key).ok(), &file_vars)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// [`NarrateConfig::apply_env`] falling back to `dotenv` for keys `lookup` does not set.
    pub fn apply_env_with_dotenv(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
        dotenv: &HashMap<String, String>,
    ) -> Result<()> {
        self.apply_env(|key| lookup(key).or_else(|| dotenv.get(key).cloned()))
    }

    /// Override fields from `lookup` (normally `std::env::var`). Empty values are skipped.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = get(ENV_HUGGING_FACE_TOKEN) {
            self.huggingface_token = Some(token);
        }
        if let Some(key) = get(ENV_WAVE_API_KEY) {
            self.waves_api_key = Some(key);
        }
        if let Some(voice) = get(ENV_VOICE) {
            self.voice_id = voice;
        }
        if let Some(rate) = get(ENV_SAMPLE_RATE) {
            self.sample_rate = rate
                .trim()
                .parse()
                .with_context(|| format!("{ENV_SAMPLE_RATE}={rate:?} is not an integer"))?;
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.sample_rate > 0, "sample_rate must be > 0");
        anyhow::ensure!(self.timeout_secs > 0, "timeout_secs must be > 0");
        anyhow::ensure!(!self.voice_id.is_empty(), "voice_id must not be empty");
        anyhow::ensure!(
            self.summary.min_length <= self.summary.max_length,
            "summary.min_length must not exceed summary.max_length"
        );
        if self
            .huggingface_token
            .as_deref()
            .is_some_and(|t| !t.starts_with("hf_"))
        {
            log::warn!("Hugging Face token does not start with \"hf_\"; requests will likely fail");
        }
        Ok(())
    }
}

/// Parse a dotenv file into key/value pairs without touching the process environment.
pub fn read_dotenv(path: &Path) -> Result<HashMap<String, String>> {
    let iter = match dotenvy::from_path_iter(path) {
        Ok(iter) => iter,
        Err(e) if e.not_found() => return Ok(HashMap::new()),
        Err(e) => return Err(e).with_context(|| format!("open {}", path.display())),
    };
    let vars = iter
        .collect::<Result<HashMap<_, _>, _>>()
        .with_context(|| format!("parse {}", path.display()))?;
    log::debug!("read {} entries from {}", vars.len(), path.display());
    Ok(vars)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::{NarrateConfig, read_dotenv};

    fn tmp_file(name: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        p.push(format!("narrate-config-test-{name}-{nanos}.json"));
        p
    }

    #[test]
    fn defaults_match_speech_service() {
        let cfg = NarrateConfig::default();
        assert_eq!(cfg.sample_rate, 16_000);
        assert_eq!(cfg.voice_id, "arman");
        assert_eq!(cfg.summarization_model, "facebook/bart-large-cnn");
        assert_eq!(cfg.summary.max_length, 500);
        cfg.validate().expect("defaults are valid");
    }

    #[test]
    fn parse_partial_config_smoke() {
        let json = r#"
        {
          "voice_id": "emily",
          "sample_rate": 24000,
          "summary": { "max_length": 200 },
          "waves_api_key": "secret"
        }
        "#;
        let cfg = NarrateConfig::from_json_str(json).expect("config parse");
        assert_eq!(cfg.voice_id, "emily");
        assert_eq!(cfg.sample_rate, 24_000);
        assert_eq!(cfg.summary.max_length, 200);
        assert_eq!(cfg.summary.min_length, 30);
        assert_eq!(cfg.waves_api_key.as_deref(), Some("secret"));
        assert!(cfg.huggingface_token.is_none());
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(NarrateConfig::from_json_str(r#"{"sample_rate": 0}"#).is_err());
        assert!(NarrateConfig::from_json_str(r#"{"timeout_secs": 0}"#).is_err());
        assert!(
            NarrateConfig::from_json_str(r#"{"summary": {"min_length": 600, "max_length": 500}}"#)
                .is_err()
        );
        assert!(NarrateConfig::from_json_str("not json").is_err());
    }

    #[test]
    fn env_overrides_file_values() {
        let env: HashMap<&str, &str> = [
            ("HUGGING_FACE_TOKEN", "hf_abc"),
            ("WAVE_API_KEY", ""),
            ("NARRATE_VOICE", "mike"),
            ("NARRATE_SAMPLE_RATE", " 22050 "),
        ]
        .into_iter()
        .collect();

        let mut cfg = NarrateConfig {
            waves_api_key: Some("from-file".to_string()),
            ..NarrateConfig::default()
        };
        cfg.apply_env(|k| env.get(k).map(|v| v.to_string()))
            .expect("apply env");

        assert_eq!(cfg.huggingface_token.as_deref(), Some("hf_abc"));
        assert_eq!(cfg.waves_api_key.as_deref(), Some("from-file"));
        assert_eq!(cfg.voice_id, "mike");
        assert_eq!(cfg.sample_rate, 22_050);
    }

    #[test]
    fn bad_env_sample_rate_is_an_error() {
        let mut cfg = NarrateConfig::default();
        let err = cfg
            .apply_env(|k| (k == "NARRATE_SAMPLE_RATE").then(|| "fast".to_string()))
            .expect_err("not a number");
        assert!(err.to_string().contains("NARRATE_SAMPLE_RATE"));
    }

    #[test]
    fn loads_from_file() {
        let path = tmp_file("load");
        std::fs::write(&path, r#"{"voice_id": "arnav", "timeout_secs": 5}"#).expect("write");

        let cfg = NarrateConfig::from_path(&path).expect("load");
        assert_eq!(cfg.voice_id, "arnav");
        assert_eq!(cfg.timeout().as_secs(), 5);

        std::fs::remove_file(path).expect("cleanup");
    }

    #[test]
    fn dotenv_fills_keys_missing_from_environment() {
        let path = tmp_file("dotenv");
        std::fs::write(
            &path,
            "# api keys\nHUGGING_FACE_TOKEN=hf_from_file\nWAVE_API_KEY=\"wave-file\"\nNARRATE_VOICE=file-voice\n",
        )
        .expect("write");

        let vars = read_dotenv(&path).expect("read dotenv");
        assert_eq!(vars.get("WAVE_API_KEY").map(String::as_str), Some("wave-file"));

        let process: HashMap<&str, &str> = [("NARRATE_VOICE", "env-voice")].into_iter().collect();
        let mut cfg = NarrateConfig::default();
        cfg.apply_env_with_dotenv(|k| process.get(k).map(|v| v.to_string()), &vars)
            .expect("apply env");

        assert_eq!(cfg.huggingface_token.as_deref(), Some("hf_from_file"));
        assert_eq!(cfg.waves_api_key.as_deref(), Some("wave-file"));
        assert_eq!(cfg.voice_id, "env-voice");

        std::fs::remove_file(path).expect("cleanup");
    }

    #[test]
    fn missing_dotenv_is_empty() {
        let vars = read_dotenv(&tmp_file("absent")).expect("missing file is fine");
        assert!(vars.is_empty());
    }
}
