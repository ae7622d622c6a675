//! Hugging Face inference API summarizer.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::config::NarrateConfig;
use crate::provider::{ProviderError, Summarizer, http_client, post_json};

const SERVICE: &str = "summarization API";

/// Generation parameters forwarded to the summarization model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryParams {
    pub max_length: u32,
    pub min_length: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub repetition_penalty: f32,
}

impl Default for SummaryParams {
    fn default() -> Self {
        Self {
            max_length: 500,
            min_length: 30,
            temperature: 0.7,
            top_p: 0.95,
            repetition_penalty: 1.2,
        }
    }
}

#[derive(Debug, Serialize)]
struct SummarizeRequest<'a> {
    inputs: &'a str,
    parameters: &'a SummaryParams,
}

#[derive(Debug, Deserialize)]
struct SummaryItem {
    summary_text: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SummaryResponse {
    List(Vec<SummaryItem>),
    Single(SummaryItem),
}

#[derive(Debug)]
pub struct HuggingFaceSummarizer {
    client: Client,
    url: String,
    token: String,
    params: SummaryParams,
}

impl HuggingFaceSummarizer {
    pub fn new(
        endpoint: &str,
        model: &str,
        token: impl Into<String>,
        params: SummaryParams,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(timeout)?,
            url: format!("{}/{}", endpoint.trim_end_matches('/'), model),
            token: token.into(),
            params,
        })
    }

    pub fn from_config(cfg: &NarrateConfig) -> Result<Self, ProviderError> {
        let token = cfg
            .huggingface_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(ProviderError::MissingCredential("HUGGING_FACE_TOKEN"))?;
        Self::new(
            &cfg.summarization_endpoint,
            &cfg.summarization_model,
            token,
            cfg.summary.clone(),
            cfg.timeout(),
        )
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Summarizer for HuggingFaceSummarizer {
    fn summarize(&self, text: &str) -> Result<String, ProviderError> {
        let body = SummarizeRequest {
            inputs: text,
            parameters: &self.params,
        };
        let resp = post_json(&self.client, SERVICE, &self.url, &self.token, &body)?;
        let bytes = resp.bytes()?;
        parse_summary_response(&bytes)
    }
}

fn parse_summary_response(body: &[u8]) -> Result<String, ProviderError> {
    let parsed: SummaryResponse = serde_json::from_slice(body)
        .map_err(|e| ProviderError::MalformedResponse(format!("summary json: {e}")))?;
    let summary = match parsed {
        SummaryResponse::List(items) => items.into_iter().next().map(|i| i.summary_text),
        SummaryResponse::Single(item) => Some(item.summary_text),
    };
    summary
        .filter(|s| !s.trim().is_empty())
        .ok_or(ProviderError::EmptyResponse(SERVICE))
}
