//! Capabilities the narration pipeline delegates to outside services.
//!
//! Each trait has one job so the codec and pipeline can be exercised with
//! in-process fakes:
//! - [`TextExtractor`]: document bytes to text
//! - [`Summarizer`]: text to shorter text
//! - [`Synthesizer`]: text and voice to raw PCM

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde::Serialize;
use thiserror::Error;

use crate::format::{AudioFormat, FormatError};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("http request failed")]
    Http(#[from] reqwest::Error),
    #[error("{service} returned HTTP {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },
    #[error("{0} returned an empty response")]
    EmptyResponse(&'static str),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),
    #[error("not a PDF document")]
    NotPdf,
    #[error("PDF processing error: {0}")]
    Pdf(String),
    #[error("invalid audio format")]
    Format(#[from] FormatError),
}

pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, document: &[u8]) -> Result<String, ProviderError>;
}

pub trait Summarizer: Send + Sync {
    fn summarize(&self, text: &str) -> Result<String, ProviderError>;
}

pub trait Synthesizer: Send + Sync {
    /// Raw interleaved PCM in [`Synthesizer::format`].
    fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, ProviderError>;

    fn format(&self) -> AudioFormat;
}

pub(crate) fn http_client(timeout: Duration) -> Result<Client, ProviderError> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// POST `body` as JSON with bearer auth; non-2xx statuses become [`ProviderError::Status`].
pub(crate) fn post_json<T: Serialize + ?Sized>(
    client: &Client,
    service: &'static str,
    url: &str,
    token: &str,
    body: &T,
) -> Result<Response, ProviderError> {
    log::debug!("{service}: POST {url}");
    let resp = client.post(url).bearer_auth(token).json(body).send()?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp
            .text()
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(ProviderError::Status {
            service,
            status: status.as_u16(),
            body,
        });
    }
    log::debug!("{service}: HTTP {status}");
    Ok(resp)
}

impl<T: TextExtractor + ?Sized> TextExtractor for Box<T> {
    fn extract_text(&self, document: &[u8]) -> Result<String, ProviderError> {
        (**self).extract_text(document)
    }
}

impl<T: Summarizer + ?Sized> Summarizer for Box<T> {
    fn summarize(&self, text: &str) -> Result<String, ProviderError> {
        (**self).summarize(text)
    }
}

impl<T: Synthesizer + ?Sized> Synthesizer for Box<T> {
    fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, ProviderError> {
        (**self).synthesize(text, voice)
    }

    fn format(&self) -> AudioFormat {
        (**self).format()
    }
}
