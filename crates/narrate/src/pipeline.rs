//! PDF-to-speech narration pipeline.
//!
//! Stages, each usable on its own:
//! - extract and clean document text
//! - summarize the cleaned text
//! - synthesize the summary and frame the PCM as WAV

use thiserror::Error;

use crate::pcm::truncate_to_frames;
use crate::provider::{ProviderError, Summarizer, Synthesizer, TextExtractor};
use crate::text::{clean_text, reading_time_minutes};
use crate::wav::{EncodeError, WavContainer, encode};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{0} is empty")]
    EmptyText(&'static str),
    #[error("text extraction failed")]
    Extract(#[source] ProviderError),
    #[error("summarization failed")]
    Summarize(#[source] ProviderError),
    #[error("speech synthesis failed")]
    Synthesize(#[source] ProviderError),
    #[error("could not frame synthesized audio")]
    Encode(#[from] EncodeError),
}

/// Everything produced by one [`Narrator::run`].
#[derive(Debug, Clone)]
pub struct Narration {
    pub text: String,
    pub summary: String,
    pub reading_time_minutes: usize,
    pub audio: WavContainer,
}

#[derive(Debug)]
pub struct Narrator<E, S, Y> {
    extractor: E,
    summarizer: S,
    synthesizer: Y,
}

impl<E, S, Y> Narrator<E, S, Y> {
    /// Stages whose capability is never exercised may be given `()`.
    pub fn new(extractor: E, summarizer: S, synthesizer: Y) -> Self {
        Self {
            extractor,
            summarizer,
            synthesizer,
        }
    }
}

impl<E: TextExtractor, S, Y> Narrator<E, S, Y> {
    /// Extracted and cleaned document text.
    pub fn extract(&self, document: &[u8]) -> Result<String, PipelineError> {
        let raw = self
            .extractor
            .extract_text(document)
            .map_err(PipelineError::Extract)?;
        let text = clean_text(&raw);
        if text.is_empty() {
            return Err(PipelineError::EmptyText("extracted text"));
        }
        log::info!(
            "extracted {} chars (~{} min read)",
            text.len(),
            reading_time_minutes(&text)
        );
        Ok(text)
    }
}

impl<E, S: Summarizer, Y> Narrator<E, S, Y> {
    pub fn summarize(&self, text: &str) -> Result<String, PipelineError> {
        if text.trim().is_empty() {
            return Err(PipelineError::EmptyText("text to summarize"));
        }
        let summary = self
            .summarizer
            .summarize(text)
            .map_err(PipelineError::Summarize)?;
        let summary = summary.trim();
        if summary.is_empty() {
            return Err(PipelineError::EmptyText("summary"));
        }
        log::info!("summary: {} chars from {} chars", summary.len(), text.len());
        Ok(summary.to_string())
    }
}

impl<E, S, Y: Synthesizer> Narrator<E, S, Y> {
    /// Synthesize `text` and frame the result as a WAV container.
    pub fn speak(&self, text: &str, voice: &str) -> Result<WavContainer, PipelineError> {
        if text.trim().is_empty() {
            return Err(PipelineError::EmptyText("text to speak"));
        }
        let format = self.synthesizer.format();
        let mut pcm = self
            .synthesizer
            .synthesize(text, voice)
            .map_err(PipelineError::Synthesize)?;

        let dropped = truncate_to_frames(&mut pcm, format);
        if dropped > 0 {
            log::warn!("dropping {dropped} trailing bytes of a partial audio frame");
        }

        let wav = encode(&pcm, format)?;
        log::info!("synthesized {} bytes of audio ({format}, voice {voice})", pcm.len());
        Ok(wav)
    }
}

impl<E, S, Y> Narrator<E, S, Y>
where
    E: TextExtractor,
    S: Summarizer,
    Y: Synthesizer,
{
    pub fn run(&self, document: &[u8], voice: &str) -> Result<Narration, PipelineError> {
        let text = self.extract(document)?;
        let summary = self.summarize(&text)?;
        let audio = self.speak(&summary, voice)?;
        Ok(Narration {
            reading_time_minutes: reading_time_minutes(&text),
            text,
            summary,
            audio,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::{Narrator, PipelineError};
    use crate::format::AudioFormat;
    use crate::provider::{ProviderError, Summarizer, Synthesizer, TextExtractor};
    use crate::wav::decode;

    struct FakeExtractor(&'static str);

    impl TextExtractor for FakeExtractor {
        fn extract_text(&self, _document: &[u8]) -> Result<String, ProviderError> {
            Ok(self.0.to_string())
        }
    }

    struct FirstSentence;

    impl Summarizer for FirstSentence {
        fn summarize(&self, text: &str) -> Result<String, ProviderError> {
            let end = text.find('.').map_or(text.len(), |i| i + 1);
            Ok(format!("  {}  ", &text[..end]))
        }
    }

    struct FakeVoice {
        pcm: Vec<u8>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl FakeVoice {
        fn new(pcm: Vec<u8>) -> Self {
            Self {
                pcm,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl Synthesizer for FakeVoice {
        fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, ProviderError> {
            self.calls
                .lock()
                .expect("calls lock")
                .push((text.to_string(), voice.to_string()));
            Ok(self.pcm.clone())
        }

        fn format(&self) -> AudioFormat {
            AudioFormat::default()
        }
    }

    struct Unreachable;

    impl Summarizer for Unreachable {
        fn summarize(&self, _text: &str) -> Result<String, ProviderError> {
            Err(ProviderError::Status {
                service: "summarization API",
                status: 503,
                body: "down".to_string(),
            })
        }
    }

    #[test]
    fn run_produces_decodable_wav_of_summary() {
        let narrator = Narrator::new(
            FakeExtractor("Page 1\nFirst   sentence here. Second sentence.\nPage 2\nThird."),
            FirstSentence,
            FakeVoice::new(vec![0x01, 0x00, 0x02, 0x00]),
        );
        let out = narrator.run(b"%PDF-", "arman").expect("run");

        assert_eq!(out.text, "First sentence here. Second sentence. Third.");
        assert_eq!(out.summary, "First sentence here.");
        assert_eq!(out.reading_time_minutes, 1);

        let decoded = decode(out.audio.as_bytes()).expect("decode");
        assert_eq!(decoded.format, AudioFormat::default());
        assert_eq!(decoded.pcm, &[0x01, 0x00, 0x02, 0x00]);

        let calls = narrator.synthesizer.calls.lock().expect("calls lock");
        assert_eq!(
            calls.as_slice(),
            &[("First sentence here.".to_string(), "arman".to_string())]
        );
    }

    #[test]
    fn empty_document_text_stops_before_summary() {
        let narrator = Narrator::new(FakeExtractor(" Page 3 \n "), Unreachable, FakeVoice::new(vec![]));
        assert!(matches!(
            narrator.run(b"%PDF-", "arman"),
            Err(PipelineError::EmptyText("extracted text"))
        ));
    }

    #[test]
    fn summarizer_failure_is_reported_as_such() {
        let narrator = Narrator::new(FakeExtractor("Some text."), Unreachable, FakeVoice::new(vec![]));
        let err = narrator.run(b"%PDF-", "arman").expect_err("summary fails");
        assert!(matches!(err, PipelineError::Summarize(ProviderError::Status { status: 503, .. })));
    }

    #[test]
    fn error_chain_names_provider_failure_once() {
        let narrator = Narrator::new(FakeExtractor("Some text."), Unreachable, FakeVoice::new(vec![]));
        let err = narrator.run(b"%PDF-", "arman").expect_err("summary fails");
        assert_eq!(err.to_string(), "summarization failed");

        let source = std::error::Error::source(&err).expect("provider source");
        let chain = format!("{err}: {source}");
        assert_eq!(chain.matches("503").count(), 1, "{chain}");
    }

    #[test]
    fn odd_trailing_byte_is_dropped_before_framing() {
        let narrator = Narrator::new((), (), FakeVoice::new(vec![0x10, 0x00, 0x20]));
        let wav = narrator.speak("Hello.", "arman").expect("speak");
        assert_eq!(wav.data_len(), 2);
        assert_eq!(wav.payload(), &[0x10, 0x00]);
    }

    #[test]
    fn blank_inputs_are_rejected() {
        let narrator = Narrator::new((), FirstSentence, FakeVoice::new(vec![0, 0]));
        assert!(matches!(
            narrator.summarize("   "),
            Err(PipelineError::EmptyText(_))
        ));
        assert!(matches!(narrator.speak("", "arman"), Err(PipelineError::EmptyText(_))));
        assert!(narrator.synthesizer.calls.lock().expect("calls lock").is_empty());
    }
}
