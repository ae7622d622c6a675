//! narrate core library.
//!
//! This crate provides:
//! - Canonical PCM <-> WAV framing (`wav`, `format`, `pcm`)
//! - Capability traits for text extraction, summarization and speech (`provider`)
//! - HTTP and PDF implementations of those capabilities
//! - The PDF-to-speech narration pipeline

pub mod config;
pub mod constants;
pub mod format;
pub mod pcm;
pub mod pdf;
pub mod pipeline;
pub mod provider;
pub mod speech;
pub mod summarize;
pub mod text;
pub mod wav;

pub use format::AudioFormat;
pub use wav::{DecodeError, DecodedWav, EncodeError, WavContainer, decode, encode};
