//! Canonical RIFF/WAVE framing for raw PCM.
//!
//! Only the 44-byte layout is produced and accepted:
//! - `RIFF` descriptor with `WAVE` profile
//! - a 16-byte linear PCM `fmt ` chunk
//! - a single `data` chunk holding the payload verbatim

use thiserror::Error;

use crate::constants::{PCM_FMT_CHUNK_LEN, RIFF_SIZE_OVERHEAD, WAV_HEADER_LEN, WAVE_FORMAT_PCM};
use crate::format::AudioFormat;

const RIFF: &[u8; 4] = b"RIFF";
const WAVE: &[u8; 4] = b"WAVE";
const FMT: &[u8; 4] = b"fmt ";
const DATA: &[u8; 4] = b"data";

/// An encoded container: header followed by the PCM payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavContainer {
    format: AudioFormat,
    bytes: Vec<u8>,
}

/// Result of a successful [`decode`]; `pcm` borrows from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedWav<'a> {
    pub format: AudioFormat,
    pub pcm: &'a [u8],
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("pcm length {len} is not a multiple of block align {block_align}")]
    Misaligned { len: usize, block_align: u16 },
    #[error("pcm length {len} does not fit a RIFF chunk")]
    TooLarge { len: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("truncated WAV: need {needed} bytes, got {actual}")]
    Truncated { needed: usize, actual: usize },
    #[error("bad chunk tag at offset {offset}: {found:?}")]
    BadMagic { offset: usize, found: [u8; 4] },
    #[error("unsupported WAV format: {reason}")]
    UnsupportedFormat { reason: String },
}

fn read_u16_le(p: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([p[at], p[at + 1]])
}

fn read_u32_le(p: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([p[at], p[at + 1], p[at + 2], p[at + 3]])
}

fn tag_at(p: &[u8], at: usize) -> [u8; 4] {
    [p[at], p[at + 1], p[at + 2], p[at + 3]]
}

fn expect_tag(p: &[u8], at: usize, want: &[u8; 4]) -> Result<(), DecodeError> {
    let found = tag_at(p, at);
    if &found == want {
        Ok(())
    } else {
        Err(DecodeError::BadMagic { offset: at, found })
    }
}

/// Build the 44-byte header describing `data_len` payload bytes.
///
/// `data_len` must be at most `u32::MAX - 36`; [`encode`] enforces this.
#[must_use]
pub fn encode_header(data_len: u32, format: AudioFormat) -> [u8; WAV_HEADER_LEN] {
    let mut h = [0u8; WAV_HEADER_LEN];
    h[0..4].copy_from_slice(RIFF);
    h[4..8].copy_from_slice(&RIFF_SIZE_OVERHEAD.wrapping_add(data_len).to_le_bytes());
    h[8..12].copy_from_slice(WAVE);
    h[12..16].copy_from_slice(FMT);
    h[16..20].copy_from_slice(&PCM_FMT_CHUNK_LEN.to_le_bytes());
    h[20..22].copy_from_slice(&WAVE_FORMAT_PCM.to_le_bytes());
    h[22..24].copy_from_slice(&format.channels().to_le_bytes());
    h[24..28].copy_from_slice(&format.sample_rate().to_le_bytes());
    h[28..32].copy_from_slice(&format.byte_rate().to_le_bytes());
    h[32..34].copy_from_slice(&format.block_align().to_le_bytes());
    h[34..36].copy_from_slice(&format.bits_per_sample().to_le_bytes());
    h[36..40].copy_from_slice(DATA);
    h[40..44].copy_from_slice(&data_len.to_le_bytes());
    h
}

/// Frame `pcm` as a WAV container.
///
/// Fails without producing output if the payload is not a whole number of
/// frames or is too large for the 32-bit RIFF size field.
pub fn encode(pcm: &[u8], format: AudioFormat) -> Result<WavContainer, EncodeError> {
    let block_align = format.block_align();
    if pcm.len() % usize::from(block_align) != 0 {
        return Err(EncodeError::Misaligned {
            len: pcm.len(),
            block_align,
        });
    }

    let data_len = u32::try_from(pcm.len())
        .ok()
        .filter(|n| n.checked_add(RIFF_SIZE_OVERHEAD).is_some())
        .ok_or(EncodeError::TooLarge { len: pcm.len() })?;

    let mut bytes = Vec::with_capacity(WAV_HEADER_LEN + pcm.len());
    bytes.extend_from_slice(&encode_header(data_len, format));
    bytes.extend_from_slice(pcm);
    log::debug!("framed {} pcm bytes as WAV ({format})", pcm.len());
    Ok(WavContainer { format, bytes })
}

/// Validate a canonical WAV container and borrow its PCM payload.
///
/// Checks run in a fixed order and the first failure is returned. Bytes
/// past the declared data length are ignored.
pub fn decode(bytes: &[u8]) -> Result<DecodedWav<'_>, DecodeError> {
    if bytes.len() < WAV_HEADER_LEN {
        return Err(DecodeError::Truncated {
            needed: WAV_HEADER_LEN,
            actual: bytes.len(),
        });
    }

    expect_tag(bytes, 0, RIFF)?;
    expect_tag(bytes, 8, WAVE)?;

    expect_tag(bytes, 12, FMT)?;
    let fmt_len = read_u32_le(bytes, 16);
    if fmt_len != PCM_FMT_CHUNK_LEN {
        return Err(DecodeError::UnsupportedFormat {
            reason: format!("fmt chunk size {fmt_len}, only {PCM_FMT_CHUNK_LEN} is supported"),
        });
    }

    let audio_format = read_u16_le(bytes, 20);
    if audio_format != WAVE_FORMAT_PCM {
        return Err(DecodeError::UnsupportedFormat {
            reason: format!("audio format tag {audio_format}, only linear PCM (1) is supported"),
        });
    }

    expect_tag(bytes, 36, DATA)?;

    let data_len = read_u32_le(bytes, 40) as usize;
    let end = WAV_HEADER_LEN.saturating_add(data_len);
    if end > bytes.len() {
        return Err(DecodeError::Truncated {
            needed: end,
            actual: bytes.len(),
        });
    }
    if end < bytes.len() {
        log::debug!("ignoring {} trailing bytes after data chunk", bytes.len() - end);
    }

    // Descriptor fields are only judged once the framing itself is sound.
    let channels = read_u16_le(bytes, 22);
    let sample_rate = read_u32_le(bytes, 24);
    let bits_per_sample = read_u16_le(bytes, 34);
    let format = AudioFormat::new(sample_rate, channels, bits_per_sample).map_err(|e| {
        DecodeError::UnsupportedFormat {
            reason: e.to_string(),
        }
    })?;

    Ok(DecodedWav {
        format,
        pcm: &bytes[WAV_HEADER_LEN..end],
    })
}

impl WavContainer {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false: a container carries at least its header.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[must_use]
    pub fn header(&self) -> &[u8] {
        &self.bytes[..WAV_HEADER_LEN]
    }

    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.bytes[WAV_HEADER_LEN..]
    }

    /// The `Subchunk2Size` field.
    #[must_use]
    pub fn data_len(&self) -> u32 {
        read_u32_le(&self.bytes, 40)
    }

    /// The RIFF `ChunkSize` field.
    #[must_use]
    pub fn riff_len(&self) -> u32 {
        read_u32_le(&self.bytes, 4)
    }

    #[must_use]
    pub fn format(&self) -> AudioFormat {
        self.format
    }
}

impl AsRef<[u8]> for WavContainer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl DecodedWav<'_> {
    #[must_use]
    pub fn into_owned(self) -> (AudioFormat, Vec<u8>) {
        (self.format, self.pcm.to_vec())
    }
}
