//! PCM stream parameters.

use thiserror::Error;

use crate::constants::{BITS_PER_SAMPLE, CHANNELS, SAMPLE_RATE_HZ};

/// Parameters needed to interpret or produce an interleaved PCM stream.
///
/// Block align and byte rate are always derived, never stored, so a value of
/// this type cannot disagree with itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AudioFormat {
    sample_rate: u32,
    channels: u16,
    bits_per_sample: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("sample rate must be > 0")]
    ZeroSampleRate,
    #[error("channel count must be > 0")]
    ZeroChannels,
    #[error("bits per sample must be a non-zero multiple of 8, got {0}")]
    BitsPerSample(u16),
    #[error("block align overflows u16 ({channels} channels x {bits_per_sample} bits)")]
    BlockAlignOverflow { channels: u16, bits_per_sample: u16 },
    #[error("byte rate overflows u32 ({sample_rate} Hz x {block_align} bytes)")]
    ByteRateOverflow { sample_rate: u32, block_align: u16 },
}

impl AudioFormat {
    pub fn new(sample_rate: u32, channels: u16, bits_per_sample: u16) -> Result<Self, FormatError> {
        if sample_rate == 0 {
            return Err(FormatError::ZeroSampleRate);
        }
        if channels == 0 {
            return Err(FormatError::ZeroChannels);
        }
        if bits_per_sample == 0 || bits_per_sample % 8 != 0 {
            return Err(FormatError::BitsPerSample(bits_per_sample));
        }
        let block_align = channels.checked_mul(bits_per_sample / 8).ok_or(
            FormatError::BlockAlignOverflow {
                channels,
                bits_per_sample,
            },
        )?;
        if sample_rate.checked_mul(u32::from(block_align)).is_none() {
            return Err(FormatError::ByteRateOverflow {
                sample_rate,
                block_align,
            });
        }
        Ok(Self {
            sample_rate,
            channels,
            bits_per_sample,
        })
    }

    /// Mono 16-bit signed PCM, the shape the speech API returns.
    pub fn mono16(sample_rate: u32) -> Result<Self, FormatError> {
        Self::new(sample_rate, 1, 16)
    }

    #[must_use]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    #[must_use]
    pub fn channels(&self) -> u16 {
        self.channels
    }

    #[must_use]
    pub fn bits_per_sample(&self) -> u16 {
        self.bits_per_sample
    }

    /// Bytes per frame (one sample for every channel).
    #[must_use]
    pub fn block_align(&self) -> u16 {
        self.channels * (self.bits_per_sample / 8)
    }

    #[must_use]
    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * u32::from(self.block_align())
    }
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self {
            sample_rate: SAMPLE_RATE_HZ,
            channels: CHANNELS,
            bits_per_sample: BITS_PER_SAMPLE,
        }
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} Hz, {} ch, {}-bit PCM",
            self.sample_rate, self.channels, self.bits_per_sample
        )
    }
}
