//! Helpers over raw little-endian PCM byte buffers.

use std::time::Duration;

use crate::format::AudioFormat;

/// Serialize 16-bit samples as little-endian bytes.
#[must_use]
pub fn i16_to_le_bytes(samples: &[i16]) -> Vec<u8> {
    let mut out = Vec::with_capacity(samples.len() * 2);
    for s in samples {
        out.extend_from_slice(&s.to_le_bytes());
    }
    out
}

/// Read little-endian 16-bit samples; a dangling odd byte is ignored.
#[must_use]
pub fn le_bytes_to_i16(pcm: &[u8]) -> Vec<i16> {
    pcm.chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect()
}

/// Length of the longest prefix of `len` bytes made of whole frames.
#[must_use]
pub fn aligned_len(len: usize, format: AudioFormat) -> usize {
    let block = usize::from(format.block_align());
    len - len % block
}

/// Drop a trailing partial frame, returning how many bytes were removed.
pub fn truncate_to_frames(pcm: &mut Vec<u8>, format: AudioFormat) -> usize {
    let keep = aligned_len(pcm.len(), format);
    let dropped = pcm.len() - keep;
    pcm.truncate(keep);
    dropped
}

#[must_use]
pub fn frame_count(len: usize, format: AudioFormat) -> usize {
    len / usize::from(format.block_align())
}

/// Playback length of `len` payload bytes.
#[must_use]
pub fn duration(len: usize, format: AudioFormat) -> Duration {
    let frames = frame_count(len, format) as u64;
    let rate = u64::from(format.sample_rate());
    let secs = frames / rate;
    let nanos = (frames % rate) * 1_000_000_000 / rate;
    Duration::new(secs, nanos as u32)
}

/// Mean of all channels per frame, scaled to [-1, 1). 16-bit input only.
#[must_use]
pub fn downmix_i16_to_mono_f32(pcm: &[u8], channels: u16) -> Vec<f32> {
    let frame_bytes = usize::from(channels.max(1)) * 2;
    pcm.chunks_exact(frame_bytes)
        .map(|frame| {
            let sum: f32 = frame
                .chunks_exact(2)
                .map(|b| f32::from(i16::from_le_bytes([b[0], b[1]])) / 32768.0)
                .sum();
            sum / f32::from(channels.max(1))
        })
        .collect()
}
