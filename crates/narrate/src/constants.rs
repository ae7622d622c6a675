//! Audio framing and service defaults.

// Speech output (matches what the speech API is asked to produce).
pub const SAMPLE_RATE_HZ: u32 = 16_000;
pub const CHANNELS: u16 = 1;
pub const BITS_PER_SAMPLE: u16 = 16;

// Canonical RIFF/WAVE layout.
pub const WAV_HEADER_LEN: usize = 44;
pub const RIFF_SIZE_OVERHEAD: u32 = 36; // header bytes after the RIFF size field
pub const PCM_FMT_CHUNK_LEN: u32 = 16;
pub const WAVE_FORMAT_PCM: u16 = 1;

// Text statistics.
pub const WORDS_PER_MINUTE: usize = 200;

// Remote services.
pub const DEFAULT_SUMMARIZATION_ENDPOINT: &str = "https://api-inference.huggingface.co/models";
pub const DEFAULT_SUMMARIZATION_MODEL: &str = "facebook/bart-large-cnn";
pub const DEFAULT_SPEECH_ENDPOINT: &str = "https://waves-api.smallest.ai/api/v1/lightning/get_speech";
pub const DEFAULT_VOICE_ID: &str = "arman";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
