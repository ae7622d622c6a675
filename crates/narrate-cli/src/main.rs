use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use narrate::config::NarrateConfig;
use narrate::pcm::{downmix_i16_to_mono_f32, duration, truncate_to_frames};
use narrate::pdf::PdfTextExtractor;
use narrate::pipeline::Narrator;
use narrate::speech::WavesSynthesizer;
use narrate::summarize::HuggingFaceSummarizer;
use narrate::{AudioFormat, decode, encode};

#[derive(Debug, Parser)]
#[command(name = "narrate")]
#[command(about = "Summarize PDFs into speech and frame raw PCM as WAV", long_about = None)]
struct Cli {
    /// JSON config file; API keys may also come from `.env` or the environment.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Wrap raw little-endian PCM in a WAV header.
    Wrap {
        /// Raw PCM file.
        #[arg(long)]
        input: Option<PathBuf>,
        /// Read raw PCM from stdin.
        #[arg(long, default_value_t = false)]
        stdin: bool,
        #[arg(long)]
        output: PathBuf,
        #[arg(long, default_value_t = narrate::constants::SAMPLE_RATE_HZ)]
        sample_rate: u32,
        #[arg(long, default_value_t = narrate::constants::CHANNELS)]
        channels: u16,
        #[arg(long, default_value_t = narrate::constants::BITS_PER_SAMPLE)]
        bits: u16,
    },
    /// Strip the WAV header and write the PCM payload.
    Unwrap {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
    /// Validate a WAV file and print its format.
    Inspect {
        #[arg(long)]
        input: PathBuf,
    },
    /// Extract and summarize a PDF, printing the summary.
    Summarize {
        #[arg(long)]
        pdf: PathBuf,
    },
    /// Synthesize text to a WAV file.
    Speak {
        #[arg(long, conflicts_with = "text_file")]
        text: Option<String>,
        #[arg(long)]
        text_file: Option<PathBuf>,
        #[arg(long)]
        output: PathBuf,
        #[arg(long)]
        voice: Option<String>,
    },
    /// Extract, summarize and synthesize a PDF in one go.
    Run {
        #[arg(long)]
        pdf: PathBuf,
        #[arg(long)]
        output: PathBuf,
        #[arg(long)]
        voice: Option<String>,
        /// Also write the summary text here.
        #[arg(long)]
        summary_out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Wrap {
            input,
            stdin,
            output,
            sample_rate,
            channels,
            bits,
        } => {
            let format = AudioFormat::new(sample_rate, channels, bits).context("audio format")?;
            let pcm = match (input, stdin) {
                (Some(path), false) => {
                    std::fs::read(&path).with_context(|| format!("read file {path:?}"))?
                }
                (None, true) => {
                    let mut buf = Vec::new();
                    std::io::stdin()
                        .read_to_end(&mut buf)
                        .context("read stdin")?;
                    buf
                }
                _ => anyhow::bail!("choose exactly one input mode: --input or --stdin"),
            };
            run_wrap(pcm, format, &output)
        }
        Command::Unwrap { input, output } => run_unwrap(&input, &output),
        Command::Inspect { input } => run_inspect(&input),
        Command::Summarize { pdf } => {
            let cfg = NarrateConfig::load(cli.config.as_deref()).context("load config")?;
            let narrator = Narrator::new(
                PdfTextExtractor,
                HuggingFaceSummarizer::from_config(&cfg).context("summarizer")?,
                (),
            );
            let document = std::fs::read(&pdf).with_context(|| format!("read file {pdf:?}"))?;
            let text = narrator.extract(&document).context("extract text")?;
            let summary = narrator.summarize(&text).context("summarize")?;
            writeln!(std::io::stdout(), "{summary}").context("write summary")?;
            Ok(())
        }
        Command::Speak {
            text,
            text_file,
            output,
            voice,
        } => {
            let text = match (text, text_file) {
                (Some(t), _) => t,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("read file {path:?}"))?,
                (None, None) => anyhow::bail!("--text or --text-file is required"),
            };
            let cfg = NarrateConfig::load(cli.config.as_deref()).context("load config")?;
            let synthesizer = WavesSynthesizer::from_config(&cfg).context("speech synthesizer")?;
            let narrator = Narrator::new((), (), synthesizer);
            let voice = voice.unwrap_or(cfg.voice_id);
            let wav = narrator.speak(&text, &voice).context("synthesize speech")?;
            write_output(&output, wav.as_bytes())
        }
        Command::Run {
            pdf,
            output,
            voice,
            summary_out,
        } => {
            let cfg = NarrateConfig::load(cli.config.as_deref()).context("load config")?;
            let narrator = Narrator::new(
                PdfTextExtractor,
                HuggingFaceSummarizer::from_config(&cfg).context("summarizer")?,
                WavesSynthesizer::from_config(&cfg).context("speech synthesizer")?,
            );
            let voice = voice.unwrap_or(cfg.voice_id);
            let document = std::fs::read(&pdf).with_context(|| format!("read file {pdf:?}"))?;
            let narration = narrator.run(&document, &voice).context("narrate pdf")?;

            if let Some(path) = summary_out {
                write_output(&path, narration.summary.as_bytes())?;
            }
            write_output(&output, narration.audio.as_bytes())?;
            log::info!(
                "done: {} min read summarized to {} chars, {:.1}s of audio",
                narration.reading_time_minutes,
                narration.summary.len(),
                duration(narration.audio.payload().len(), narration.audio.format()).as_secs_f32()
            );
            Ok(())
        }
    }
}

fn run_wrap(mut pcm: Vec<u8>, format: AudioFormat, output: &Path) -> Result<()> {
    let dropped = truncate_to_frames(&mut pcm, format);
    if dropped > 0 {
        log::warn!("input ends with a partial frame; dropping {dropped} bytes");
    }
    let wav = encode(&pcm, format).context("encode wav")?;
    write_output(output, wav.as_bytes())
}

fn run_unwrap(input: &Path, output: &Path) -> Result<()> {
    let bytes = std::fs::read(input).with_context(|| format!("read file {input:?}"))?;
    let wav = decode(&bytes).context("parse wav")?;
    log::info!("{}: {}", input.display(), wav.format);
    write_output(output, wav.pcm)
}

fn run_inspect(input: &Path) -> Result<()> {
    let bytes = std::fs::read(input).with_context(|| format!("read file {input:?}"))?;
    let wav = decode(&bytes).context("parse wav")?;
    let format = wav.format;

    let mut out = std::io::stdout().lock();
    writeln!(out, "format:      {format}")?;
    writeln!(out, "block align: {} bytes", format.block_align())?;
    writeln!(out, "byte rate:   {} bytes/s", format.byte_rate())?;
    writeln!(out, "data:        {} bytes", wav.pcm.len())?;
    writeln!(out, "duration:    {:.3}s", duration(wav.pcm.len(), format).as_secs_f64())?;
    if format.bits_per_sample() == 16 {
        let peak = downmix_i16_to_mono_f32(wav.pcm, format.channels())
            .iter()
            .fold(0.0f32, |m, s| m.max(s.abs()));
        writeln!(out, "peak:        {peak:.3}")?;
    }
    let trailing = bytes.len() - narrate::constants::WAV_HEADER_LEN - wav.pcm.len();
    if trailing > 0 {
        writeln!(out, "trailing:    {trailing} bytes ignored")?;
    }
    Ok(())
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).with_context(|| format!("write file {path:?}"))?;
    log::info!("wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use clap::Parser;
    use narrate::{AudioFormat, decode};

    use super::{Cli, Command, run_wrap};

    fn tmp_file(name: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        p.push(format!("narrate-cli-test-{name}-{nanos}.wav"));
        p
    }

    #[test]
    fn wrap_defaults_to_speech_format() {
        let cli = Cli::try_parse_from(["narrate", "wrap", "--stdin", "--output", "x.wav"])
            .expect("parse");
        match cli.command {
            Command::Wrap {
                sample_rate,
                channels,
                bits,
                stdin,
                ..
            } => {
                assert!(stdin);
                assert_eq!((sample_rate, channels, bits), (16_000, 1, 16));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn speak_text_conflicts_with_text_file() {
        assert!(
            Cli::try_parse_from([
                "narrate", "speak", "--text", "hi", "--text-file", "a.txt", "--output", "o.wav"
            ])
            .is_err()
        );
    }

    #[test]
    fn wrap_drops_partial_frame() {
        let path = tmp_file("wrap");
        run_wrap(vec![1, 0, 2, 0, 3], AudioFormat::default(), &path).expect("wrap");

        let bytes = std::fs::read(&path).expect("read");
        let wav = decode(&bytes).expect("decode");
        assert_eq!(wav.pcm, &[1, 0, 2, 0]);

        std::fs::remove_file(path).expect("cleanup");
    }
}
