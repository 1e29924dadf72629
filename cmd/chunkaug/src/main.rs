//! chunkaug - Split audio files into fixed-length WAV chunks with optional augmentation.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chunkaug_audio::resampler::ResampleMode;
use chunkaug_audio::{Pipeline, PipelineOptions};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Split audio files into fixed-length WAV chunks.
///
/// Every wav/flac/ogg/aiff/mp3 file under the input folder is decoded,
/// optionally split into mono channels, cut into chunks and written as
/// 16-bit WAV files. Each chunk can also be written in an augmented variant.
#[derive(Parser, Debug)]
#[command(name = "chunkaug")]
#[command(about = "Split audio files into fixed-length WAV chunks with optional augmentation")]
#[command(version)]
struct Cli {
    /// Folder searched recursively for audio files
    input_folder: PathBuf,

    /// Folder receiving the WAV chunks (created if missing)
    output_folder: PathBuf,

    /// Write each channel of a multi-channel file as its own mono series
    #[arg(long = "split_stereo")]
    split_stereo: bool,

    /// Append 5 seconds of silence to every chunk
    #[arg(long = "add_silence")]
    add_silence: bool,

    /// Chunk length in seconds (0 writes each file as a single chunk)
    #[arg(long = "chunk_duration", default_value_t = 30)]
    chunk_duration: u64,

    /// Speed change range, factor drawn from [1 - x, 1 + x] (0 disables)
    #[arg(long = "speed_change", default_value_t = 0.0, value_parser = parse_speed_change)]
    speed_change: f64,

    /// Apply stacked time stretch, pitch shift and shift (not with a non-zero --speed_change)
    #[arg(long)]
    augment: bool,

    /// Output sample rate in Hz
    #[arg(long = "sample_rate", default_value_t = 44100, value_parser = clap::value_parser!(u32).range(1..))]
    sample_rate: u32,

    /// Tag chunks with the output rate without converting samples
    #[arg(long = "no_resample")]
    no_resample: bool,

    /// Seed for reproducible augmentation
    #[arg(long)]
    seed: Option<u64>,

    /// Verbose output
    #[arg(short = 'v', long)]
    verbose: bool,
}

impl Cli {
    fn options(&self) -> PipelineOptions {
        PipelineOptions {
            split_stereo: self.split_stereo,
            add_silence: self.add_silence,
            chunk_duration: Duration::from_secs(self.chunk_duration),
            sample_rate: self.sample_rate,
            resample: if self.no_resample {
                ResampleMode::Relabel
            } else {
                ResampleMode::Convert
            },
            augment: self.augment,
            speed_change: self.speed_change,
            seed: self.seed,
            ..Default::default()
        }
    }
}

fn parse_speed_change(s: &str) -> std::result::Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{}", e))?;
    if !(0.0..=0.9).contains(&value) {
        return Err(format!("must be between 0.0 and 0.9, got {}", value));
    }
    Ok(value)
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = cli.options();
    tracing::debug!(?options, "parsed options");
    let mut pipeline = Pipeline::new(options).context("invalid options")?;
    let report = pipeline
        .run(&cli.input_folder, &cli.output_folder)
        .with_context(|| {
            format!(
                "failed to process {} into {}",
                cli.input_folder.display(),
                cli.output_folder.display()
            )
        })?;

    println!("{}", report);
    if !report.is_success() {
        anyhow::bail!("{} file(s) failed", report.failures.len());
    }
    Ok(())
}
