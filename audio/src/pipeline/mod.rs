//! Batch chunking pipeline.
//!
//! For every supported file under an input folder the pipeline runs
//! read → split channels → chunk → append silence → resample → write
//! original → augment → write augmented. Files are processed one at a time.
//! A file that fails is logged and recorded in the [`Report`], and the batch
//! continues.

mod discover;
mod naming;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, error, info};

use crate::augment::Strategy;
use crate::codec::{read_file, write_wav};
use crate::error::{AudioError, Result};
use crate::pcm::{Buffer, ChunkRanges};
use crate::resampler::{ResampleMode, resample};

pub use discover::{SUPPORTED_EXTENSIONS, find_audio_files, is_supported_audio_file};
pub use naming::{BaseNames, base_name, output_file_name};

/// Default chunk length.
pub const DEFAULT_CHUNK_DURATION: Duration = Duration::from_secs(30);
/// Silence appended per chunk when enabled.
pub const DEFAULT_SILENCE: Duration = Duration::from_secs(5);
/// Default output sample rate.
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Options controlling the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Split multi-channel input into one mono stream per channel.
    pub split_stereo: bool,
    /// Append `silence` to every chunk.
    pub add_silence: bool,
    pub silence: Duration,
    /// Chunk length. Zero treats each file as a single chunk.
    pub chunk_duration: Duration,
    /// Sample rate of every written file.
    pub sample_rate: u32,
    pub resample: ResampleMode,
    /// Enable the stacked effects strategy.
    pub augment: bool,
    /// Half-width of the speed factor range. Zero disables speed change.
    pub speed_change: f64,
    /// Seed for reproducible augmentation.
    pub seed: Option<u64>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            split_stereo: false,
            add_silence: false,
            silence: DEFAULT_SILENCE,
            chunk_duration: DEFAULT_CHUNK_DURATION,
            sample_rate: DEFAULT_SAMPLE_RATE,
            resample: ResampleMode::Convert,
            augment: false,
            speed_change: 0.0,
            seed: None,
        }
    }
}

/// Counts for a single processed file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileStats {
    pub streams: usize,
    pub chunks: usize,
    pub outputs: usize,
}

/// A file that could not be processed.
#[derive(Debug, Clone)]
pub struct Failure {
    pub path: PathBuf,
    pub error: String,
}

/// Summary of a batch run.
#[derive(Debug, Clone, Default)]
pub struct Report {
    pub files_found: usize,
    pub files_processed: usize,
    pub chunks: usize,
    pub outputs_written: usize,
    pub failures: Vec<Failure>,
}

impl Report {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} files processed, {} chunks, {} files written",
            self.files_processed, self.files_found, self.chunks, self.outputs_written
        )?;
        if !self.failures.is_empty() {
            write!(f, ", {} failed:", self.failures.len())?;
            for failure in &self.failures {
                write!(f, "\n  {}: {}", failure.path.display(), failure.error)?;
            }
        }
        Ok(())
    }
}

/// The chunking and augmentation pipeline.
pub struct Pipeline {
    options: PipelineOptions,
    strategy: Strategy,
    rng: StdRng,
}

impl Pipeline {
    /// Validates `options` and builds the augmentation strategy.
    pub fn new(options: PipelineOptions) -> Result<Self> {
        if options.sample_rate == 0 {
            return Err(AudioError::InvalidOption(
                "sample_rate must be positive".to_string(),
            ));
        }
        let strategy = Strategy::from_options(options.augment, options.speed_change)?;
        if let Strategy::Stacked(compose) = &strategy {
            for t in compose.transforms() {
                debug!(effect = t.name(), p = t.probability(), "stacked effect");
            }
        }
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            options,
            strategy,
            rng,
        })
    }

    /// Processes every supported file under `input` into `output`.
    ///
    /// Only setup errors are returned. Per-file errors are collected in the
    /// report.
    pub fn run(&mut self, input: &Path, output: &Path) -> Result<Report> {
        fs::create_dir_all(output)?;
        let files = find_audio_files(input)?;
        info!(
            input = %input.display(),
            output = %output.display(),
            files = files.len(),
            "starting batch"
        );

        let mut report = Report {
            files_found: files.len(),
            ..Default::default()
        };
        let mut names = BaseNames::new();

        for path in files {
            let base = names.claim(&path);
            match self.process_as(&path, &base, output) {
                Ok(stats) => {
                    report.files_processed += 1;
                    report.chunks += stats.chunks;
                    report.outputs_written += stats.outputs;
                }
                Err(e) => {
                    error!(path = %path.display(), "failed: {}", e);
                    report.failures.push(Failure {
                        path,
                        error: e.to_string(),
                    });
                }
            }
        }

        info!("{}", report);
        Ok(report)
    }

    /// Processes a single file, naming outputs after its file stem.
    pub fn process_file(&mut self, path: &Path, output: &Path) -> Result<FileStats> {
        fs::create_dir_all(output)?;
        self.process_as(path, &base_name(path), output)
    }

    fn process_as(&mut self, path: &Path, base: &str, output: &Path) -> Result<FileStats> {
        let buf = read_file(path)?;
        info!(
            path = %path.display(),
            sample_rate = buf.sample_rate(),
            channels = buf.channel_count(),
            seconds = buf.duration().as_secs_f64(),
            "processing"
        );

        let streams = self.split(buf);
        let mut stats = FileStats {
            streams: streams.len(),
            ..Default::default()
        };

        for (channel, stream) in streams.iter().enumerate() {
            let chunk_frames = stream
                .format()
                .frames_in_duration(self.options.chunk_duration);
            let nominal = self.output_frames(
                stream.sample_rate(),
                if chunk_frames == 0 {
                    stream.frames()
                } else {
                    chunk_frames
                },
            );

            let ranges = ChunkRanges::new(stream.frames(), chunk_frames);
            debug!(channel, chunks = ranges.count_total(), "chunking stream");

            for (index, range) in ranges.enumerate() {
                let chunk = self.prepare_chunk(stream.slice(range))?;

                let name = output_file_name(base, channel, index, self.strategy.original_suffix());
                self.write(&output.join(name), &chunk)?;
                stats.outputs += 1;

                if let Some(augmented) = self.strategy.augment(&chunk, nominal, &mut self.rng)? {
                    let name =
                        output_file_name(base, channel, index, self.strategy.augmented_suffix());
                    self.write(&output.join(name), &augmented)?;
                    stats.outputs += 1;
                }
                stats.chunks += 1;
            }
        }
        debug!(path = %path.display(), ?stats, "done");
        Ok(stats)
    }

    /// Splits channels when requested. Buffers with more than two channels
    /// are split into one mono stream per channel.
    fn split(&self, buf: Buffer) -> Vec<Buffer> {
        if self.options.split_stereo && buf.channel_count() > 1 {
            buf.split_channels()
        } else {
            vec![buf]
        }
    }

    /// Returns how many frames `frames` source frames at `source_rate`
    /// become once written.
    fn output_frames(&self, source_rate: u32, frames: usize) -> usize {
        match self.options.resample {
            ResampleMode::Convert if source_rate != self.options.sample_rate => {
                (frames as f64 * self.options.sample_rate as f64 / source_rate as f64).round()
                    as usize
            }
            _ => frames,
        }
    }

    /// Appends silence at the chunk's native rate, then brings it to the
    /// output rate.
    fn prepare_chunk(&self, mut chunk: Buffer) -> Result<Buffer> {
        if self.options.add_silence {
            chunk.append_silence(self.options.silence);
        }
        match self.options.resample {
            ResampleMode::Convert => resample(&chunk, self.options.sample_rate),
            ResampleMode::Relabel => Ok(chunk.with_sample_rate(self.options.sample_rate)),
        }
    }

    fn write(&self, path: &Path, buf: &Buffer) -> Result<()> {
        write_wav(path, buf)?;
        debug!(
            path = %path.display(),
            frames = buf.frames(),
            sample_rate = buf.sample_rate(),
            "wrote"
        );
        Ok(())
    }
}
