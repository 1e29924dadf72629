//! Audio chunking and augmentation utilities.
//!
//! This crate provides the building blocks of the `chunkaug` tool:
//!
//! - `pcm`: planar sample buffers, formats and chunk ranges
//! - `codec`: decoding of wav/flac/ogg/aiff/mp3 and WAV output
//! - `resampler`: sample rate conversion and speed change
//! - `augment`: randomized effects (time stretch, pitch shift, shift, speed)
//! - `pipeline`: file discovery and the per-file chunking pipeline
//!
//! # Example
//!
//! ```rust
//! use chunkaug_audio::pcm::{Buffer, ChunkRanges};
//! use std::time::Duration;
//!
//! // 65 seconds of silence at 8kHz
//! let buf = Buffer::mono(8000, vec![0.0; 65 * 8000]);
//!
//! // 30 second chunks
//! let frames = buf.format().frames_in_duration(Duration::from_secs(30));
//! let chunks: Vec<_> = ChunkRanges::new(buf.frames(), frames).collect();
//! assert_eq!(chunks.len(), 3);
//! ```

pub mod augment;
pub mod codec;
pub mod error;
pub mod pcm;
pub mod pipeline;
pub mod resampler;

pub use error::{AudioError, Result};
pub use pcm::{Buffer, Format};
pub use pipeline::{Pipeline, PipelineOptions, Report};
