//! PCM audio buffers.
//!
//! This module provides the in-memory representation of decoded audio and
//! the helpers used to cut it into fixed-duration chunks.
//!
//! # Key Types
//!
//! - [`Format`]: sample rate and channel count
//! - [`Buffer`]: planar f32 samples tagged with a sample rate
//! - [`ChunkRanges`]: lazy iterator of fixed-length frame ranges
//!
//! # Example
//!
//! ```rust
//! use chunkaug_audio::pcm::Buffer;
//! use std::time::Duration;
//!
//! let mut chunk = Buffer::mono(16000, vec![0.5; 1600]);
//! chunk.append_silence(Duration::from_millis(100));
//! assert_eq!(chunk.frames(), 3200);
//! ```

mod buffer;
mod chunk;
mod format;

pub use buffer::Buffer;
pub use chunk::ChunkRanges;
pub use format::Format;
