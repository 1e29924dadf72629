//! Audio resampling.
//!
//! This module provides sample rate conversion using the rubato library and
//! a linear-interpolation speed change.
//!
//! # Example
//!
//! ```rust
//! use chunkaug_audio::pcm::Buffer;
//! use chunkaug_audio::resampler::resample;
//!
//! let src = Buffer::mono(22050, vec![0.0; 22050]);
//! let dst = resample(&src, 44100).unwrap();
//! assert_eq!(dst.sample_rate(), 44100);
//! assert_eq!(dst.frames(), 44100);
//! ```

mod linear;
mod rubato_impl;

pub use linear::*;
pub use rubato_impl::*;

/// How chunks reach the output sample rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResampleMode {
    /// Convert the samples to the output rate.
    #[default]
    Convert,
    /// Keep the samples and tag them with the output rate.
    Relabel,
}
