//! Audio file codecs.
//!
//! This module provides decoding and encoding of audio files:
//!
//! - `decode`: wav, flac, ogg/vorbis, aiff and mp3 decoding via symphonia
//! - `wav`: 16-bit PCM WAV output via hound

mod decode;
mod wav;

pub use decode::*;
pub use wav::*;
