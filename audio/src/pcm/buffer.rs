//! Planar audio buffer.

use std::ops::Range;
use std::time::Duration;

use super::Format;

/// Decoded audio held in memory as one `Vec<f32>` per channel.
///
/// All channels always have the same number of frames.
#[derive(Debug, Clone, PartialEq)]
pub struct Buffer {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl Buffer {
    /// Creates a buffer from planar channel data.
    ///
    /// # Panics
    ///
    /// Panics if `channels` is empty or the channels differ in length.
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> Self {
        assert!(!channels.is_empty(), "buffer needs at least one channel");
        let frames = channels[0].len();
        assert!(
            channels.iter().all(|c| c.len() == frames),
            "all channels must have the same length"
        );
        Self {
            sample_rate,
            channels,
        }
    }

    /// Creates a single-channel buffer.
    pub fn mono(sample_rate: u32, samples: Vec<f32>) -> Self {
        Self {
            sample_rate,
            channels: vec![samples],
        }
    }

    /// Creates a buffer by de-interleaving `samples`.
    ///
    /// A trailing partial frame is dropped.
    pub fn from_interleaved(sample_rate: u32, channels: u16, samples: &[f32]) -> Self {
        let n = channels.max(1) as usize;
        let frames = samples.len() / n;
        let mut planar = vec![Vec::with_capacity(frames); n];
        for frame in samples.chunks_exact(n) {
            for (ch, &s) in frame.iter().enumerate() {
                planar[ch].push(s);
            }
        }
        Self {
            sample_rate,
            channels: planar,
        }
    }

    /// Returns the buffer format.
    pub fn format(&self) -> Format {
        Format {
            sample_rate: self.sample_rate,
            channels: self.channels.len() as u16,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Returns the number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.channels[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames() == 0
    }

    /// Returns the playback duration.
    pub fn duration(&self) -> Duration {
        self.format().duration(self.frames())
    }

    /// Returns the samples of channel `index`.
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Returns the samples interleaved frame by frame.
    pub fn interleaved(&self) -> Vec<f32> {
        let n = self.channels.len();
        if n == 1 {
            return self.channels[0].clone();
        }
        let mut out = Vec::with_capacity(self.frames() * n);
        for i in 0..self.frames() {
            for ch in &self.channels {
                out.push(ch[i]);
            }
        }
        out
    }

    /// Copies the frames in `range` into a new buffer.
    ///
    /// The range is clamped to the buffer bounds.
    pub fn slice(&self, range: Range<usize>) -> Buffer {
        let end = range.end.min(self.frames());
        let start = range.start.min(end);
        Buffer {
            sample_rate: self.sample_rate,
            channels: self
                .channels
                .iter()
                .map(|c| c[start..end].to_vec())
                .collect(),
        }
    }

    /// Splits a multi-channel buffer into one mono buffer per channel.
    ///
    /// A mono buffer is returned as is.
    pub fn split_channels(self) -> Vec<Buffer> {
        let sample_rate = self.sample_rate;
        self.channels
            .into_iter()
            .map(|c| Buffer::mono(sample_rate, c))
            .collect()
    }

    /// Appends `duration` of zero samples to every channel.
    pub fn append_silence(&mut self, duration: Duration) {
        let frames = self.format().frames_in_duration(duration);
        for ch in &mut self.channels {
            ch.resize(ch.len() + frames, 0.0);
        }
    }

    /// Truncates or zero-pads every channel to exactly `frames` frames.
    pub fn fit_to(&mut self, frames: usize) {
        for ch in &mut self.channels {
            ch.resize(frames, 0.0);
        }
    }

    /// Returns the same samples tagged with another sample rate.
    pub fn with_sample_rate(self, sample_rate: u32) -> Buffer {
        Buffer {
            sample_rate,
            channels: self.channels,
        }
    }

    /// Builds a new buffer at the same rate by transforming each channel.
    pub fn map_channels<F>(&self, mut f: F) -> Buffer
    where
        F: FnMut(&[f32]) -> Vec<f32>,
    {
        Buffer::new(
            self.sample_rate,
            self.channels.iter().map(|c| f(c)).collect(),
        )
    }
}
