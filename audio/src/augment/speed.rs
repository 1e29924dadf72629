//! Speed change augmentation.

use rand::{Rng, RngCore};

use super::MAX_SPEED_CHANGE;
use crate::error::{AudioError, Result};
use crate::pcm::Buffer;
use crate::resampler::change_speed;

/// Plays a chunk faster or slower by a random factor drawn uniformly from
/// `[1 - speed_change, 1 + speed_change]`.
///
/// The result is truncated or zero-padded to a caller-supplied length, the
/// nominal chunk length in the pipeline.
#[derive(Debug, Clone)]
pub struct SpeedChange {
    speed_change: f64,
}

impl SpeedChange {
    pub fn new(speed_change: f64) -> Result<Self> {
        if !(0.0..=MAX_SPEED_CHANGE).contains(&speed_change) {
            return Err(AudioError::InvalidOption(format!(
                "speed_change must be in [0.0, {}], got {}",
                MAX_SPEED_CHANGE, speed_change
            )));
        }
        Ok(Self { speed_change })
    }

    /// Draws a speed factor.
    pub fn draw_factor(&self, rng: &mut dyn RngCore) -> f64 {
        if self.speed_change == 0.0 {
            return 1.0;
        }
        rng.gen_range(1.0 - self.speed_change..=1.0 + self.speed_change)
    }

    /// Applies a known `factor` and truncates or zero-pads the result to
    /// `frames`.
    pub fn apply_factor(buf: &Buffer, factor: f64, frames: usize) -> Buffer {
        let mut out = buf.map_channels(|c| change_speed(c, factor));
        out.fit_to(frames);
        out
    }
}
