//! Time shifting.

use rand::{Rng, RngCore};

use super::{Augmentation, check_probability, check_range};
use crate::error::Result;
use crate::pcm::Buffer;

/// Shifts samples forwards or backwards by a random fraction of the buffer
/// length. Samples pushed past one end re-enter at the other.
#[derive(Debug, Clone)]
pub struct Shift {
    pub min_fraction: f64,
    pub max_fraction: f64,
    pub p: f64,
}

impl Shift {
    pub fn new(min_fraction: f64, max_fraction: f64, p: f64) -> Result<Self> {
        check_range("shift", min_fraction, max_fraction)?;
        check_probability(p)?;
        Ok(Self {
            min_fraction,
            max_fraction,
            p,
        })
    }
}

impl Default for Shift {
    fn default() -> Self {
        Self {
            min_fraction: -0.2,
            max_fraction: 0.2,
            p: 1.0,
        }
    }
}

impl Augmentation for Shift {
    fn name(&self) -> &'static str {
        "shift"
    }

    fn probability(&self) -> f64 {
        self.p
    }

    fn apply(&self, buf: &Buffer, rng: &mut dyn RngCore) -> Result<Buffer> {
        let fraction = rng.gen_range(self.min_fraction..=self.max_fraction);
        let places = (fraction * buf.frames() as f64) as isize;
        Ok(buf.map_channels(|c| roll(c, places)))
    }
}

/// Rotates `samples` right by `places` (left when negative).
pub fn roll(samples: &[f32], places: isize) -> Vec<f32> {
    let len = samples.len();
    if len == 0 {
        return Vec::new();
    }
    let k = places.rem_euclid(len as isize) as usize;
    let mut out = samples.to_vec();
    out.rotate_right(k);
    out
}
