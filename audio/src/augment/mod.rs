//! Randomized audio augmentations.
//!
//! Two strategies are supported:
//!
//! - [`Compose`]: stacked effects ([`TimeStretch`], [`PitchShift`], [`Shift`])
//!   applied in order, each with its own probability
//! - [`SpeedChange`]: a single random speed factor applied by linear
//!   interpolation, fitted to the nominal chunk length
//!
//! Every effect draws its parameters once per call and applies them to all
//! channels of the buffer.
//!
//! # Example
//!
//! ```rust
//! use chunkaug_audio::augment::Strategy;
//! use chunkaug_audio::pcm::Buffer;
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let strategy = Strategy::from_options(false, 0.2).unwrap();
//! let mut rng = StdRng::seed_from_u64(7);
//!
//! let chunk = Buffer::mono(8000, vec![0.1; 8000]);
//! let augmented = strategy.augment(&chunk, 6000, &mut rng).unwrap().unwrap();
//! assert_eq!(augmented.frames(), 6000);
//! ```

mod pitch;
mod shift;
mod speed;
mod stretch;

use std::fmt;

use rand::{Rng, RngCore};
use tracing::debug;

use crate::error::{AudioError, Result};
use crate::pcm::Buffer;

pub use pitch::{PitchShift, pitch_shift};
pub use shift::{Shift, roll};
pub use speed::SpeedChange;
pub use stretch::{TimeStretch, time_stretch, wsola};

/// Maximum accepted `speed_change` half-width.
pub const MAX_SPEED_CHANGE: f64 = 0.9;

/// A randomized transformation of an audio buffer.
pub trait Augmentation: fmt::Debug + Send + Sync {
    /// Returns a short name for logging.
    fn name(&self) -> &'static str;

    /// Returns the probability of this effect being applied by [`Compose`].
    fn probability(&self) -> f64;

    /// Draws random parameters from `rng` and returns the transformed buffer.
    fn apply(&self, buf: &Buffer, rng: &mut dyn RngCore) -> Result<Buffer>;
}

/// Checks that `p` is a valid probability.
pub(crate) fn check_probability(p: f64) -> Result<()> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(AudioError::InvalidOption(format!(
            "probability must be in [0, 1], got {}",
            p
        )))
    }
}

/// Checks that `min..=max` is a valid finite range.
pub(crate) fn check_range(what: &str, min: f64, max: f64) -> Result<()> {
    if min.is_finite() && max.is_finite() && min <= max {
        Ok(())
    } else {
        Err(AudioError::InvalidOption(format!(
            "{}: invalid range {}..={}",
            what, min, max
        )))
    }
}

/// An ordered plan of stacked effects.
#[derive(Debug)]
pub struct Compose {
    transforms: Vec<Box<dyn Augmentation>>,
}

impl Compose {
    pub fn new(transforms: Vec<Box<dyn Augmentation>>) -> Self {
        Self { transforms }
    }

    /// Time stretch 0.95..=1.05, pitch shift -2..=2 semitones and shift
    /// -0.2..=0.2, each always applied.
    pub fn default_effects() -> Self {
        Self::new(vec![
            Box::new(TimeStretch::default()),
            Box::new(PitchShift::default()),
            Box::new(Shift::default()),
        ])
    }

    pub fn transforms(&self) -> &[Box<dyn Augmentation>] {
        &self.transforms
    }

    /// Applies each effect in order, skipping those whose probability roll
    /// fails.
    pub fn apply(&self, buf: &Buffer, rng: &mut dyn RngCore) -> Result<Buffer> {
        let mut out = buf.clone();
        for t in &self.transforms {
            if rng.gen_bool(t.probability()) {
                out = t.apply(&out, rng)?;
                debug!(effect = t.name(), "applied");
            }
        }
        Ok(out)
    }
}

/// Selects how chunks are augmented.
#[derive(Debug, Default)]
pub enum Strategy {
    /// Only the original chunk is written.
    #[default]
    None,
    /// Stacked effects, written with the `_augmented` suffix.
    Stacked(Compose),
    /// Speed change, original and augmented written as `_orig` and `_aug`.
    SpeedChange(SpeedChange),
}

impl Strategy {
    /// Builds a strategy from command-line style options.
    ///
    /// A `speed_change` of zero disables the speed path. Enabling both
    /// stacked effects and a speed change is rejected.
    pub fn from_options(augment: bool, speed_change: f64) -> Result<Self> {
        if !(0.0..=MAX_SPEED_CHANGE).contains(&speed_change) {
            return Err(AudioError::InvalidOption(format!(
                "speed_change must be in [0.0, {}], got {}",
                MAX_SPEED_CHANGE, speed_change
            )));
        }
        match (augment, speed_change > 0.0) {
            (true, true) => Err(AudioError::InvalidOption(
                "stacked effects and speed change are mutually exclusive".to_string(),
            )),
            (true, false) => Ok(Strategy::Stacked(Compose::default_effects())),
            (false, true) => Ok(Strategy::SpeedChange(SpeedChange::new(speed_change)?)),
            (false, false) => Ok(Strategy::None),
        }
    }

    /// Returns the augmented variant of `buf`, or `None` when this strategy
    /// writes originals only.
    ///
    /// Stacked effects keep the length of `buf`. A speed change is fitted to
    /// `nominal_frames`, the chunk length without trailing silence.
    pub fn augment(
        &self,
        buf: &Buffer,
        nominal_frames: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Option<Buffer>> {
        match self {
            Strategy::None => Ok(None),
            Strategy::Stacked(compose) => compose.apply(buf, rng).map(Some),
            Strategy::SpeedChange(speed) => {
                let factor = speed.draw_factor(rng);
                debug!(factor, "speed change");
                Ok(Some(SpeedChange::apply_factor(buf, factor, nominal_frames)))
            }
        }
    }

    /// File name suffix of the unaugmented output.
    pub fn original_suffix(&self) -> &'static str {
        match self {
            Strategy::SpeedChange(_) => "_orig",
            _ => "",
        }
    }

    /// File name suffix of the augmented output.
    pub fn augmented_suffix(&self) -> &'static str {
        match self {
            Strategy::SpeedChange(_) => "_aug",
            _ => "_augmented",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[derive(Debug)]
    struct Gain(f32, f64);

    impl Augmentation for Gain {
        fn name(&self) -> &'static str {
            "gain"
        }

        fn probability(&self) -> f64 {
            self.1
        }

        fn apply(&self, buf: &Buffer, _rng: &mut dyn RngCore) -> Result<Buffer> {
            Ok(buf.map_channels(|c| c.iter().map(|s| s * self.0).collect()))
        }
    }

    #[test]
    fn test_compose_applies_in_order() {
        let compose = Compose::new(vec![Box::new(Gain(2.0, 1.0)), Box::new(Gain(0.25, 1.0))]);
        let mut rng = StdRng::seed_from_u64(1);
        let out = compose.apply(&Buffer::mono(8000, vec![1.0; 4]), &mut rng).unwrap();
        assert_eq!(out.channel(0), &[0.5; 4]);
    }

    #[test]
    fn test_compose_skips_zero_probability() {
        let compose = Compose::new(vec![Box::new(Gain(2.0, 0.0))]);
        let mut rng = StdRng::seed_from_u64(1);
        let buf = Buffer::mono(8000, vec![1.0; 4]);
        assert_eq!(compose.apply(&buf, &mut rng).unwrap(), buf);
    }

    #[test]
    fn test_default_effects() {
        let compose = Compose::default_effects();
        let names: Vec<_> = compose.transforms().iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["time_stretch", "pitch_shift", "shift"]);
        assert!(compose.transforms().iter().all(|t| t.probability() == 1.0));
    }

    #[test]
    fn test_strategy_from_options() {
        assert!(matches!(Strategy::from_options(false, 0.0), Ok(Strategy::None)));
        assert!(matches!(Strategy::from_options(true, 0.0), Ok(Strategy::Stacked(_))));
        assert!(matches!(
            Strategy::from_options(false, 0.3),
            Ok(Strategy::SpeedChange(_))
        ));
        assert!(Strategy::from_options(true, 0.3).is_err());
        assert!(Strategy::from_options(false, 0.95).is_err());
        assert!(Strategy::from_options(false, -0.1).is_err());
    }

    #[test]
    fn test_strategy_suffixes() {
        let none = Strategy::None;
        assert_eq!(none.original_suffix(), "");

        let stacked = Strategy::from_options(true, 0.0).unwrap();
        assert_eq!(stacked.original_suffix(), "");
        assert_eq!(stacked.augmented_suffix(), "_augmented");

        let speed = Strategy::from_options(false, 0.5).unwrap();
        assert_eq!(speed.original_suffix(), "_orig");
        assert_eq!(speed.augmented_suffix(), "_aug");
    }

    #[test]
    fn test_strategy_none_augments_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        let out = Strategy::None
            .augment(&Buffer::mono(8000, vec![0.0; 10]), 10, &mut rng)
            .unwrap();
        assert!(out.is_none());
    }

    #[test]
    fn test_stacked_keeps_length() {
        let strategy = Strategy::from_options(true, 0.0).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let samples: Vec<f32> = (0..8000).map(|i| (i as f32 * 0.05).sin() * 0.5).collect();
        let buf = Buffer::mono(8000, samples);
        let out = strategy.augment(&buf, 6000, &mut rng).unwrap().unwrap();
        assert_eq!(out.frames(), buf.frames());
        assert_eq!(out.sample_rate(), buf.sample_rate());
    }

    #[test]
    fn test_speed_change_fits_nominal_length() {
        let strategy = Strategy::from_options(false, 0.5).unwrap();
        let mut rng = StdRng::seed_from_u64(4);
        let mut chunk = Buffer::mono(8000, vec![0.2; 8000]);
        chunk.append_silence(std::time::Duration::from_secs(1));

        for _ in 0..10 {
            let out = strategy.augment(&chunk, 8000, &mut rng).unwrap().unwrap();
            assert_eq!(out.frames(), 8000);
        }
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let strategy = Strategy::from_options(true, 0.0).unwrap();
        let samples: Vec<f32> = (0..4000).map(|i| (i as f32 * 0.1).sin() * 0.5).collect();
        let buf = Buffer::mono(8000, samples);

        let a = strategy.augment(&buf, 4000, &mut StdRng::seed_from_u64(9)).unwrap();
        let b = strategy.augment(&buf, 4000, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }
}
