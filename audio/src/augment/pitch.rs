//! Pitch shifting.

use rand::{Rng, RngCore};

use super::stretch::time_stretch;
use super::{Augmentation, check_probability, check_range};
use crate::error::Result;
use crate::pcm::Buffer;
use crate::resampler::resample_ratio;

/// Shifts pitch by a random number of semitones without changing duration.
#[derive(Debug, Clone)]
pub struct PitchShift {
    pub min_semitones: f64,
    pub max_semitones: f64,
    pub p: f64,
}

impl PitchShift {
    pub fn new(min_semitones: f64, max_semitones: f64, p: f64) -> Result<Self> {
        check_range("pitch_shift", min_semitones, max_semitones)?;
        check_probability(p)?;
        Ok(Self {
            min_semitones,
            max_semitones,
            p,
        })
    }
}

impl Default for PitchShift {
    fn default() -> Self {
        Self {
            min_semitones: -2.0,
            max_semitones: 2.0,
            p: 1.0,
        }
    }
}

impl Augmentation for PitchShift {
    fn name(&self) -> &'static str {
        "pitch_shift"
    }

    fn probability(&self) -> f64 {
        self.p
    }

    fn apply(&self, buf: &Buffer, rng: &mut dyn RngCore) -> Result<Buffer> {
        let semitones = rng.gen_range(self.min_semitones..=self.max_semitones);
        pitch_shift(buf, semitones)
    }
}

/// Shifts the pitch of `buf` by `semitones`, keeping its length.
///
/// The buffer is first time-stretched by the pitch factor, then resampled
/// back to the original number of frames.
pub fn pitch_shift(buf: &Buffer, semitones: f64) -> Result<Buffer> {
    if semitones == 0.0 || buf.is_empty() {
        return Ok(buf.clone());
    }

    let factor = 2f64.powf(semitones / 12.0);
    let stretched = time_stretch(buf, 1.0 / factor);
    if stretched.is_empty() {
        return Ok(buf.clone());
    }

    let ratio = buf.frames() as f64 / stretched.frames() as f64;
    let mut out = resample_ratio(&stretched, ratio)?;
    out.fit_to(buf.frames());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::augment::stretch::zero_crossings;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::f32::consts::PI;

    fn sine(freq: f32, sample_rate: u32, frames: usize) -> Vec<f32> {
        (0..frames)
            .map(|i| (2.0 * PI * freq * i as f32 / sample_rate as f32).sin() * 0.5)
            .collect()
    }

    #[test]
    fn test_octave_up_doubles_frequency() {
        let buf = Buffer::mono(16000, sine(220.0, 16000, 16000));
        let out = pitch_shift(&buf, 12.0).unwrap();
        assert_eq!(out.frames(), buf.frames());

        let ratio = zero_crossings(out.channel(0)) as f64 / zero_crossings(buf.channel(0)) as f64;
        assert!((1.8..2.2).contains(&ratio), "crossing ratio {}", ratio);
    }

    #[test]
    fn test_down_shift_lowers_frequency() {
        let buf = Buffer::mono(16000, sine(440.0, 16000, 16000));
        let out = pitch_shift(&buf, -12.0).unwrap();
        assert_eq!(out.frames(), buf.frames());

        let ratio = zero_crossings(out.channel(0)) as f64 / zero_crossings(buf.channel(0)) as f64;
        assert!((0.4..0.6).contains(&ratio), "crossing ratio {}", ratio);
    }

    #[test]
    fn test_zero_semitones_is_identity() {
        let buf = Buffer::mono(16000, sine(220.0, 16000, 1000));
        assert_eq!(pitch_shift(&buf, 0.0).unwrap(), buf);
    }

    #[test]
    fn test_augmentation_keeps_shape() {
        let shift = PitchShift::default();
        let buf = Buffer::new(8000, vec![sine(200.0, 8000, 4000), sine(300.0, 8000, 4000)]);
        let mut rng = StdRng::seed_from_u64(11);
        let out = shift.apply(&buf, &mut rng).unwrap();
        assert_eq!(out.frames(), 4000);
        assert_eq!(out.channel_count(), 2);
        assert_eq!(out.sample_rate(), 8000);
    }

    #[test]
    fn test_new_validates() {
        assert!(PitchShift::new(2.0, -2.0, 1.0).is_err());
        assert!(PitchShift::new(-2.0, 2.0, -0.1).is_err());
        assert!(PitchShift::new(-1.0, 1.0, 0.5).is_ok());
    }
}
