//! Time stretching by waveform-similarity overlap-add (WSOLA).

use std::f32::consts::PI;

use rand::{Rng, RngCore};

use super::{Augmentation, check_probability, check_range};
use crate::error::{AudioError, Result};
use crate::pcm::Buffer;
use crate::resampler::change_speed;

/// Changes tempo without changing pitch.
///
/// A rate above 1 speeds the audio up. With `leave_length_unchanged` the
/// result is zero-padded or truncated back to the input length.
#[derive(Debug, Clone)]
pub struct TimeStretch {
    pub min_rate: f64,
    pub max_rate: f64,
    pub p: f64,
    pub leave_length_unchanged: bool,
}

impl TimeStretch {
    pub fn new(min_rate: f64, max_rate: f64, p: f64) -> Result<Self> {
        check_range("time_stretch", min_rate, max_rate)?;
        if min_rate <= 0.0 {
            return Err(AudioError::InvalidOption(format!(
                "time_stretch: rate must be positive, got {}",
                min_rate
            )));
        }
        check_probability(p)?;
        Ok(Self {
            min_rate,
            max_rate,
            p,
            leave_length_unchanged: true,
        })
    }
}

impl Default for TimeStretch {
    fn default() -> Self {
        Self {
            min_rate: 0.95,
            max_rate: 1.05,
            p: 1.0,
            leave_length_unchanged: true,
        }
    }
}

impl Augmentation for TimeStretch {
    fn name(&self) -> &'static str {
        "time_stretch"
    }

    fn probability(&self) -> f64 {
        self.p
    }

    fn apply(&self, buf: &Buffer, rng: &mut dyn RngCore) -> Result<Buffer> {
        let rate = rng.gen_range(self.min_rate..=self.max_rate);
        let mut out = time_stretch(buf, rate);
        if self.leave_length_unchanged {
            out.fit_to(buf.frames());
        }
        Ok(out)
    }
}

/// Stretches every channel of `buf` by `rate`. The result has about
/// `frames / rate` frames.
pub fn time_stretch(buf: &Buffer, rate: f64) -> Buffer {
    let sample_rate = buf.sample_rate();
    buf.map_channels(|c| wsola(c, rate, sample_rate))
}

/// Analysis frame length: about 30 ms, even, at least 64 samples.
fn frame_len(sample_rate: u32) -> usize {
    let n = ((sample_rate as f64 * 0.03) as usize).max(64);
    n & !1
}

fn hann(n: usize) -> Vec<f32> {
    (0..n)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f32 / n as f32).cos())
        .collect()
}

/// Time-scale modification of a single channel.
///
/// Output frames are laid out at a fixed hop of half a frame. Each input
/// frame is taken near its nominal position `k * hop * rate`, shifted within
/// a small tolerance to best match the natural continuation of the previous
/// frame. Inputs shorter than one frame fall back to a plain speed change.
pub fn wsola(input: &[f32], rate: f64, sample_rate: u32) -> Vec<f32> {
    if !(rate.is_finite() && rate > 0.0) || (rate - 1.0).abs() < 1e-9 {
        return input.to_vec();
    }

    let out_len = (input.len() as f64 / rate).round() as usize;
    let frame = frame_len(sample_rate);
    if input.len() < frame {
        let mut out = change_speed(input, rate);
        out.resize(out_len, 0.0);
        return out;
    }

    let hop = frame / 2;
    let tolerance = frame / 8;
    let window = hann(frame);
    let max_start = input.len() - frame;

    let mut out = vec![0.0f32; out_len + frame];
    let mut norm = vec![0.0f32; out_len + frame];
    let mut prev = 0usize;
    let mut k = 0usize;

    while k * hop < out_len {
        let nominal = ((k * hop) as f64 * rate).round() as usize;
        let pos = if k == 0 {
            0
        } else {
            best_match(input, prev + hop, nominal, tolerance, hop, max_start)
        };

        let dst = k * hop;
        for i in 0..frame {
            out[dst + i] += input[pos + i] * window[i];
            norm[dst + i] += window[i];
        }

        prev = pos;
        k += 1;
    }

    for (o, n) in out.iter_mut().zip(&norm) {
        if *n > 1e-3 {
            *o /= *n;
        }
    }
    out.truncate(out_len);
    out
}

/// Finds the frame start within `nominal ± tolerance` whose first `len`
/// samples correlate best with `input[natural..natural + len]`.
fn best_match(
    input: &[f32],
    natural: usize,
    nominal: usize,
    tolerance: usize,
    len: usize,
    max_start: usize,
) -> usize {
    let nominal = nominal.min(max_start);
    if natural + len > input.len() {
        return nominal;
    }
    let reference = &input[natural..natural + len];
    let lo = nominal.saturating_sub(tolerance);
    let hi = (nominal + tolerance).min(max_start);

    let mut best = nominal;
    let mut best_score = f32::NEG_INFINITY;
    for cand in lo..=hi {
        let score: f32 = reference
            .iter()
            .zip(&input[cand..cand + len])
            .map(|(a, b)| a * b)
            .sum();
        if score > best_score {
            best_score = score;
            best = cand;
        }
    }
    best
}

/// Counts sign changes, used by tests to estimate frequency.
#[cfg(test)]
pub(crate) fn zero_crossings(samples: &[f32]) -> usize {
    samples
        .windows(2)
        .filter(|w| (w[0] < 0.0) != (w[1] < 0.0))
        .count()
}
