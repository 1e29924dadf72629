//! Rubato-based resampler implementation.
//!
//! Whole-buffer sample rate conversion with a sinc interpolator. The
//! resampler's latency is measured and trimmed so the result lines up with
//! the input and has exactly `round(frames * ratio)` frames.

use rubato::{
    Resampler as RubatoResampler, SincFixedIn, SincInterpolationParameters,
    SincInterpolationType, WindowFunction,
};

use crate::error::{AudioError, Result};
use crate::pcm::Buffer;

/// Number of input frames per processing block.
const CHUNK_SIZE: usize = 1024;

/// Length and position of the impulse used to measure latency.
const IMPULSE_LEN: usize = 2 * CHUNK_SIZE;
const IMPULSE_AT: usize = CHUNK_SIZE / 2;

fn sinc_parameters() -> SincInterpolationParameters {
    SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    }
}

/// Resamples `buf` to `target_rate`.
///
/// Returns an unchanged copy when the rates already match.
pub fn resample(buf: &Buffer, target_rate: u32) -> Result<Buffer> {
    if target_rate == 0 || buf.sample_rate() == 0 {
        return Err(AudioError::InvalidOption(format!(
            "cannot resample {} Hz to {} Hz",
            buf.sample_rate(),
            target_rate
        )));
    }
    if buf.sample_rate() == target_rate {
        return Ok(buf.clone());
    }

    let ratio = target_rate as f64 / buf.sample_rate() as f64;
    let frames = (buf.frames() as f64 * ratio).round() as usize;
    let channels = resample_channels(buf.channels(), ratio, frames)?;
    Ok(Buffer::new(target_rate, channels))
}

/// Stretches `buf` by `ratio` through resampling, keeping its sample rate
/// tag. The result has `round(frames * ratio)` frames.
pub fn resample_ratio(buf: &Buffer, ratio: f64) -> Result<Buffer> {
    if !(ratio.is_finite() && ratio > 0.0) {
        return Err(AudioError::InvalidOption(format!(
            "resample ratio must be positive, got {}",
            ratio
        )));
    }
    let frames = (buf.frames() as f64 * ratio).round() as usize;
    let channels = resample_channels(buf.channels(), ratio, frames)?;
    Ok(Buffer::new(buf.sample_rate(), channels))
}

fn resample_channels(input: &[Vec<f32>], ratio: f64, out_frames: usize) -> Result<Vec<Vec<f32>>> {
    let num_channels = input.len();
    if input[0].is_empty() || out_frames == 0 {
        return Ok(vec![vec![0.0; out_frames]; num_channels]);
    }

    let delay = measure_delay(ratio)?;
    let mut resampler =
        SincFixedIn::<f32>::new(ratio, 1.0, sinc_parameters(), CHUNK_SIZE, num_channels)?;
    let mut output = drive(&mut resampler, input, delay + out_frames)?;

    for ch in &mut output {
        ch.drain(..delay.min(ch.len()));
        ch.resize(out_frames, 0.0);
    }
    Ok(output)
}

/// Feeds all of `input` through `resampler`, then flushes with silence
/// until at least `needed` frames per channel are out.
fn drive(
    resampler: &mut SincFixedIn<f32>,
    input: &[Vec<f32>],
    needed: usize,
) -> Result<Vec<Vec<f32>>> {
    let len = input[0].len();
    let mut output: Vec<Vec<f32>> = vec![Vec::with_capacity(needed); input.len()];

    let mut pos = 0;
    while pos < len && output[0].len() < needed {
        let take = resampler.input_frames_next();
        let end = (pos + take).min(len);
        let block: Vec<&[f32]> = input.iter().map(|c| &c[pos..end]).collect();
        let out = if end - pos == take {
            resampler.process(&block, None)?
        } else {
            resampler.process_partial(Some(block.as_slice()), None)?
        };
        append(&mut output, out);
        pos = end;
    }

    while output[0].len() < needed {
        let out = resampler.process_partial(None::<&[&[f32]]>, None)?;
        if out[0].is_empty() {
            break;
        }
        append(&mut output, out);
    }
    Ok(output)
}

/// Measures the latency of the sinc resampler at `ratio`, in output frames.
///
/// `output_delay()` does not match where an input frame actually lands, so
/// an impulse is pushed through an identically configured resampler and
/// its peak is located.
fn measure_delay(ratio: f64) -> Result<usize> {
    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.0, sinc_parameters(), CHUNK_SIZE, 1)?;
    let mut impulse = vec![0.0f32; IMPULSE_LEN];
    impulse[IMPULSE_AT] = 1.0;

    let expected = (IMPULSE_AT as f64 * ratio).round() as usize;
    let needed = (IMPULSE_LEN as f64 * ratio).ceil() as usize + resampler.output_delay();
    let out = drive(&mut resampler, &[impulse], needed)?;

    let peak = out[0]
        .iter()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |best, (i, &v)| {
            if v > best.1 { (i, v) } else { best }
        })
        .0;
    Ok(peak.saturating_sub(expected))
}

fn append(output: &mut [Vec<f32>], block: Vec<Vec<f32>>) {
    for (dst, src) in output.iter_mut().zip(block) {
        dst.extend_from_slice(&src);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn sine(freq: f32, sample_rate: u32, frames: usize) -> Vec<f32> {
        (0..frames)
            .map(|i| (2.0 * PI * freq * i as f32 / sample_rate as f32).sin() * 0.5)
            .collect()
    }

    #[test]
    fn test_same_rate_passthrough() {
        let buf = Buffer::mono(44100, sine(440.0, 44100, 1000));
        let out = resample(&buf, 44100).unwrap();
        assert_eq!(out, buf);
    }

    #[test]
    fn test_upsample_length() {
        let buf = Buffer::mono(22050, sine(440.0, 22050, 22050));
        let out = resample(&buf, 44100).unwrap();
        assert_eq!(out.sample_rate(), 44100);
        assert_eq!(out.frames(), 44100);
    }

    #[test]
    fn test_downsample_length() {
        let buf = Buffer::mono(48000, sine(440.0, 48000, 4800));
        let out = resample(&buf, 16000).unwrap();
        assert_eq!(out.sample_rate(), 16000);
        assert_eq!(out.frames(), 1600);
    }

    #[test]
    fn test_odd_length_rounds() {
        let buf = Buffer::mono(48000, vec![0.0; 1001]);
        let out = resample(&buf, 44100).unwrap();
        assert_eq!(out.frames(), (1001.0f64 * 44100.0 / 48000.0).round() as usize);
    }

    #[test]
    fn test_upsample_preserves_waveform() {
        let buf = Buffer::mono(22050, sine(440.0, 22050, 22050));
        let out = resample(&buf, 44100).unwrap();
        let expected = sine(440.0, 44100, 44100);

        // Skip the edges, where the sinc filter sees zero padding.
        for i in 2000..42000 {
            assert!(
                (out.channel(0)[i] - expected[i]).abs() < 0.05,
                "sample {} differs: {} vs {}",
                i,
                out.channel(0)[i],
                expected[i]
            );
        }
    }

    fn peak_index(samples: &[f32]) -> usize {
        samples
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap()
    }

    #[test]
    fn test_impulse_stays_aligned_upsampling() {
        let mut samples = vec![0.0; 22050];
        samples[5000] = 1.0;
        let out = resample(&Buffer::mono(22050, samples), 44100).unwrap();
        let peak = peak_index(out.channel(0));
        assert!(peak.abs_diff(10000) <= 1, "peak at {}", peak);
    }

    #[test]
    fn test_impulse_stays_aligned_downsampling() {
        let mut samples = vec![0.0; 48000];
        samples[24000] = 1.0;
        let out = resample(&Buffer::mono(48000, samples), 16000).unwrap();
        let peak = peak_index(out.channel(0));
        assert!(peak.abs_diff(8000) <= 1, "peak at {}", peak);
    }

    #[test]
    fn test_tail_is_not_zero_filled() {
        let buf = Buffer::mono(22050, vec![0.5; 22050]);
        let out = resample(&buf, 44100).unwrap();
        let tail = &out.channel(0)[42000..43000];
        assert!(tail.iter().all(|&s| (s - 0.5).abs() < 0.02));
    }

    #[test]
    fn test_stereo_channels_independent() {
        let buf = Buffer::new(16000, vec![vec![0.5; 16000], vec![-0.25; 16000]]);
        let out = resample(&buf, 24000).unwrap();
        assert_eq!(out.channel_count(), 2);
        assert_eq!(out.frames(), 24000);
        assert!((out.channel(0)[12000] - 0.5).abs() < 0.01);
        assert!((out.channel(1)[12000] + 0.25).abs() < 0.01);
    }

    #[test]
    fn test_resample_empty() {
        let buf = Buffer::mono(22050, Vec::new());
        let out = resample(&buf, 44100).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_resample_ratio_keeps_rate_tag() {
        let buf = Buffer::mono(44100, vec![0.1; 10000]);
        let out = resample_ratio(&buf, 0.8).unwrap();
        assert_eq!(out.sample_rate(), 44100);
        assert_eq!(out.frames(), 8000);
    }

    #[test]
    fn test_invalid_rates() {
        let buf = Buffer::mono(44100, vec![0.0; 100]);
        assert!(resample(&buf, 0).is_err());
        assert!(resample_ratio(&buf, 0.0).is_err());
        assert!(resample_ratio(&buf, f64::NAN).is_err());
    }
}
