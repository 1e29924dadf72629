//! Speed change by linear interpolation over sample indices.

/// Changes playback speed by `factor`.
///
/// Reads `samples` at positions `0, factor, 2 * factor, ...` below
/// `samples.len()`, interpolating linearly between neighbours. Positions past
/// the last sample take the last sample's value. A factor above 1 shortens
/// the signal and raises its pitch.
///
/// Non-positive or non-finite factors return the input unchanged.
pub fn change_speed(samples: &[f32], factor: f64) -> Vec<f32> {
    if samples.is_empty() || !(factor.is_finite() && factor > 0.0) {
        return samples.to_vec();
    }

    let len = samples.len();
    let last = len - 1;
    let mut out = Vec::with_capacity((len as f64 / factor).ceil() as usize);
    let mut i = 0usize;
    loop {
        let x = i as f64 * factor;
        if x >= len as f64 {
            break;
        }
        let idx = x.floor() as usize;
        let s = if idx >= last {
            samples[last]
        } else {
            let frac = (x - idx as f64) as f32;
            samples[idx] + (samples[idx + 1] - samples[idx]) * frac
        };
        out.push(s);
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let samples = vec![0.0, 0.5, 1.0, -0.5];
        assert_eq!(change_speed(&samples, 1.0), samples);
    }

    #[test]
    fn test_double_speed_takes_every_other() {
        let samples: Vec<f32> = (0..10).map(|i| i as f32).collect();
        assert_eq!(change_speed(&samples, 2.0), vec![0.0, 2.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn test_half_speed_interpolates() {
        let samples = vec![0.0, 1.0, 2.0];
        assert_eq!(
            change_speed(&samples, 0.5),
            vec![0.0, 0.5, 1.0, 1.5, 2.0, 2.0]
        );
    }

    #[test]
    fn test_output_length_is_ceil() {
        let samples = vec![0.25; 1000];
        for factor in [0.1, 0.75, 0.9, 1.1, 1.3, 1.9] {
            let out = change_speed(&samples, factor);
            let expected = (1000.0 / factor).ceil() as usize;
            assert!(
                out.len().abs_diff(expected) <= 1,
                "factor {}: got {} expected {}",
                factor,
                out.len(),
                expected
            );
        }
    }

    #[test]
    fn test_empty_and_invalid() {
        assert!(change_speed(&[], 1.5).is_empty());
        assert_eq!(change_speed(&[1.0, 2.0], 0.0), vec![1.0, 2.0]);
        assert_eq!(change_speed(&[1.0, 2.0], f64::NAN), vec![1.0, 2.0]);
    }
}
