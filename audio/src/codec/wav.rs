//! WAV output using hound.

use std::fs;
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::error::Result;
use crate::pcm::Buffer;

/// Bits per sample of written files.
pub const WAV_BITS_PER_SAMPLE: u16 = 16;

/// Returns the hound spec used for writing `buf`.
pub fn wav_spec(buf: &Buffer) -> WavSpec {
    WavSpec {
        channels: buf.channel_count() as u16,
        sample_rate: buf.sample_rate(),
        bits_per_sample: WAV_BITS_PER_SAMPLE,
        sample_format: SampleFormat::Int,
    }
}

/// Writes `buf` as a 16-bit PCM WAV file at the buffer's sample rate.
///
/// Parent directories are created if missing. Samples outside [-1, 1] are
/// clamped.
pub fn write_wav(path: &Path, buf: &Buffer) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut writer = WavWriter::create(path, wav_spec(buf))?;
    for s in buf.interleaved() {
        writer.write_sample(to_i16(s))?;
    }
    writer.finalize()?;
    Ok(())
}

/// Converts a float sample to 16-bit PCM. The scale matches the decoder's,
/// so decoded 16-bit input is written back unchanged.
fn to_i16(s: f32) -> i16 {
    (s * 32768.0).round().clamp(i16::MIN as f32, i16::MAX as f32) as i16
}
