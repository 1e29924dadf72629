//! Audio file decoder using symphonia.

use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

use crate::error::{AudioError, Result};
use crate::pcm::Buffer;

/// Decodes the whole file at `path` into memory.
///
/// The container is probed from its content, with the file extension used
/// as a hint. Corrupt packets are skipped with a warning.
pub fn read_file(path: &Path) -> Result<Buffer> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AudioError::NoTrack(path.to_path_buf()))?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
    let mut channels = track
        .codec_params
        .channels
        .map(|c| c.count() as u16)
        .unwrap_or(0);

    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(e) => match classify_packet_error(&e) {
                PacketError::EndOfStream => break,
                PacketError::Truncated => {
                    warn!(path = %path.display(), "decoding stopped early: {}", e);
                    break;
                }
                PacketError::Fatal => return Err(e.into()),
            },
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                sample_rate = spec.rate;
                channels = spec.channels.count() as u16;

                let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                buf.copy_interleaved_ref(decoded);
                samples.extend_from_slice(buf.samples());
            }
            Err(SymphoniaError::DecodeError(msg)) => {
                warn!(path = %path.display(), "skipping corrupt packet: {}", msg);
                continue;
            }
            Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        }
    }

    if sample_rate == 0 || channels == 0 {
        return Err(AudioError::NoTrack(path.to_path_buf()));
    }

    let buffer = Buffer::from_interleaved(sample_rate, channels, &samples);
    debug!(
        path = %path.display(),
        sample_rate,
        channels,
        frames = buffer.frames(),
        "decoded"
    );
    Ok(buffer)
}

/// How the packet loop reacts to a demuxer error.
#[derive(Debug, PartialEq, Eq)]
enum PacketError {
    EndOfStream,
    /// The stream continues in a form this decoder does not follow, such as
    /// a chained stream. Samples decoded so far are kept.
    Truncated,
    Fatal,
}

fn classify_packet_error(err: &SymphoniaError) -> PacketError {
    match err {
        SymphoniaError::IoError(e) if e.kind() == ErrorKind::UnexpectedEof => {
            PacketError::EndOfStream
        }
        SymphoniaError::ResetRequired => PacketError::Truncated,
        _ => PacketError::Fatal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::write_wav;

    #[test]
    fn test_read_wav_mono() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mono.wav");
        let samples: Vec<f32> = (0..800).map(|i| ((i % 100) as f32 - 50.0) / 100.0).collect();
        write_wav(&path, &Buffer::mono(8000, samples.clone())).unwrap();

        let buf = read_file(&path).unwrap();
        assert_eq!(buf.sample_rate(), 8000);
        assert_eq!(buf.channel_count(), 1);
        assert_eq!(buf.frames(), 800);
        for (a, b) in buf.channel(0).iter().zip(&samples) {
            assert!((a - b).abs() < 1e-3);
        }
    }

    #[test]
    fn test_read_wav_stereo() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let src = Buffer::new(22050, vec![vec![0.5; 300], vec![-0.5; 300]]);
        write_wav(&path, &src).unwrap();

        let buf = read_file(&path).unwrap();
        assert_eq!(buf.sample_rate(), 22050);
        assert_eq!(buf.channel_count(), 2);
        assert_eq!(buf.frames(), 300);
        assert!(buf.channel(0).iter().all(|&s| (s - 0.5).abs() < 1e-3));
        assert!(buf.channel(1).iter().all(|&s| (s + 0.5).abs() < 1e-3));
    }

    #[test]
    fn test_classify_packet_error() {
        let eof = SymphoniaError::IoError(std::io::Error::new(ErrorKind::UnexpectedEof, "eof"));
        assert_eq!(classify_packet_error(&eof), PacketError::EndOfStream);
        assert_eq!(
            classify_packet_error(&SymphoniaError::ResetRequired),
            PacketError::Truncated
        );
        let other = SymphoniaError::IoError(std::io::Error::new(ErrorKind::Other, "broken"));
        assert_eq!(classify_packet_error(&other), PacketError::Fatal);
        assert_eq!(
            classify_packet_error(&SymphoniaError::DecodeError("bad")),
            PacketError::Fatal
        );
    }

    #[test]
    fn test_read_missing_file() {
        let result = read_file(Path::new("/nonexistent/file.wav"));
        assert!(matches!(result, Err(AudioError::Io(_))));
    }

    #[test]
    fn test_read_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.mp3");
        std::fs::write(&path, b"definitely not audio").unwrap();
        assert!(read_file(&path).is_err());
    }
}
