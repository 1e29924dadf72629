use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by audio operations.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("decode error: {0}")]
    Decode(#[from] symphonia::core::errors::Error),

    #[error("wav error: {0}")]
    Wav(#[from] hound::Error),

    #[error("resample error: {0}")]
    Resample(String),

    #[error("no decodable audio track in {0}")]
    NoTrack(PathBuf),

    #[error("invalid option: {0}")]
    InvalidOption(String),
}

impl From<rubato::ResamplerConstructionError> for AudioError {
    fn from(e: rubato::ResamplerConstructionError) -> Self {
        AudioError::Resample(e.to_string())
    }
}

impl From<rubato::ResampleError> for AudioError {
    fn from(e: rubato::ResampleError) -> Self {
        AudioError::Resample(e.to_string())
    }
}

/// Result type for audio operations.
pub type Result<T> = std::result::Result<T, AudioError>;
