use symphonia::core::errors::Error as SymphoniaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),
    #[error("failed to probe audio container")]
    Probe(#[source] SymphoniaError),
    #[error("no decodable audio track")]
    NoTrack,
    #[error("audio decode failed")]
    Decode(#[source] SymphoniaError),
    #[error("resampling failed: {0}")]
    Resample(String),
    #[error("transcoding failed: {0}")]
    Transcode(String),
    #[error("transcoder i/o failed")]
    Io(#[from] std::io::Error),
}
