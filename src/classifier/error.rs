use std::path::PathBuf;

use thiserror::Error;

use super::Head;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("failed to read label table {path:?}: {source}")]
    LabelIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("inference backend failed: {message}")]
    Backend { message: String },
    #[error("backend returned no scores for the {head} head")]
    MissingHead { head: Head },
    #[error("backend returned an empty score vector for the {head} head")]
    EmptyHead { head: Head },
    #[error("backend returned non-finite scores for the {head} head")]
    NonFinite { head: Head },
    #[error("waveform has {actual} samples, backend expects {expected}")]
    InputShape { expected: usize, actual: usize },
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}
