use thiserror::Error;

use super::reply::ErrorKind;
use crate::framing::FramingError;
use crate::pipeline::PipelineError;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to connect to {addr}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("write failed")]
    Write(#[source] std::io::Error),
    #[error("read failed")]
    Read(#[source] std::io::Error),
    #[error("timed out during {phase}")]
    Timeout { phase: &'static str },
    #[error("connection closed after {received} of 10 header bytes")]
    IncompleteHeader { received: usize },
    #[error("connection closed after {received} of {declared} payload bytes")]
    IncompleteBody { received: u64, declared: u64 },
    #[error(transparent)]
    Framing(#[from] FramingError),
    #[error("reply exceeds {limit} bytes")]
    ReplyTooLarge { limit: usize },
    #[error("reply is not a valid classification result: {message}")]
    ReplyDecode { message: String },
    #[error("server reported {kind}: {detail}")]
    Remote { kind: ErrorKind, detail: String },
}

impl TransportError {
    /// エラー応答に載せる種別
    pub fn reply_kind(&self) -> ErrorKind {
        match self {
            Self::Framing(_) => ErrorKind::Framing,
            Self::IncompleteHeader { .. } => ErrorKind::IncompleteHeader,
            Self::IncompleteBody { .. } => ErrorKind::IncompleteBody,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Remote { kind, .. } => *kind,
            _ => ErrorKind::Internal,
        }
    }
}

/// サーバ側で1接続の処理が失敗した理由
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}
