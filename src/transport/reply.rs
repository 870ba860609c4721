use std::fmt;

use serde::{Deserialize, Serialize};

/// エラー応答の種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Framing,
    IncompleteHeader,
    IncompleteBody,
    Timeout,
    Decode,
    Inference,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Framing => "framing",
            Self::IncompleteHeader => "incomplete_header",
            Self::IncompleteBody => "incomplete_body",
            Self::Timeout => "timeout",
            Self::Decode => "decode",
            Self::Inference => "inference",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 失敗時にサーバが返す JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReply {
    pub error: ErrorKind,
    pub detail: String,
}

impl ErrorReply {
    pub fn new(error: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            error,
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_reply_wire_shape() {
        let reply = ErrorReply::new(ErrorKind::IncompleteBody, "3 of 5 bytes");
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["error"], "incomplete_body");
        assert_eq!(json["detail"], "3 of 5 bytes");
    }
}
