//! 推論サーバ（ソケット受信側）の設定
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// 宣言長に満たないペイロードを受信した場合の扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyPolicy {
    /// 要求を失敗させる
    Strict,
    /// 警告を出し、受信済みの分だけで処理を続ける
    Lenient,
}

/// 応答の送り方
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyFraming {
    /// 要求と同じ10桁ヘッダを付けて送る
    Framed,
    /// ヘッダなしで送り、切断を終端とみなす
    Raw,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 待ち受けアドレス（例: 0.0.0.0:9000）
    pub bind_addr: String,
    /// 同時に処理する接続数の上限
    pub max_connections: usize,
    /// 受け付けるペイロード長の上限（バイト）
    pub max_payload_bytes: u64,
    pub header_timeout_ms: u64,
    pub body_timeout_ms: u64,
    pub body_policy: BodyPolicy,
    pub reply_framing: ReplyFraming,
    /// 失敗時に `{"error": ..., "detail": ...}` を返すか
    #[serde(default = "default_error_replies")]
    pub error_replies: bool,
}

fn default_error_replies() -> bool {
    true
}

impl ServerConfig {
    pub fn header_timeout(&self) -> Duration {
        Duration::from_millis(self.header_timeout_ms)
    }

    pub fn body_timeout(&self) -> Duration {
        Duration::from_millis(self.body_timeout_ms)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.max_connections == 0 {
            return Err(ConfigError::invalid("server.max_connections", "must be at least 1"));
        }
        if self.max_payload_bytes > crate::framing::MAX_PAYLOAD_LEN {
            return Err(ConfigError::invalid(
                "server.max_payload_bytes",
                "exceeds the capacity of the 10-digit length header",
            ));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:9000".to_string(),
            max_connections: 8,
            max_payload_bytes: 50 * 1024 * 1024,
            header_timeout_ms: 10_000,
            body_timeout_ms: 60_000,
            body_policy: BodyPolicy::Strict,
            reply_framing: ReplyFraming::Framed,
            error_replies: true,
        }
    }
}
