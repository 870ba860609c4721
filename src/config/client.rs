use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{ConfigError, ReplyFraming};

/// ゲートウェイ側クライアントの接続設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
    /// サーバの `reply_framing` と一致させること
    pub reply_framing: ReplyFraming,
    pub max_reply_bytes: usize,
}

impl ClientConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// `host:port` 形式の接続先
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.max_reply_bytes == 0 {
            return Err(ConfigError::invalid("client.max_reply_bytes", "must be positive"));
        }
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9000,
            connect_timeout_ms: 5_000,
            read_timeout_ms: 120_000,
            reply_framing: ReplyFraming::Framed,
            max_reply_bytes: 1024 * 1024,
        }
    }
}
