//! ゲートウェイ側クライアント
//!
//! 接続 → ヘッダ送信 → ペイロード送信 → 応答受信 → 切断 の順で 1 要求を処理します。
use std::path::Path;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::io::{read_exact_or_eof, read_to_end_bounded, write_all_chunked};
use super::reply::ErrorReply;
use super::TransportError;
use crate::assembler::ClassificationResult;
use crate::config::{ClientConfig, ConfigSet, ReplyFraming};
use crate::framing::{self, HEADER_LEN};

#[derive(Debug, Clone)]
pub struct ClassifyClient {
    config: ClientConfig,
}

impl ClassifyClient {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn from_config(config: &ConfigSet) -> Self {
        Self::new(config.client.clone())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// 接続してペイロードを送り、応答の生バイト列を返す
    pub async fn send_and_receive(&self, payload: &[u8]) -> Result<Vec<u8>, TransportError> {
        let addr = self.config.address();
        let stream = timeout(self.config.connect_timeout(), TcpStream::connect(&addr))
            .await
            .map_err(|_| TransportError::Timeout { phase: "connect" })?
            .map_err(|source| TransportError::Connect {
                addr: addr.clone(),
                source,
            })?;
        // Nagle で小さなヘッダ送信が遅延しないように
        let _ = stream.set_nodelay(true);

        info!(%addr, bytes = payload.len(), "sending audio payload");
        self.exchange(stream, payload).await
    }

    /// 接続済みストリーム上で 1 回の要求/応答を行う（テストでは duplex を渡す）
    pub async fn exchange<S>(&self, mut stream: S, payload: &[u8]) -> Result<Vec<u8>, TransportError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let header = framing::encode_header(payload.len() as u64)?;
        let sent = match write_all_chunked(&mut stream, &header).await {
            Ok(()) => write_all_chunked(&mut stream, payload).await,
            Err(e) => Err(e),
        };

        if let Err(write_err) = sent {
            // 送信途中で切断されても、先に届いたエラー応答を読みにいく
            warn!(error = %write_err, "payload write interrupted, checking for a reply");
            let early = timeout(self.config.read_timeout(), self.read_reply(&mut stream)).await;
            let _ = stream.shutdown().await;
            return match early {
                Ok(Ok(reply)) if !reply.is_empty() => {
                    debug!(bytes = reply.len(), "early reply received");
                    Ok(reply)
                }
                _ => Err(write_err),
            };
        }
        debug!(bytes = payload.len(), "payload flushed");

        let reply = timeout(self.config.read_timeout(), self.read_reply(&mut stream))
            .await
            .map_err(|_| TransportError::Timeout { phase: "reply" });
        // 応答の成否にかかわらず切断する
        let _ = stream.shutdown().await;

        let reply = reply??;
        debug!(bytes = reply.len(), "reply received");
        Ok(reply)
    }

    /// 送信して応答を分類結果として解釈する
    pub async fn classify(&self, payload: &[u8]) -> Result<ClassificationResult, TransportError> {
        let reply = self.send_and_receive(payload).await?;
        decode_reply(&reply)
    }

    /// ファイルを読み込んでそのまま送信する（形式変換はサーバ側で行う）
    pub async fn classify_file(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<ClassificationResult, TransportError> {
        let payload = tokio::fs::read(path.as_ref())
            .await
            .map_err(TransportError::Read)?;
        self.classify(&payload).await
    }

    async fn read_reply<S>(&self, stream: &mut S) -> Result<Vec<u8>, TransportError>
    where
        S: AsyncRead + Unpin,
    {
        match self.config.reply_framing {
            ReplyFraming::Raw => read_to_end_bounded(stream, self.config.max_reply_bytes).await,
            ReplyFraming::Framed => {
                let header = read_exact_or_eof(stream, HEADER_LEN).await?;
                let header: &[u8; HEADER_LEN] = header
                    .as_slice()
                    .try_into()
                    .map_err(|_| TransportError::IncompleteHeader {
                        received: header.len(),
                    })?;
                let declared = framing::decode_header(header)?;
                if declared > self.config.max_reply_bytes as u64 {
                    return Err(TransportError::ReplyTooLarge {
                        limit: self.config.max_reply_bytes,
                    });
                }
                let body = read_exact_or_eof(stream, declared as usize).await?;
                if (body.len() as u64) < declared {
                    return Err(TransportError::IncompleteBody {
                        received: body.len() as u64,
                        declared,
                    });
                }
                Ok(body)
            }
        }
    }
}

/// 応答バイト列を分類結果へ変換（エラー応答は `Remote` として返す）
pub fn decode_reply(reply: &[u8]) -> Result<ClassificationResult, TransportError> {
    let value: serde_json::Value =
        serde_json::from_slice(reply).map_err(|e| TransportError::ReplyDecode {
            message: e.to_string(),
        })?;

    if value.get("error").is_some() {
        let remote: ErrorReply =
            serde_json::from_value(value).map_err(|e| TransportError::ReplyDecode {
                message: e.to_string(),
            })?;
        return Err(TransportError::Remote {
            kind: remote.error,
            detail: remote.detail,
        });
    }

    serde_json::from_value(value).map_err(|e| TransportError::ReplyDecode {
        message: e.to_string(),
    })
}

/// 既定のクライアント設定で `host:port` に 1 要求を送る
pub async fn send_and_receive(
    host: &str,
    port: u16,
    payload: &[u8],
) -> Result<Vec<u8>, TransportError> {
    let config = ClientConfig {
        host: host.to_string(),
        port,
        ..ClientConfig::default()
    };
    ClassifyClient::new(config).send_and_receive(payload).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ErrorKind;

    #[test]
    fn error_object_becomes_remote_error() {
        let err = decode_reply(br#"{"error":"decode","detail":"bad container"}"#).unwrap_err();
        match err {
            TransportError::Remote { kind, detail } => {
                assert_eq!(kind, ErrorKind::Decode);
                assert_eq!(detail, "bad container");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn garbage_reply_is_a_decode_error() {
        assert!(matches!(
            decode_reply(b"Error, Status Code: 404"),
            Err(TransportError::ReplyDecode { .. })
        ));
        assert!(matches!(
            decode_reply(br#"{"common_name":"only"}"#),
            Err(TransportError::ReplyDecode { .. })
        ));
    }
}
