//! 推論サーバ側のソケット処理
//!
//! 接続ごとに ヘッダ受信 → ペイロード受信 → 分類 → 応答 → 切断 を行います。
//! ペイロードは全量を受信してから処理に渡します（部分的な分類はしない）。
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_stream::StreamExt;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::io::{discard_until_eof, read_exact_or_eof, write_all_chunked};
use super::reply::{ErrorKind, ErrorReply};
use super::{ConnectionError, TransportError};
use crate::assembler::ClassificationResult;
use crate::config::{BodyPolicy, ReplyFraming, ServerConfig};
use crate::framing::{self, FramingError, HEADER_LEN};
use crate::pipeline::PipelineError;

#[derive(thiserror::Error, Debug)]
pub enum ServerError {
    #[error("bind error: {0}")]
    Bind(std::io::Error),
    #[error("accept error: {0}")]
    Accept(std::io::Error),
    #[error("connection limiter closed")]
    LimiterClosed,
}

/// 受信済みペイロードを分類結果に変換する処理
#[async_trait]
pub trait PayloadProcessor: Send + Sync + 'static {
    async fn process(&self, payload: Vec<u8>) -> Result<ClassificationResult, PipelineError>;
}

/// 1接続分のプロトコル処理
pub struct ConnectionHandler<P> {
    processor: Arc<P>,
    config: Arc<ServerConfig>,
}

impl<P> Clone for ConnectionHandler<P> {
    fn clone(&self) -> Self {
        Self {
            processor: self.processor.clone(),
            config: self.config.clone(),
        }
    }
}

impl<P: PayloadProcessor> ConnectionHandler<P> {
    pub fn new(processor: Arc<P>, config: ServerConfig) -> Self {
        Self {
            processor,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// 1接続を最後まで処理する（応答送信後にストリームを閉じる）
    pub async fn handle<S>(&self, stream: S, peer: SocketAddr) -> Result<(), ConnectionError>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        let span = info_span!("connection", %peer, request_id = %Uuid::new_v4());
        self.handle_inner(stream).instrument(span).await
    }

    async fn handle_inner<S>(&self, mut stream: S) -> Result<(), ConnectionError>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        info!("connection accepted");

        let mut unread_body = false;
        let outcome = match self.receive(&mut stream).await {
            Ok(payload) => match self.processor.process(payload).await {
                Ok(result) => self
                    .send_result(&mut stream, &result)
                    .await
                    .map_err(ConnectionError::from),
                Err(err) => {
                    error!(error = %err, "classification failed");
                    self.send_error(&mut stream, err.kind(), &err).await;
                    Err(err.into())
                }
            },
            Err(err @ TransportError::IncompleteHeader { .. }) => {
                // 長さが分からない接続には応答しない
                warn!(error = %err, "aborting connection");
                Err(err.into())
            }
            Err(err) => {
                warn!(error = %err, "failed to receive payload");
                unread_body = matches!(err, TransportError::Framing(_));
                self.send_error(&mut stream, err.reply_kind(), &err).await;
                Err(err.into())
            }
        };

        let _ = stream.shutdown().await;
        if unread_body {
            // 未読のまま閉じると RST で応答が失われるため、相手の送信終了まで読み捨てる
            self.drain(&mut stream).await;
        }
        outcome
    }

    async fn drain<S>(&self, stream: &mut S)
    where
        S: AsyncRead + Unpin,
    {
        match timeout(self.config.body_timeout(), discard_until_eof(stream)).await {
            Ok(Ok(discarded)) => debug!(discarded, "rejected payload drained"),
            Ok(Err(e)) => debug!(error = %e, "peer went away while draining"),
            Err(_) => debug!("gave up draining rejected payload"),
        }
    }

    /// ヘッダとペイロードを受信する
    async fn receive<S>(&self, stream: &mut S) -> Result<Vec<u8>, TransportError>
    where
        S: AsyncRead + Unpin,
    {
        let header = timeout(self.config.header_timeout(), read_exact_or_eof(stream, HEADER_LEN))
            .await
            .map_err(|_| TransportError::Timeout { phase: "header" })??;
        let header: &[u8; HEADER_LEN] =
            header
                .as_slice()
                .try_into()
                .map_err(|_| TransportError::IncompleteHeader {
                    received: header.len(),
                })?;

        let declared = framing::decode_header(header)?;
        if declared > self.config.max_payload_bytes {
            return Err(FramingError::ExceedsLimit {
                declared,
                limit: self.config.max_payload_bytes,
            }
            .into());
        }
        info!(declared, "expecting payload");

        let payload = timeout(
            self.config.body_timeout(),
            read_exact_or_eof(stream, declared as usize),
        )
        .await
        .map_err(|_| TransportError::Timeout { phase: "body" })??;

        let received = payload.len() as u64;
        if received < declared {
            let err = TransportError::IncompleteBody { received, declared };
            match self.config.body_policy {
                BodyPolicy::Strict => return Err(err),
                BodyPolicy::Lenient => {
                    warn!(received, declared, "payload incomplete, continuing with partial data")
                }
            }
        } else {
            debug!(received, "payload fully received");
        }

        Ok(payload)
    }

    async fn send_result<S>(
        &self,
        stream: &mut S,
        result: &ClassificationResult,
    ) -> Result<(), TransportError>
    where
        S: AsyncWrite + Unpin,
    {
        let body = serde_json::to_vec(result).map_err(|e| {
            TransportError::Write(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;
        self.write_reply(stream, &body).await?;
        info!(
            species = %result.species,
            probability = result.probability,
            "reply sent"
        );
        Ok(())
    }

    /// エラー応答（設定で無効なら何も送らない）。送信失敗は記録のみ
    async fn send_error<S, E>(&self, stream: &mut S, kind: ErrorKind, err: &E)
    where
        S: AsyncWrite + Unpin,
        E: std::fmt::Display,
    {
        if !self.config.error_replies {
            return;
        }
        let reply = ErrorReply::new(kind, err.to_string());
        let body = match serde_json::to_vec(&reply) {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "failed to serialize error reply");
                return;
            }
        };
        if let Err(e) = self.write_reply(stream, &body).await {
            debug!(error = %e, "error reply not delivered");
        }
    }

    async fn write_reply<S>(&self, stream: &mut S, body: &[u8]) -> Result<(), TransportError>
    where
        S: AsyncWrite + Unpin,
    {
        if self.config.reply_framing == ReplyFraming::Framed {
            let header = framing::encode_header(body.len() as u64)?;
            write_all_chunked(stream, &header).await?;
        }
        write_all_chunked(stream, body).await
    }
}

/// 指定アドレスにバインドしてサーバを起動（停止しない）
pub async fn bind_and_run<P: PayloadProcessor>(
    bind_addr: &str,
    handler: ConnectionHandler<P>,
) -> Result<(), ServerError> {
    let listener = TcpListener::bind(bind_addr).await.map_err(ServerError::Bind)?;
    run_with_listener(listener, handler, std::future::pending()).await
}

/// 既存の`TcpListener`でサーバを起動（`shutdown` 完了で受付を止める）
pub async fn run_with_listener<P, F>(
    listener: TcpListener,
    handler: ConnectionHandler<P>,
    shutdown: F,
) -> Result<(), ServerError>
where
    P: PayloadProcessor,
    F: Future<Output = ()>,
{
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "classification server listening");
    }

    let limiter = Arc::new(Semaphore::new(handler.config().max_connections));
    let mut incoming = TcpListenerStream::new(listener);
    tokio::pin!(shutdown);

    loop {
        // 上限に達している間も停止要求には応じる
        let permit = tokio::select! {
            _ = &mut shutdown => {
                info!("shutdown requested while at connection limit");
                return Ok(());
            }
            permit = limiter.clone().acquire_owned() => {
                permit.map_err(|_| ServerError::LimiterClosed)?
            }
        };

        let stream = tokio::select! {
            _ = &mut shutdown => {
                info!("shutdown requested, no longer accepting connections");
                return Ok(());
            }
            next = incoming.next() => match next {
                Some(Ok(stream)) => stream,
                Some(Err(e)) => return Err(ServerError::Accept(e)),
                None => return Ok(()),
            },
        };

        let peer = match stream.peer_addr() {
            Ok(peer) => peer,
            Err(e) => {
                warn!(error = %e, "dropping connection without peer address");
                continue;
            }
        };
        let _ = stream.set_nodelay(true);

        let handler = handler.clone();
        tokio::spawn(async move {
            let _permit = permit;
            if let Err(e) = handler.handle(stream, peer).await {
                warn!(error = %e, %peer, "connection handling failed");
            }
        });
    }
}
