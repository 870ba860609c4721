//! 部分的な読み書きを前提にしたソケットI/Oの補助関数
//!
//! 1 回の `write`/`read` が要求より少ないバイト数しか扱わない場合でも、
//! 全量を送る/宣言長まで読むまでループします。
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use super::TransportError;

const READ_CHUNK: usize = 64 * 1024;
const MAX_PREALLOC: usize = 4 * 1024 * 1024;

/// バッファを送り切るまで `write` を繰り返す
pub async fn write_all_chunked<W>(writer: &mut W, mut buf: &[u8]) -> Result<(), TransportError>
where
    W: AsyncWrite + Unpin,
{
    while !buf.is_empty() {
        let written = writer.write(buf).await.map_err(TransportError::Write)?;
        if written == 0 {
            return Err(TransportError::Write(std::io::Error::new(
                std::io::ErrorKind::WriteZero,
                "peer stopped accepting bytes",
            )));
        }
        buf = &buf[written..];
    }
    writer.flush().await.map_err(TransportError::Write)
}

/// `expected` バイトに達するか相手が切断するまで読む
///
/// 切断時はそれまでに受信した分を返す（不足かどうかの判断は呼び出し側）。
pub async fn read_exact_or_eof<R>(reader: &mut R, expected: usize) -> Result<Vec<u8>, TransportError>
where
    R: AsyncRead + Unpin,
{
    let mut data = Vec::with_capacity(expected.min(MAX_PREALLOC));
    let mut chunk = vec![0u8; expected.clamp(1, READ_CHUNK)];

    while data.len() < expected {
        let want = (expected - data.len()).min(chunk.len());
        let received = reader
            .read(&mut chunk[..want])
            .await
            .map_err(TransportError::Read)?;
        if received == 0 {
            break;
        }
        data.extend_from_slice(&chunk[..received]);
        debug!(received, total = data.len(), expected, "chunk received");
    }

    Ok(data)
}

/// 相手の切断まで読む（`limit` を超えたらエラー）
pub async fn read_to_end_bounded<R>(reader: &mut R, limit: usize) -> Result<Vec<u8>, TransportError>
where
    R: AsyncRead + Unpin,
{
    let mut data = Vec::new();
    let mut chunk = vec![0u8; READ_CHUNK];

    loop {
        let received = reader.read(&mut chunk).await.map_err(TransportError::Read)?;
        if received == 0 {
            return Ok(data);
        }
        if data.len() + received > limit {
            return Err(TransportError::ReplyTooLarge { limit });
        }
        data.extend_from_slice(&chunk[..received]);
    }
}

/// 相手が送信を終えるまで受信データを読み捨てる（戻り値は読み捨てたバイト数）
pub async fn discard_until_eof<R>(reader: &mut R) -> Result<u64, TransportError>
where
    R: AsyncRead + Unpin,
{
    tokio::io::copy(reader, &mut tokio::io::sink())
        .await
        .map_err(TransportError::Read)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn single_byte_pipe_transfers_everything() {
        let (mut tx, mut rx) = tokio::io::duplex(1);
        let payload: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        let expected = payload.clone();

        let writer = tokio::spawn(async move {
            write_all_chunked(&mut tx, &payload).await.unwrap();
        });
        let received = read_exact_or_eof(&mut rx, expected.len()).await.unwrap();
        writer.await.unwrap();

        assert_eq!(received, expected);
    }

    #[tokio::test]
    async fn early_close_returns_partial_data() {
        let (mut tx, mut rx) = tokio::io::duplex(64);
        tx.write_all(b"abc").await.unwrap();
        drop(tx);

        let received = read_exact_or_eof(&mut rx, 5).await.unwrap();
        assert_eq!(received, b"abc");
    }

    #[tokio::test]
    async fn bounded_read_rejects_oversized_reply() {
        let (mut tx, mut rx) = tokio::io::duplex(64);
        tx.write_all(&[7u8; 32]).await.unwrap();
        drop(tx);

        let err = read_to_end_bounded(&mut rx, 16).await.unwrap_err();
        assert!(matches!(err, TransportError::ReplyTooLarge { limit: 16 }));
    }

    #[tokio::test]
    async fn discard_reads_until_peer_finishes() {
        let (mut tx, mut rx) = tokio::io::duplex(8);
        let writer = tokio::spawn(async move {
            write_all_chunked(&mut tx, &[1u8; 1000]).await.unwrap();
        });

        assert_eq!(discard_until_eof(&mut rx).await.unwrap(), 1000);
        writer.await.unwrap();
    }
}
