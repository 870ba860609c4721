//! 長さプレフィックス付きフレームのエンコード/デコード
//!
//! フレームは 10 文字のゼロ埋め ASCII 十進数ヘッダと、その長さ分のペイロードから成ります。
//! 例: `"0000000005hello"`
use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;

/// ヘッダのバイト数
pub const HEADER_LEN: usize = 10;

/// 10桁で表現できる最大ペイロード長
pub const MAX_PAYLOAD_LEN: u64 = 9_999_999_999;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FramingError {
    #[error("length header is not ascii decimal: {header:?}")]
    NonDigitHeader { header: String },
    #[error("payload of {len} bytes does not fit a 10-digit length header")]
    PayloadTooLarge { len: u64 },
    #[error("declared length {declared} exceeds the limit of {limit} bytes")]
    ExceedsLimit { declared: u64, limit: u64 },
    #[error("frame of {len} bytes is shorter than its header")]
    TruncatedHeader { len: usize },
    #[error("frame declares {declared} payload bytes but carries {actual}")]
    LengthMismatch { declared: u64, actual: u64 },
}

/// ペイロード長をヘッダ文字列に変換
pub fn encode_header(len: u64) -> Result<[u8; HEADER_LEN], FramingError> {
    if len > MAX_PAYLOAD_LEN {
        return Err(FramingError::PayloadTooLarge { len });
    }
    let text = format!("{:010}", len);
    let mut header = [0u8; HEADER_LEN];
    header.copy_from_slice(text.as_bytes());
    Ok(header)
}

/// ヘッダ + ペイロードを1つのバッファにまとめる
pub fn encode(payload: &[u8]) -> Result<Bytes, FramingError> {
    let header = encode_header(payload.len() as u64)?;
    let mut frame = BytesMut::with_capacity(HEADER_LEN + payload.len());
    frame.put_slice(&header);
    frame.put_slice(payload);
    Ok(frame.freeze())
}

/// 10バイトのヘッダを長さに変換（数字以外を含む場合はエラー）
pub fn decode_header(header: &[u8; HEADER_LEN]) -> Result<u64, FramingError> {
    if !header.iter().all(u8::is_ascii_digit) {
        return Err(FramingError::NonDigitHeader {
            header: String::from_utf8_lossy(header).into_owned(),
        });
    }
    Ok(header
        .iter()
        .fold(0u64, |acc, digit| acc * 10 + u64::from(digit - b'0')))
}

/// 完全なフレームからペイロード部分を取り出す
pub fn decode(frame: &[u8]) -> Result<&[u8], FramingError> {
    let header: &[u8; HEADER_LEN] = frame
        .get(..HEADER_LEN)
        .and_then(|h| h.try_into().ok())
        .ok_or(FramingError::TruncatedHeader { len: frame.len() })?;
    let declared = decode_header(header)?;
    let payload = &frame[HEADER_LEN..];
    if payload.len() as u64 != declared {
        return Err(FramingError::LengthMismatch {
            declared,
            actual: payload.len() as u64,
        });
    }
    Ok(payload)
}
