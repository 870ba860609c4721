//! ソケット上の要求/応答トランスポート
//!
//! - 要求: `[10桁の長さ][音声ペイロード]`
//! - 応答: JSON 1 個（`ReplyFraming::Framed` なら同じ長さヘッダ付き）を送って切断
//!
//! 1 接続につき 1 要求/1 応答のみを扱い、接続間で状態は共有しません。
pub mod client;
mod error;
mod io;
mod reply;
pub mod server;

pub use client::{decode_reply, send_and_receive, ClassifyClient};
pub use error::{ConnectionError, TransportError};
pub use io::{discard_until_eof, read_exact_or_eof, read_to_end_bounded, write_all_chunked};
pub use reply::{ErrorKind, ErrorReply};
pub use server::{ConnectionHandler, PayloadProcessor, ServerError};
