use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::AudioError;

/// 受け付ける音声コンテナ形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Mp3,
    Wav,
    Flac,
    Ogg,
    M4a,
}

impl AudioFormat {
    pub const ALL: [AudioFormat; 5] = [
        AudioFormat::Mp3,
        AudioFormat::Wav,
        AudioFormat::Flac,
        AudioFormat::Ogg,
        AudioFormat::M4a,
    ];

    /// symphonia のヒントや一時ファイルに使う拡張子
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
            Self::Flac => "flac",
            Self::Ogg => "ogg",
            Self::M4a => "m4a",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "mp3" => Some(Self::Mp3),
            "wav" | "wave" => Some(Self::Wav),
            "flac" => Some(Self::Flac),
            "ogg" | "oga" => Some(Self::Ogg),
            "m4a" | "mp4" => Some(Self::M4a),
            _ => None,
        }
    }

    /// 先頭バイトから形式を推測
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE" {
            Some(Self::Wav)
        } else if bytes.len() >= 4 && &bytes[0..4] == b"fLaC" {
            Some(Self::Flac)
        } else if bytes.len() >= 4 && &bytes[0..4] == b"OggS" {
            Some(Self::Ogg)
        } else if bytes.len() >= 8 && &bytes[4..8] == b"ftyp" {
            Some(Self::M4a)
        } else if bytes.len() >= 3 && &bytes[0..3] == b"ID3" {
            Some(Self::Mp3)
        } else if bytes.len() >= 2 && is_mpeg_audio_sync(bytes[0], bytes[1]) {
            Some(Self::Mp3)
        } else {
            None
        }
    }
}

/// MPEG オーディオのフレーム同期（レイヤビット 00 の ADTS は除外）
fn is_mpeg_audio_sync(b0: u8, b1: u8) -> bool {
    b0 == 0xFF && (b1 & 0xE0) == 0xE0 && (b1 & 0x06) != 0
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for AudioFormat {
    type Err = AudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s).ok_or_else(|| AudioError::UnsupportedFormat(s.to_string()))
    }
}
