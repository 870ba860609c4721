//! デコード前のコンテナ変換（外部コーデック連携）
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;

use tempfile::NamedTempFile;
use tracing::debug;

use super::{AudioError, AudioFormat};

/// 入力を共通のデコード経路で扱える形式へ変換する
pub trait Transcoder: Send + Sync {
    /// 変換後のバイト列とその形式を返す
    fn transcode(
        &self,
        bytes: Vec<u8>,
        format: AudioFormat,
    ) -> Result<(Vec<u8>, AudioFormat), AudioError>;
}

/// 変換しない（symphonia が対応形式をすべて直接デコードする）
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeTranscoder;

impl Transcoder for NativeTranscoder {
    fn transcode(
        &self,
        bytes: Vec<u8>,
        format: AudioFormat,
    ) -> Result<(Vec<u8>, AudioFormat), AudioError> {
        Ok((bytes, format))
    }
}

/// ffmpeg で mp3 以外を PCM の WAV に変換する
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    program: PathBuf,
}

impl FfmpegTranscoder {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Transcoder for FfmpegTranscoder {
    fn transcode(
        &self,
        bytes: Vec<u8>,
        format: AudioFormat,
    ) -> Result<(Vec<u8>, AudioFormat), AudioError> {
        if matches!(format, AudioFormat::Mp3 | AudioFormat::Wav) {
            return Ok((bytes, format));
        }

        let mut input = NamedTempFile::with_suffix(format!(".{}", format.extension()))?;
        input.write_all(&bytes)?;
        input.flush()?;
        let output = NamedTempFile::with_suffix(".wav")?;

        let result = Command::new(&self.program)
            .args(["-hide_banner", "-loglevel", "error", "-y", "-i"])
            .arg(input.path())
            .args(["-f", "wav"])
            .arg(output.path())
            .output()
            .map_err(|e| AudioError::Transcode(format!("failed to run {:?}: {e}", self.program)))?;

        if !result.status.success() {
            return Err(AudioError::Transcode(
                String::from_utf8_lossy(&result.stderr).trim().to_string(),
            ));
        }

        let converted = std::fs::read(output.path())?;
        debug!(from = %format, bytes = converted.len(), "transcoded to wav");
        Ok((converted, AudioFormat::Wav))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_transcoder_passes_bytes_through() {
        let (bytes, format) = NativeTranscoder
            .transcode(vec![1, 2, 3], AudioFormat::M4a)
            .unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
        assert_eq!(format, AudioFormat::M4a);
    }

    #[test]
    fn ffmpeg_leaves_mp3_untouched() {
        let transcoder = FfmpegTranscoder::new("/nonexistent/ffmpeg");
        let (bytes, format) = transcoder.transcode(vec![9], AudioFormat::Mp3).unwrap();
        assert_eq!((bytes, format), (vec![9], AudioFormat::Mp3));
    }

    #[test]
    fn missing_ffmpeg_is_a_transcode_error() {
        let transcoder = FfmpegTranscoder::new("/nonexistent/ffmpeg");
        let err = transcoder.transcode(vec![0; 16], AudioFormat::Flac).unwrap_err();
        assert!(matches!(err, AudioError::Transcode(_)));
    }
}
