//! 音声処理に関する設定値
use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::audio_pipeline::{AudioFormat, TARGET_SAMPLE_RATE_HZ, WINDOW_SECONDS};

/// リサンプラの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResamplerKind {
    /// rubato の sinc 補間
    Sinc,
    /// 線形補間（軽量）
    Linear,
}

/// デコード前のコンテナ変換の方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscoderKind {
    /// symphonia で直接デコードする
    Native,
    /// 外部の ffmpeg で WAV に変換してからデコードする
    Ffmpeg,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioProcessingConfig {
    pub target_sample_rate_hz: u32,
    pub window_seconds: u32,
    pub resampler: ResamplerKind,
    /// マジックバイトから判定できない場合に仮定する形式
    pub default_format: AudioFormat,
    pub transcoder: TranscoderKind,
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

impl AudioProcessingConfig {
    /// 分類器に渡す窓のサンプル数
    pub fn target_samples(&self) -> usize {
        self.target_sample_rate_hz as usize * self.window_seconds as usize
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.target_sample_rate_hz == 0 {
            return Err(ConfigError::invalid(
                "audio.target_sample_rate_hz",
                "must be positive",
            ));
        }
        if self.window_seconds == 0 {
            return Err(ConfigError::invalid("audio.window_seconds", "must be positive"));
        }
        Ok(())
    }
}

impl Default for AudioProcessingConfig {
    fn default() -> Self {
        Self {
            target_sample_rate_hz: TARGET_SAMPLE_RATE_HZ,
            window_seconds: WINDOW_SECONDS,
            resampler: ResamplerKind::Sinc,
            default_format: AudioFormat::Mp3,
            transcoder: TranscoderKind::Native,
            ffmpeg_path: default_ffmpeg_path(),
        }
    }
}
