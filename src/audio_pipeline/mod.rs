//! 音声の正規化パイプライン
//!
//! 任意の対応形式の音声バイト列を デコード → モノラル化 → リサンプル → 窓合わせ し、
//! 分類器がそのまま受け取れる固定長の `Waveform` を作ります。
mod decoder;
mod error;
mod format;
mod resampler;
mod transcoder;
mod utils;
mod window;

use std::sync::Arc;

use tracing::debug;

use crate::config::{AudioProcessingConfig, ResamplerKind, TranscoderKind};

pub use decoder::{decode_to_mono, DecodedAudio};
pub use error::AudioError;
pub use format::AudioFormat;
pub use resampler::{LinearResampler, SincResampler};
pub use transcoder::{FfmpegTranscoder, NativeTranscoder, Transcoder};
pub use utils::{downmix_interleaved, root_mean_square};
pub use window::{fit_to_window, Waveform};

/// 分類器が前提とするサンプルレート
pub const TARGET_SAMPLE_RATE_HZ: u32 = 32_000;
/// 分類窓の長さ（秒）
pub const WINDOW_SECONDS: u32 = 5;
/// 既定の窓サンプル数（32kHz × 5秒）
pub const WINDOW_SAMPLES: usize = TARGET_SAMPLE_RATE_HZ as usize * WINDOW_SECONDS as usize;

pub struct AudioNormalizer {
    config: AudioProcessingConfig,
    transcoder: Arc<dyn Transcoder>,
}

impl AudioNormalizer {
    /// 設定に従ってコンテナ変換方法を選ぶ
    pub fn new(config: AudioProcessingConfig) -> Self {
        let transcoder: Arc<dyn Transcoder> = match config.transcoder {
            TranscoderKind::Native => Arc::new(NativeTranscoder),
            TranscoderKind::Ffmpeg => Arc::new(FfmpegTranscoder::new(config.ffmpeg_path.clone())),
        };
        Self::with_transcoder(config, transcoder)
    }

    pub fn with_transcoder(config: AudioProcessingConfig, transcoder: Arc<dyn Transcoder>) -> Self {
        Self { config, transcoder }
    }

    pub fn config(&self) -> &AudioProcessingConfig {
        &self.config
    }

    /// マジックバイトで形式を判定（不明なら設定の既定形式）
    pub fn detect_format(&self, bytes: &[u8]) -> AudioFormat {
        AudioFormat::sniff(bytes).unwrap_or(self.config.default_format)
    }

    /// 音声バイト列を固定長の波形へ変換
    ///
    /// 空のペイロードはエラーにせず、無音の波形を返す。
    pub fn normalize(&self, raw: Vec<u8>, format: AudioFormat) -> Result<Waveform, AudioError> {
        let target_rate = self.config.target_sample_rate_hz;
        let window = self.config.target_samples();
        if raw.is_empty() {
            debug!("empty payload, using a silent window");
            return Ok(Waveform::silent(target_rate, window));
        }

        let (bytes, format) = self.transcoder.transcode(raw, format)?;
        let decoded = decoder::decode_to_mono(bytes, Some(format), None)?;
        self.normalize_samples(decoded.samples, decoded.sample_rate_hz)
    }

    /// デコード済みのモノラル信号を窓に合わせる
    pub fn normalize_samples(
        &self,
        mut samples: Vec<f32>,
        sample_rate_hz: u32,
    ) -> Result<Waveform, AudioError> {
        let target_rate = self.config.target_sample_rate_hz;
        let window = self.config.target_samples();

        // 窓に入る分だけリサンプルすれば十分（補間用に少し余裕を持たせる）
        if sample_rate_hz != target_rate && sample_rate_hz > 0 {
            let needed = (window as f64 * sample_rate_hz as f64 / target_rate as f64).ceil()
                as usize
                + 2;
            samples.truncate(needed);
        }

        let resampled = match self.config.resampler {
            ResamplerKind::Linear => {
                LinearResampler::new(sample_rate_hz, target_rate).resample(&samples)
            }
            ResamplerKind::Sinc => SincResampler::new(sample_rate_hz, target_rate).resample(samples)?,
        };

        debug!(
            source_rate = sample_rate_hz,
            resampled = resampled.len(),
            window,
            "waveform prepared"
        );
        Ok(Waveform::fitted(resampled, target_rate, window))
    }
}

impl std::fmt::Debug for AudioNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioNormalizer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
