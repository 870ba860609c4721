use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use super::AudioError;

/// 単純な線形補間ベースのリサンプラ
#[derive(Debug, Clone)]
pub struct LinearResampler {
    input_rate: u32,
    output_rate: u32,
}

impl LinearResampler {
    /// 入出力サンプルレートを指定して作成
    pub fn new(input_rate: u32, output_rate: u32) -> Self {
        Self {
            input_rate,
            output_rate,
        }
    }

    /// 線形補間によりリサンプル
    pub fn resample(&self, samples: &[f32]) -> Vec<f32> {
        if self.input_rate == self.output_rate || samples.is_empty() {
            return samples.to_vec();
        }

        let ratio = self.output_rate as f64 / self.input_rate as f64;
        let output_len = (samples.len() as f64 * ratio).round() as usize;
        let last = samples[samples.len() - 1];

        (0..output_len)
            .map(|n| {
                let position = n as f64 / ratio;
                let base_index = position.floor() as usize;
                let frac = (position - base_index as f64) as f32;
                let a = samples.get(base_index).copied().unwrap_or(last);
                let b = samples.get(base_index + 1).copied().unwrap_or(a);
                a + (b - a) * frac
            })
            .collect()
    }
}

/// rubato の sinc 補間リサンプラ（固定長チャンクで処理）
#[derive(Debug, Clone)]
pub struct SincResampler {
    input_rate: u32,
    output_rate: u32,
}

const SINC_CHUNK_FRAMES: usize = 1024;

impl SincResampler {
    pub fn new(input_rate: u32, output_rate: u32) -> Self {
        Self {
            input_rate,
            output_rate,
        }
    }

    pub fn resample(&self, samples: Vec<f32>) -> Result<Vec<f32>, AudioError> {
        if self.input_rate == self.output_rate || samples.is_empty() {
            return Ok(samples);
        }

        let ratio = self.output_rate as f64 / self.input_rate as f64;
        let params = SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        };

        let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, SINC_CHUNK_FRAMES, 1)
            .map_err(|e| AudioError::Resample(e.to_string()))?;

        let expected = (samples.len() as f64 * ratio).round() as usize;
        let mut output = Vec::with_capacity(expected + SINC_CHUNK_FRAMES);
        for chunk in samples.chunks(SINC_CHUNK_FRAMES) {
            // 最後の端数チャンクは無音で埋めて固定長にする
            let mut block = chunk.to_vec();
            block.resize(SINC_CHUNK_FRAMES, 0.0);
            let input_channels = vec![block];
            let processed = resampler
                .process(&input_channels, None)
                .map_err(|e| AudioError::Resample(e.to_string()))?;
            output.extend_from_slice(&processed[0]);
        }
        output.truncate(expected);
        Ok(output)
    }
}
