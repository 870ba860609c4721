/// 分類器入力となる固定長・固定レートのモノラル波形
///
/// 長さは常に窓のサンプル数と一致する（短ければ末尾を無音で埋め、長ければ先頭から切り出す）。
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    samples: Vec<f32>,
    sample_rate_hz: u32,
}

impl Waveform {
    /// サンプル列を窓長に合わせて波形を作る
    pub fn fitted(samples: Vec<f32>, sample_rate_hz: u32, window_samples: usize) -> Self {
        Self {
            samples: fit_to_window(samples, window_samples),
            sample_rate_hz,
        }
    }

    /// 全サンプルが 0 の波形
    pub fn silent(sample_rate_hz: u32, window_samples: usize) -> Self {
        Self {
            samples: vec![0.0; window_samples],
            sample_rate_hz,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }
}

/// 窓長への切り詰め / ゼロ埋め（末尾側）
pub fn fit_to_window(mut samples: Vec<f32>, window_samples: usize) -> Vec<f32> {
    samples.resize(window_samples, 0.0);
    samples
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_input_is_padded_at_the_end() {
        let fitted = fit_to_window(vec![0.5; 3], 6);
        assert_eq!(fitted, vec![0.5, 0.5, 0.5, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn long_input_keeps_leading_samples() {
        let fitted = fit_to_window((0..10).map(|i| i as f32).collect(), 4);
        assert_eq!(fitted, vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn silent_waveform_has_window_length() {
        let waveform = Waveform::silent(32_000, 160_000);
        assert_eq!(waveform.len(), 160_000);
        assert!(waveform.samples().iter().all(|s| *s == 0.0));
    }
}
