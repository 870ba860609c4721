/// インターリーブされた多チャネル信号を平均してモノラルに追記する
pub fn downmix_interleaved(samples: &[f32], channels: usize, out: &mut Vec<f32>) {
    if channels == 0 {
        return;
    }

    if channels == 1 {
        out.extend_from_slice(samples);
        return;
    }

    out.reserve(samples.len() / channels);
    for frame in samples.chunks_exact(channels) {
        let sum: f32 = frame.iter().sum();
        out.push(sum / channels as f32);
    }
}

/// 二乗平均平方根（無音判定やダミー推論で使用）
pub fn root_mean_square(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum = samples.iter().map(|s| s * s).sum::<f32>();
    (sum / samples.len() as f32).sqrt()
}
