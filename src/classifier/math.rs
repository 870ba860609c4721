/// 数値的に安定な softmax（最大値を引いてから指数を取る）
///
/// 計算は f64 で行い、合計が 1 になるよう正規化する。
pub fn softmax(logits: &[f32]) -> Vec<f64> {
    let Some(max) = logits
        .iter()
        .map(|v| *v as f64)
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |m| m.max(v))))
    else {
        return Vec::new();
    };

    let exps: Vec<f64> = logits.iter().map(|v| (*v as f64 - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// 最大値のインデックス（同値なら小さいインデックスを優先）
pub fn argmax<T: PartialOrd + Copy>(values: &[T]) -> Option<usize> {
    let mut best: Option<(usize, T)> = None;
    for (index, value) in values.iter().copied().enumerate() {
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((index, value)),
        }
    }
    best.map(|(index, _)| index)
}
