//! マルチヘッド分類器アダプタ
//!
//! 推論バックエンドは `InferenceBackend` トレイトの背後に隠し、
//! ここではヘッドごとの softmax → argmax → ラベル表引きだけを行います。
mod error;
mod labels;
mod math;
mod mock;
#[cfg(feature = "onnx")]
mod onnx;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::audio_pipeline::Waveform;
use crate::config::{BackendKind, ClassifierConfig};

pub use error::ClassifierError;
pub use labels::{LabelSet, LabelTable, UNKNOWN_LABEL};
pub use math::{argmax, softmax};
pub use mock::MockBackend;
#[cfg(feature = "onnx")]
pub use onnx::OnnxBackend;

/// 分類ヘッド
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Head {
    /// 種
    Label,
    Genus,
    Family,
    Order,
}

impl Head {
    pub const ALL: [Head; 4] = [Head::Label, Head::Genus, Head::Family, Head::Order];

    pub fn as_str(&self) -> &'static str {
        match self {
            Head::Label => "label",
            Head::Genus => "genus",
            Head::Family => "family",
            Head::Order => "order",
        }
    }
}

impl fmt::Display for Head {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// バックエンドが返すヘッドごとの生スコア
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeadLogits {
    scores: HashMap<Head, Vec<f32>>,
}

impl HeadLogits {
    pub fn insert(&mut self, head: Head, scores: Vec<f32>) {
        self.scores.insert(head, scores);
    }

    pub fn with(mut self, head: Head, scores: Vec<f32>) -> Self {
        self.insert(head, scores);
        self
    }

    pub fn get(&self, head: Head) -> Option<&[f32]> {
        self.scores.get(&head).map(Vec::as_slice)
    }
}

/// 推論バックエンド（1 × N の波形を受け取り、4ヘッドのスコアを返す）
pub trait InferenceBackend: Send + Sync {
    fn infer(&self, waveform: &Waveform) -> Result<HeadLogits, ClassifierError>;

    fn name(&self) -> &'static str;
}

/// 1ヘッド分の予測
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadPrediction {
    pub head: Head,
    pub class_index: usize,
    pub name: String,
    pub probability: f64,
}

/// 4ヘッドの予測結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub label: HeadPrediction,
    pub genus: HeadPrediction,
    pub family: HeadPrediction,
    pub order: HeadPrediction,
}

impl Prediction {
    pub fn head(&self, head: Head) -> &HeadPrediction {
        match head {
            Head::Label => &self.label,
            Head::Genus => &self.genus,
            Head::Family => &self.family,
            Head::Order => &self.order,
        }
    }
}

/// バックエンドとラベル表を束ねた分類器（プロセス全体で共有・読み取り専用）
#[derive(Clone)]
pub struct MultiHeadClassifier {
    backend: Arc<dyn InferenceBackend>,
    labels: Arc<LabelSet>,
    index_offset: i64,
    expected_samples: usize,
}

impl MultiHeadClassifier {
    pub fn new(
        backend: Arc<dyn InferenceBackend>,
        labels: Arc<LabelSet>,
        index_offset: i64,
        expected_samples: usize,
    ) -> Self {
        Self {
            backend,
            labels,
            index_offset,
            expected_samples,
        }
    }

    /// 設定からラベル表とバックエンドを読み込む
    pub fn from_config(
        config: &ClassifierConfig,
        expected_samples: usize,
    ) -> Result<Self, ClassifierError> {
        let labels = Arc::new(LabelSet::load(config)?);
        let backend = backend_from_config(config, &labels)?;
        Ok(Self::new(
            backend,
            labels,
            config.label_index_offset,
            expected_samples,
        ))
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn classify(&self, waveform: &Waveform) -> Result<Prediction, ClassifierError> {
        if waveform.len() != self.expected_samples {
            return Err(ClassifierError::InputShape {
                expected: self.expected_samples,
                actual: waveform.len(),
            });
        }

        let logits = self.backend.infer(waveform)?;
        Ok(Prediction {
            label: self.predict_head(&logits, Head::Label)?,
            genus: self.predict_head(&logits, Head::Genus)?,
            family: self.predict_head(&logits, Head::Family)?,
            order: self.predict_head(&logits, Head::Order)?,
        })
    }

    fn predict_head(&self, logits: &HeadLogits, head: Head) -> Result<HeadPrediction, ClassifierError> {
        let scores = logits.get(head).ok_or(ClassifierError::MissingHead { head })?;
        if scores.is_empty() {
            return Err(ClassifierError::EmptyHead { head });
        }
        if scores.iter().any(|s| !s.is_finite()) {
            return Err(ClassifierError::NonFinite { head });
        }

        let probabilities = softmax(scores);
        let class_index = argmax(&probabilities).ok_or(ClassifierError::EmptyHead { head })?;
        let name = self
            .labels
            .table(head)
            .resolve(class_index as i64 + self.index_offset)
            .to_string();
        let probability = probabilities[class_index];

        debug!(%head, class_index, %name, probability, "head predicted");
        Ok(HeadPrediction {
            head,
            class_index,
            name,
            probability,
        })
    }
}

impl fmt::Debug for MultiHeadClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiHeadClassifier")
            .field("backend", &self.backend.name())
            .field("index_offset", &self.index_offset)
            .field("expected_samples", &self.expected_samples)
            .finish()
    }
}

/// 設定に応じたバックエンドを作成
pub fn backend_from_config(
    config: &ClassifierConfig,
    labels: &LabelSet,
) -> Result<Arc<dyn InferenceBackend>, ClassifierError> {
    match config.backend {
        BackendKind::Mock => Ok(Arc::new(MockBackend::for_labels(labels))),
        #[cfg(feature = "onnx")]
        BackendKind::Onnx => Ok(Arc::new(OnnxBackend::load(
            std::path::Path::new(&config.model_path),
            config.onnx.clone(),
        )?)),
        #[cfg(not(feature = "onnx"))]
        BackendKind::Onnx => Err(ClassifierError::Unavailable(
            "built without the onnx feature".to_string(),
        )),
    }
}
