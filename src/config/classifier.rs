//! 分類器（推論バックエンドとラベル表）の設定
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::classifier::Head;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// 決定的なダミー出力（開発・テスト用）
    Mock,
    /// ONNX Runtime（`onnx` feature が必要）
    Onnx,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub backend: BackendKind,
    #[serde(default)]
    pub model_path: String,
    pub labels: LabelFiles,
    /// 出力インデックスに加算してからラベル表を引く（0 で直接対応）
    #[serde(default)]
    pub label_index_offset: i64,
    pub request_timeout_ms: u64,
    #[serde(default)]
    pub onnx: OnnxTensorNames,
}

impl ClassifierConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::invalid(
                "classifier.request_timeout_ms",
                "must be positive",
            ));
        }
        if self.backend == BackendKind::Onnx && self.model_path.is_empty() {
            return Err(ConfigError::invalid(
                "classifier.model_path",
                "required for the onnx backend",
            ));
        }
        Ok(())
    }
}

/// 4つのヘッドそれぞれのラベル表ファイル
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelFiles {
    pub dir: PathBuf,
    pub label: String,
    pub genus: String,
    pub family: String,
    pub order: String,
}

impl LabelFiles {
    pub fn path(&self, head: Head) -> PathBuf {
        let file = match head {
            Head::Label => &self.label,
            Head::Genus => &self.genus,
            Head::Family => &self.family,
            Head::Order => &self.order,
        };
        self.dir.join(file)
    }
}

/// ONNXモデルの入出力テンソル名
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnnxTensorNames {
    pub input: String,
    pub label: String,
    pub genus: String,
    pub family: String,
    pub order: String,
}

impl OnnxTensorNames {
    pub fn output(&self, head: Head) -> &str {
        match head {
            Head::Label => &self.label,
            Head::Genus => &self.genus,
            Head::Family => &self.family,
            Head::Order => &self.order,
        }
    }
}

impl Default for OnnxTensorNames {
    fn default() -> Self {
        Self {
            input: "waveform".to_string(),
            label: "label".to_string(),
            genus: "genus".to_string(),
            family: "family".to_string(),
            order: "order".to_string(),
        }
    }
}
