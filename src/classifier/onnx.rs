//! ONNX Runtime による推論バックエンド（`onnx` feature）
use std::path::Path;

use ndarray::Array2;
use ort::session::Session;
use ort::value::Tensor;
use parking_lot::Mutex;
use tracing::info;

use super::{ClassifierError, Head, HeadLogits, InferenceBackend};
use crate::audio_pipeline::Waveform;
use crate::config::OnnxTensorNames;

pub struct OnnxBackend {
    // Session::run は &mut を要求するため排他する
    session: Mutex<Session>,
    names: OnnxTensorNames,
}

impl OnnxBackend {
    pub fn load(model_path: &Path, names: OnnxTensorNames) -> Result<Self, ClassifierError> {
        if !model_path.exists() {
            return Err(ClassifierError::Unavailable(format!(
                "model not found: {}",
                model_path.display()
            )));
        }

        let session = Session::builder()
            .and_then(|b| b.with_intra_threads(1))
            .and_then(|b| b.commit_from_file(model_path))
            .map_err(|e| ClassifierError::Unavailable(format!("failed to load model: {e}")))?;

        info!(model = %model_path.display(), "onnx model loaded");
        Ok(Self {
            session: Mutex::new(session),
            names,
        })
    }
}

impl InferenceBackend for OnnxBackend {
    fn infer(&self, waveform: &Waveform) -> Result<HeadLogits, ClassifierError> {
        // バッチサイズ 1 の [1, N] 入力
        let input = Array2::from_shape_vec((1, waveform.len()), waveform.samples().to_vec())
            .map_err(|e| ClassifierError::Backend {
                message: format!("input shape error: {e}"),
            })?;
        let tensor = Tensor::from_array(input).map_err(|e| ClassifierError::Backend {
            message: format!("tensor creation error: {e}"),
        })?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![self.names.input.as_str() => tensor])
            .map_err(|e| ClassifierError::Backend {
                message: format!("inference error: {e}"),
            })?;

        let mut logits = HeadLogits::default();
        for head in Head::ALL {
            let wanted = self.names.output(head);
            let value = outputs
                .iter()
                .find(|(name, _)| *name == wanted)
                .map(|(_, value)| value)
                .ok_or(ClassifierError::MissingHead { head })?;
            let (_shape, data) =
                value
                    .try_extract_tensor::<f32>()
                    .map_err(|e| ClassifierError::Backend {
                        message: format!("failed to extract {head} scores: {e}"),
                    })?;
            logits.insert(head, data.to_vec());
        }
        Ok(logits)
    }

    fn name(&self) -> &'static str {
        "onnx"
    }
}
