//! 1 要求分の処理（正規化 → 分類 → 結果組み立て）
//!
//! デコードと推論は CPU を占有するため blocking プールで実行し、全体を要求タイムアウトで囲みます。
//! タイムアウト後も blocking ジョブは止められないので、同時実行数はジョブ枠で別に制限します。
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::assembler::{ClassificationResult, ResultAssembler};
use crate::audio_pipeline::{AudioError, AudioNormalizer};
use crate::classifier::{ClassifierError, MultiHeadClassifier};
use crate::config::ConfigSet;
use crate::metadata::{self, MetadataError};
use crate::transport::{ErrorKind, PayloadProcessor};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("audio decode failed: {0}")]
    Audio(#[from] AudioError),
    #[error("inference failed: {0}")]
    Classifier(#[from] ClassifierError),
    #[error("metadata setup failed: {0}")]
    Metadata(#[from] MetadataError),
    #[error("classification exceeded {limit_ms} ms")]
    Timeout { limit_ms: u64 },
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl PipelineError {
    /// エラー応答の種別
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Audio(_) => ErrorKind::Decode,
            PipelineError::Classifier(_) => ErrorKind::Inference,
            PipelineError::Timeout { .. } => ErrorKind::Timeout,
            PipelineError::Metadata(_) | PipelineError::Internal { .. } => ErrorKind::Internal,
        }
    }
}

pub struct ClassificationPipeline {
    normalizer: Arc<AudioNormalizer>,
    classifier: Arc<MultiHeadClassifier>,
    assembler: ResultAssembler,
    request_timeout: Duration,
    /// 実行中の blocking ジョブ数の上限（ジョブ終了まで枠を返さない）
    job_slots: Arc<Semaphore>,
}

impl ClassificationPipeline {
    pub fn new(
        normalizer: AudioNormalizer,
        classifier: MultiHeadClassifier,
        assembler: ResultAssembler,
        request_timeout: Duration,
        max_concurrent_jobs: usize,
    ) -> Self {
        Self {
            normalizer: Arc::new(normalizer),
            classifier: Arc::new(classifier),
            assembler,
            request_timeout,
            job_slots: Arc::new(Semaphore::new(max_concurrent_jobs.max(1))),
        }
    }

    /// 設定一式からラベル表・バックエンド・メタデータ照会を初期化する
    pub fn from_config(config: &ConfigSet) -> Result<Self, PipelineError> {
        let normalizer = AudioNormalizer::new(config.audio.clone());
        let classifier =
            MultiHeadClassifier::from_config(&config.classifier, config.audio.target_samples())?;
        let metadata = metadata::provider_from_config(&config.metadata)?;
        info!(
            backend = classifier.backend_name(),
            labels = classifier.labels().table(crate::classifier::Head::Label).len(),
            "classification pipeline ready"
        );
        Ok(Self::new(
            normalizer,
            classifier,
            ResultAssembler::new(metadata),
            config.classifier.request_timeout(),
            config.server.max_connections,
        ))
    }

    pub async fn process(&self, payload: Vec<u8>) -> Result<ClassificationResult, PipelineError> {
        let started = Instant::now();
        let normalizer = self.normalizer.clone();
        let classifier = self.classifier.clone();
        let job_slots = self.job_slots.clone();

        // 枠待ちも要求タイムアウトに含める
        let job = async move {
            let slot = job_slots
                .acquire_owned()
                .await
                .map_err(|_| PipelineError::Internal {
                    message: "job limiter closed".to_string(),
                })?;
            tokio::task::spawn_blocking(move || {
                let _slot = slot;
                let format = normalizer.detect_format(&payload);
                debug!(%format, bytes = payload.len(), "audio format detected");
                let waveform = normalizer.normalize(payload, format)?;
                let prediction = classifier.classify(&waveform)?;
                Ok::<_, PipelineError>(prediction)
            })
            .await
            .map_err(|e| PipelineError::Internal {
                message: format!("classification task failed: {e}"),
            })?
        };

        let prediction = timeout(self.request_timeout, job)
            .await
            .map_err(|_| {
                warn!(
                    limit_ms = self.request_timeout.as_millis() as u64,
                    "classification timed out"
                );
                PipelineError::Timeout {
                    limit_ms: self.request_timeout.as_millis() as u64,
                }
            })??;

        let result = self.assembler.assemble(&prediction).await;
        info!(
            species = %result.species,
            probability = result.probability,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "classification complete"
        );
        Ok(result)
    }
}

#[async_trait]
impl PayloadProcessor for ClassificationPipeline {
    async fn process(&self, payload: Vec<u8>) -> Result<ClassificationResult, PipelineError> {
        ClassificationPipeline::process(self, payload).await
    }
}
