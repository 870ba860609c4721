//! 分類結果と種メタデータを1つの応答レコードにまとめる
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::classifier::{Prediction, UNKNOWN_LABEL};
use crate::metadata::{SpeciesMetadata, SpeciesMetadataProvider};

/// クライアントへ返す JSON レコード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// 種ラベル（ラベル表の値）
    pub species: String,
    pub common_name: String,
    pub scientific_name: String,
    pub identification_text: String,
    pub image_url: String,
    /// 種ヘッドの確率
    pub probability: f64,
    pub genus: String,
    pub genus_probability: f64,
    pub family: String,
    pub family_probability: f64,
    pub order: String,
    pub order_probability: f64,
}

pub struct ResultAssembler {
    metadata: Arc<dyn SpeciesMetadataProvider>,
}

impl ResultAssembler {
    pub fn new(metadata: Arc<dyn SpeciesMetadataProvider>) -> Self {
        Self { metadata }
    }

    /// メタデータ照会が失敗しても分類結果は返す
    pub async fn assemble(&self, prediction: &Prediction) -> ClassificationResult {
        let species = prediction.label.name.as_str();
        let metadata = if species == UNKNOWN_LABEL {
            SpeciesMetadata::not_found()
        } else {
            match self.metadata.lookup(species).await {
                Ok(found) => {
                    debug!(species, "metadata resolved");
                    found
                }
                Err(err) => {
                    warn!(species, error = %err, "metadata lookup failed");
                    SpeciesMetadata::not_found()
                }
            }
        };

        ClassificationResult {
            species: species.to_string(),
            common_name: metadata.common_name,
            scientific_name: metadata.scientific_name,
            identification_text: metadata.identification_text,
            image_url: metadata.image_url,
            probability: prediction.label.probability,
            genus: prediction.genus.name.clone(),
            genus_probability: prediction.genus.probability,
            family: prediction.family.name.clone(),
            family_probability: prediction.family.probability,
            order: prediction.order.name.clone(),
            order_probability: prediction.order.probability,
        }
    }
}
