//! 種メタデータ（一般名・学名・解説・画像URL）の照会
//!
//! 照会の失敗は分類結果を妨げないため、呼び出し側は `SpeciesMetadata::not_found()` で代替します。
mod catalog;
mod error;
mod http;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{MetadataConfig, MetadataProviderKind};

pub use catalog::CatalogMetadata;
pub use error::MetadataError;
pub use http::HttpMetadata;

/// メタデータが得られなかった項目に入れる値
pub const NOT_FOUND: &str = "Not found";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesMetadata {
    pub common_name: String,
    pub scientific_name: String,
    #[serde(alias = "description")]
    pub identification_text: String,
    pub image_url: String,
}

impl SpeciesMetadata {
    pub fn not_found() -> Self {
        Self {
            common_name: NOT_FOUND.to_string(),
            scientific_name: NOT_FOUND.to_string(),
            identification_text: NOT_FOUND.to_string(),
            image_url: NOT_FOUND.to_string(),
        }
    }
}

#[async_trait]
pub trait SpeciesMetadataProvider: Send + Sync {
    async fn lookup(&self, species: &str) -> Result<SpeciesMetadata, MetadataError>;
}

/// 照会を行わないプロバイダ
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMetadata;

#[async_trait]
impl SpeciesMetadataProvider for NoMetadata {
    async fn lookup(&self, species: &str) -> Result<SpeciesMetadata, MetadataError> {
        Err(MetadataError::NotFound {
            species: species.to_string(),
        })
    }
}

/// 設定に応じたプロバイダを作成
pub fn provider_from_config(
    config: &MetadataConfig,
) -> Result<Arc<dyn SpeciesMetadataProvider>, MetadataError> {
    Ok(match config.provider {
        MetadataProviderKind::None => Arc::new(NoMetadata),
        MetadataProviderKind::Catalog => Arc::new(CatalogMetadata::load(&config.catalog_path)?),
        MetadataProviderKind::Http => Arc::new(HttpMetadata::new(config)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_is_accepted_as_identification_text() {
        let metadata: SpeciesMetadata = serde_json::from_str(
            r#"{"common_name":"Blue Jay","scientific_name":"Cyanocitta cristata","description":"Crested.","image_url":"u"}"#,
        )
        .unwrap();
        assert_eq!(metadata.identification_text, "Crested.");
    }

    #[tokio::test]
    async fn no_metadata_always_misses() {
        assert!(matches!(
            NoMetadata.lookup("amerob").await,
            Err(MetadataError::NotFound { .. })
        ));
    }
}
