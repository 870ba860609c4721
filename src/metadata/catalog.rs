use std::collections::HashMap;
use std::fs;
use std::path::Path;

use async_trait::async_trait;
use tracing::info;

use super::{MetadataError, SpeciesMetadata, SpeciesMetadataProvider};

/// YAML のカタログ（種コード → メタデータ）から引く
#[derive(Debug, Clone, Default)]
pub struct CatalogMetadata {
    entries: HashMap<String, SpeciesMetadata>,
}

impl CatalogMetadata {
    pub fn load(path: &Path) -> Result<Self, MetadataError> {
        let data = fs::read_to_string(path).map_err(|source| MetadataError::CatalogIo {
            path: path.to_path_buf(),
            source,
        })?;
        let entries: HashMap<String, SpeciesMetadata> =
            serde_yaml::from_str(&data).map_err(|source| MetadataError::CatalogParse {
                path: path.to_path_buf(),
                source,
            })?;
        info!(path = %path.display(), species = entries.len(), "species catalog loaded");
        Ok(Self { entries })
    }

    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, SpeciesMetadata)>,
    {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl SpeciesMetadataProvider for CatalogMetadata {
    async fn lookup(&self, species: &str) -> Result<SpeciesMetadata, MetadataError> {
        self.entries
            .get(species)
            .cloned()
            .ok_or_else(|| MetadataError::NotFound {
                species: species.to_string(),
            })
    }
}
