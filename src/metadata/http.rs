use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::{StatusCode, Url};
use tracing::debug;

use super::{MetadataError, SpeciesMetadata, SpeciesMetadataProvider};
use crate::config::MetadataConfig;

/// JSON の種情報サービス（`GET {base_url}/{species}`）から引く
#[derive(Debug)]
pub struct HttpMetadata {
    client: reqwest::Client,
    base_url: Url,
    cache: Mutex<LookupCache>,
}

impl HttpMetadata {
    pub fn new(config: &MetadataConfig) -> Result<Self, MetadataError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| MetadataError::InvalidUrl {
            url: config.base_url.clone(),
            message: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(MetadataError::InvalidUrl {
                url: config.base_url.clone(),
                message: "cannot be used as a base URL".to_string(),
            });
        }
        let client = reqwest::Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            base_url,
            cache: Mutex::new(LookupCache::new(config.cache_capacity)),
        })
    }

    /// 種ラベルは1つのパス要素としてエスケープして付け足す
    fn url_for(&self, species: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(species);
        }
        url
    }
}

#[async_trait]
impl SpeciesMetadataProvider for HttpMetadata {
    async fn lookup(&self, species: &str) -> Result<SpeciesMetadata, MetadataError> {
        if let Some(hit) = self.cache.lock().get(species) {
            debug!(species, "metadata cache hit");
            return Ok(hit);
        }

        let response = self.client.get(self.url_for(species)).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(MetadataError::NotFound {
                    species: species.to_string(),
                })
            }
            status if !status.is_success() => {
                return Err(MetadataError::Status {
                    status: status.as_u16(),
                })
            }
            _ => {}
        }

        let metadata: SpeciesMetadata = response.json().await?;
        self.cache.lock().insert(species.to_string(), metadata.clone());
        Ok(metadata)
    }
}

/// 成功した照会結果だけを保持する FIFO キャッシュ
#[derive(Debug)]
struct LookupCache {
    capacity: usize,
    entries: HashMap<String, SpeciesMetadata>,
    order: VecDeque<String>,
}

impl LookupCache {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    fn get(&self, species: &str) -> Option<SpeciesMetadata> {
        self.entries.get(species).cloned()
    }

    fn insert(&mut self, species: String, metadata: SpeciesMetadata) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.contains_key(&species) {
            self.entries.insert(species, metadata);
            return;
        }
        while self.entries.len() >= self.capacity {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
        self.order.push_back(species.clone());
        self.entries.insert(species, metadata);
    }
}
