use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataProviderKind {
    /// 照会しない（常に "Not found"）
    None,
    /// ローカルのYAMLカタログ
    Catalog,
    /// JSONを返す外部の種情報サービス
    Http,
}

/// 種メタデータ照会の設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataConfig {
    pub provider: MetadataProviderKind,
    #[serde(default)]
    pub catalog_path: PathBuf,
    #[serde(default)]
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

fn default_timeout_ms() -> u64 {
    3_000
}

fn default_cache_capacity() -> usize {
    512
}

impl MetadataConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            provider: MetadataProviderKind::None,
            catalog_path: PathBuf::new(),
            base_url: String::new(),
            timeout_ms: default_timeout_ms(),
            cache_capacity: default_cache_capacity(),
        }
    }
}
