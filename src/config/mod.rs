//! 設定モジュール（YAML 読み込み）
//!
//! `ConfigSet` は設定ディレクトリ配下の複数YAMLファイルを読み込み、
//! サーバ/クライアント/音声処理/分類器/メタデータの設定値を型安全に提供します。
mod audio;
mod classifier;
mod client;
mod error;
mod metadata;
mod server;

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

pub use audio::*;
pub use classifier::*;
pub use client::*;
pub use error::ConfigError;
pub use metadata::*;
pub use server::*;

/// 設定ディレクトリを指す環境変数名
pub const CONFIG_DIR_ENV: &str = "BIRD_INFERENCE_CONFIG_DIR";

/// すべての設定をひとまとめにした構造体
#[derive(Debug, Clone)]
pub struct ConfigSet {
    pub server: ServerConfig,
    pub client: ClientConfig,
    pub audio: AudioProcessingConfig,
    pub classifier: ClassifierConfig,
    pub metadata: MetadataConfig,
    root: PathBuf,
}

impl ConfigSet {
    /// ルートディレクトリから各YAMLを読み込み
    pub fn load_from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, ConfigError> {
        let root = dir.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(ConfigError::MissingRoot(root));
        }

        let server = load_yaml(root.join("server.yaml"))?;
        let client = load_yaml(root.join("client.yaml"))?;
        let audio = load_yaml(root.join("audio_processing.yaml"))?;
        let classifier = load_yaml(root.join("classifier.yaml"))?;
        let metadata = load_yaml(root.join("metadata.yaml"))?;

        let config = Self {
            server,
            client,
            audio,
            classifier,
            metadata,
            root,
        };
        config.validate()?;
        Ok(config)
    }

    /// 環境変数（未設定時は `config/`）から設定を読み込み
    pub fn load_from_env() -> Result<Self, ConfigError> {
        let dir = std::env::var(CONFIG_DIR_ENV).unwrap_or_else(|_| "config".to_string());
        Self::load_from_dir(dir)
    }

    /// 設定ルートのパス（デバッグ等に利用）
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 値の整合性チェック（YAMLとして正しくても意味的に使えない値を弾く）
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.client.validate()?;
        self.audio.validate()?;
        self.classifier.validate()?;
        Ok(())
    }
}

/// YAMLファイルを読み込み、型 `T` へデシリアライズ
fn load_yaml<T>(path: PathBuf) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let data = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    serde_yaml::from_str(&data).map_err(|source| ConfigError::Parse { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_root_is_reported() {
        let err = ConfigSet::load_from_dir("does/not/exist").unwrap_err();
        assert!(matches!(err, ConfigError::MissingRoot(_)));
    }

    #[test]
    fn broken_yaml_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("server.yaml"), "bind_addr: [unterminated").unwrap();
        let err = ConfigSet::load_from_dir(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConfigSet::load_from_dir(dir.path()).unwrap_err();
        match err {
            ConfigError::Io { path, .. } => assert!(path.ends_with("server.yaml")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
