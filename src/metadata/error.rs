use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("no metadata for species {species}")]
    NotFound { species: String },
    #[error("metadata request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid metadata base URL {url:?}: {message}")]
    InvalidUrl { url: String, message: String },
    #[error("metadata service returned status {status}")]
    Status { status: u16 },
    #[error("failed to read species catalog {path:?}: {source}")]
    CatalogIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse species catalog {path:?}: {source}")]
    CatalogParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}
