use std::path::PathBuf;

use thiserror::Error;

/// Failure during the bulk sprite load.  Any single failure aborts the whole
/// load; there is no partial asset set.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read sprite {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode sprite {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("sprite `{0}` is not part of the loaded asset set")]
    Missing(String),
    #[error("animation set `{0}` has no frames")]
    EmptyRole(&'static str),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse RON: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("level table is empty")]
    NoLevels,
}
