use std::path::PathBuf;

use thiserror::Error;

use crate::sources::github::GithubError;

#[derive(Debug, Error)]
pub enum UpdaterError {
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),
    #[error("failed to read metadata for '{url}': {reason}")]
    Metadata { url: String, reason: String },
    #[error("failed to parse manifest at {path:?}: {source}")]
    ManifestParse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid manifest: {0}")]
    ManifestShape(String),
    #[error("failed to write manifest to {path:?}: {source}")]
    ManifestWrite {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("'{0}' does not contain a version in X.Y.Z format")]
    VersionFormat(String),
    #[error("task join error: {0}")]
    TaskJoinError(#[from] tokio::task::JoinError),
    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("GitHub error: {0}")]
    GitHub(#[from] GithubError),
}

pub type UpdaterResult<T> = Result<T, UpdaterError>;
