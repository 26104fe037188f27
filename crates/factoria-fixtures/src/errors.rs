use std::io;
use std::path::PathBuf;

use factoria_core::FactoryError;
use thiserror::Error;

/// Why a fixture path was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidPathReason {
    #[error("missing filename")]
    MissingFileName,
    #[error("path is not absolute")]
    NotAbsolute,
    #[error("invalid file extension {0}, only .json is supported")]
    InvalidExtension(String),
}

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("[factoria] invalid fixture path {path:?}: {reason}")]
    InvalidPath {
        path: PathBuf,
        reason: InvalidPathReason,
    },
    #[error("[factoria] error reading file {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("[factoria] error writing file {path:?}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("[factoria] fixture file {path:?} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("[factoria] could not encode fixture {path:?}: {source}")]
    Encode {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("[factoria] fixture {path:?} does not hold a batch")]
    NotABatch { path: PathBuf },
    #[error(transparent)]
    Build(#[from] FactoryError),
    #[error("[factoria] fixture task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("[factoria] invalid fixture settings: {0}")]
    Settings(#[from] toml::de::Error),
    #[error("[factoria] invalid fixture settings: {0}")]
    InvalidSettings(String),
    #[error("[factoria] error reading settings {path:?}: {source}")]
    SettingsIo { path: PathBuf, source: io::Error },
}

impl FixtureError {
    pub(crate) fn invalid_path(path: impl Into<PathBuf>, reason: InvalidPathReason) -> Self {
        FixtureError::InvalidPath {
            path: path.into(),
            reason,
        }
    }
}

pub type Result<T> = std::result::Result<T, FixtureError>;
