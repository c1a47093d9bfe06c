use std::path::PathBuf;

use segmentation::SegmentationError;
use thiserror::Error;

use crate::store::AssetKind;

#[derive(Error, Debug)]
pub enum StudioError {
    #[error("Could not decode {kind}: {reason}")]
    AssetDecode { kind: AssetKind, reason: String },

    #[error("Export failed: {0}")]
    Export(String),

    #[error("An export is already in progress")]
    ExportInProgress,

    #[error("No rendered frame available")]
    NoFrame,

    #[error("No photograph loaded")]
    NoPhotograph,

    #[error("Segmentation has not finished yet")]
    SegmentationPending,

    #[error("Segmentation error: {0}")]
    Segmentation(#[from] SegmentationError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Unsupported config format for {0}; use .toml or .json")]
    UnsupportedConfigFormat(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, StudioError>;
