#![forbid(unsafe_code)]

use std::path::PathBuf;
use thiserror::Error;

use crate::asset::{AssetHandle, AssetType};

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("walk: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("sidecar {path}: {source}")]
    Sidecar {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("not an importable asset: {0}")]
    Unsupported(PathBuf),

    #[error("path is outside the source root: {0}")]
    Outside(PathBuf),

    #[error("sidecar {path} holds invalid identity (handle {handle}, type {asset_type})")]
    InvalidSidecar {
        path: PathBuf,
        handle: AssetHandle,
        asset_type: AssetType,
    },

    #[error("invalid handle {0}")]
    InvalidHandle(AssetHandle),

    #[error("handle {handle} already belongs to {owner}")]
    HandleInUse { handle: AssetHandle, owner: String },

    #[error("registry has no source root; call initialize first")]
    NotInitialized,
}

pub type AssetResult<T> = Result<T, AssetError>;
