#![forbid(unsafe_code)]

use std::path::PathBuf;
use thiserror::Error;

use crate::asset::AssetError;

#[derive(Debug, Error)]
pub enum CookError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("image: {0}")]
    Image(#[from] image::ImageError),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("registry: {0}")]
    Registry(#[from] AssetError),

    #[error("parse: {0}")]
    Parse(String),

    #[error("unsupported source format: {0}")]
    Unsupported(String),

    #[error("bad {kind} magic: {found:?}")]
    BadMagic { kind: &'static str, found: [u8; 4] },

    #[error("unsupported {kind} version {version}")]
    BadVersion { kind: &'static str, version: u32 },

    #[error("invalid {kind} artifact: {reason}")]
    Invalid { kind: &'static str, reason: String },

    #[error("cannot use output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("worker pool: {0}")]
    Pool(String),
}

pub type CookResult<T> = Result<T, CookError>;
