#![forbid(unsafe_code)]

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PakError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("walk: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("invalid pak: {0}")]
    Invalid(String),

    #[error("path is outside input dir: {0}")]
    Outside(String),

    #[error("cannot read {path}: {source}")]
    Source {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("compression failed for {path}: {source}")]
    Compression {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no entry {0}")]
    NotFound(String),

    #[error("hash mismatch for {0}")]
    HashMismatch(String),
}

impl PakError {
    /// True when only the entry being added is affected and the archive
    /// stream is still consistent.
    pub fn is_entry_error(&self) -> bool {
        matches!(
            self,
            Self::Source { .. } | Self::Compression { .. } | Self::Invalid(_)
        )
    }
}

pub type PakResult<T> = Result<T, PakError>;
