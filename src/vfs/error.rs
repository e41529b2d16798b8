#![forbid(unsafe_code)]

use std::path::PathBuf;
use thiserror::Error;

use crate::pak::PakError;

#[derive(Debug, Error)]
pub enum VfsError {
    #[error("mount target is neither a directory nor an archive: {0}")]
    MissingTarget(PathBuf),

    #[error("archive: {0}")]
    Pak(#[from] PakError),
}

pub type VfsResult<T> = Result<T, VfsError>;
