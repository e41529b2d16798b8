#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::asset::error::{AssetError, AssetResult};
use crate::asset::{AssetHandle, AssetType};

/// Suffix appended to an asset's file name to form its sidecar.
pub const SIDECAR_EXTENSION: &str = "meta";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetMetadata {
    pub handle: AssetHandle,
    pub asset_type: AssetType,
    /// Relative to the source root, always `/`-separated.
    pub file_path: String,
}

impl AssetMetadata {
    pub fn is_valid(&self) -> bool {
        self.handle.is_valid() && self.asset_type != AssetType::None
    }
}

/// On-disk identity record stored beside each source asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sidecar {
    #[serde(rename = "Handle")]
    pub handle: AssetHandle,
    #[serde(rename = "Type")]
    pub asset_type: AssetType,
}

impl Sidecar {
    pub fn is_valid(&self) -> bool {
        self.handle.is_valid() && self.asset_type != AssetType::None
    }

    pub fn load(path: &Path) -> AssetResult<Self> {
        let bytes = std::fs::read(path)?;
        serde_json::from_slice(&bytes).map_err(|source| AssetError::Sidecar {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> AssetResult<()> {
        let mut bytes = serde_json::to_vec_pretty(self).map_err(|source| AssetError::Sidecar {
            path: path.to_path_buf(),
            source,
        })?;
        bytes.push(b'\n');
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

/// `textures/hero.png` -> `textures/hero.png.meta`
pub fn sidecar_path(asset: &Path) -> PathBuf {
    let mut name: OsString = asset.file_name().map(OsString::from).unwrap_or_default();
    name.push(".");
    name.push(SIDECAR_EXTENSION);
    asset.with_file_name(name)
}

pub(crate) fn is_sidecar(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(SIDECAR_EXTENSION))
}
