#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::asset::AssetHandle;
use crate::cook::error::CookResult;

/// File name of the manifest at the root of the cooked tree.
pub const MANIFEST_FILE_NAME: &str = "AssetManifest.json";

/// Handle -> cooked path, relative to the cooked root. Written whole on every cook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookManifest {
    #[serde(rename = "Assets")]
    assets: BTreeMap<String, String>,
}

impl CookManifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, handle: AssetHandle, cooked_path: impl Into<String>) {
        self.assets.insert(handle.to_string(), cooked_path.into());
    }

    pub fn get(&self, handle: AssetHandle) -> Option<&str> {
        self.assets.get(&handle.to_string()).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.assets.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn save(&self, path: &Path) -> CookResult<()> {
        let mut bytes = serde_json::to_vec_pretty(self)?;
        bytes.push(b'\n');
        std::fs::write(path, bytes)?;
        Ok(())
    }

    pub fn load(path: &Path) -> CookResult<Self> {
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn from_slice(bytes: &[u8]) -> CookResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
