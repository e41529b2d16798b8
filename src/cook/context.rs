#![forbid(unsafe_code)]

use log::warn;
use std::path::Path;

use crate::asset::{AssetHandle, AssetRegistry};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookOptions {
    /// Target platform name, recorded in the cooked project.
    pub platform: String,
    /// Worker threads for per-asset cooking; 0 uses every core.
    pub jobs: usize,
}

impl Default for CookOptions {
    fn default() -> Self {
        Self {
            platform: "desktop".into(),
            jobs: 0,
        }
    }
}

/// Read-only view handed to every cooker.
#[derive(Debug, Clone, Copy)]
pub struct CookContext<'a> {
    pub registry: &'a AssetRegistry,
    pub source_root: &'a Path,
    pub platform: &'a str,
}

impl<'a> CookContext<'a> {
    pub fn new(registry: &'a AssetRegistry, source_root: &'a Path, platform: &'a str) -> Self {
        Self {
            registry,
            source_root,
            platform,
        }
    }

    /// Resolves an optional source-relative reference to a handle; unknown paths yield 0.
    pub fn resolve(&self, reference: Option<&str>, referrer: &str) -> AssetHandle {
        let Some(path) = reference.filter(|p| !p.is_empty()) else {
            return AssetHandle::INVALID;
        };
        match self.registry.metadata_by_path(path) {
            Some(md) => md.handle,
            None => {
                warn!("{referrer}: reference to unknown asset {path}");
                AssetHandle::INVALID
            }
        }
    }
}
