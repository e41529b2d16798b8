#![forbid(unsafe_code)]

use std::collections::HashMap;
use std::fmt;

use crate::asset::{AssetMetadata, AssetType};
use crate::cook::context::CookContext;
use crate::cook::error::CookResult;
use crate::cook::{level, material, mesh, script, texture};

/// Transforms one source asset's bytes into one cooked artifact.
pub type CookFn = fn(&[u8], &AssetMetadata, &CookContext<'_>) -> CookResult<Vec<u8>>;

#[derive(Clone, Copy)]
pub struct Cooker {
    pub asset_type: AssetType,
    /// Replaces the source extension in the cooked output path.
    pub extension: &'static str,
    pub func: CookFn,
}

impl Cooker {
    pub const fn new(asset_type: AssetType, extension: &'static str, func: CookFn) -> Self {
        Self {
            asset_type,
            extension,
            func,
        }
    }

    pub fn cooked_extension(&self) -> &'static str {
        self.extension
    }

    pub fn cook(
        &self,
        source: &[u8],
        metadata: &AssetMetadata,
        ctx: &CookContext<'_>,
    ) -> CookResult<Vec<u8>> {
        (self.func)(source, metadata, ctx)
    }
}

impl fmt::Debug for Cooker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cooker")
            .field("asset_type", &self.asset_type)
            .field("extension", &self.extension)
            .finish()
    }
}

/// Lookup table from asset type to its cooker.
#[derive(Debug, Clone)]
pub struct CookerTable {
    cookers: HashMap<AssetType, Cooker>,
}

impl CookerTable {
    /// A table with no cookers registered.
    pub fn empty() -> Self {
        Self {
            cookers: HashMap::new(),
        }
    }

    /// Registers `cooker`, replacing any previous cooker for the same type.
    pub fn register(&mut self, cooker: Cooker) -> Option<Cooker> {
        self.cookers.insert(cooker.asset_type, cooker)
    }

    pub fn get(&self, asset_type: AssetType) -> Option<&Cooker> {
        self.cookers.get(&asset_type)
    }

    pub fn len(&self) -> usize {
        self.cookers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookers.is_empty()
    }
}

impl Default for CookerTable {
    /// Built-in cookers. Prefabs have none and are skipped by the driver.
    fn default() -> Self {
        let mut table = Self::empty();
        table.register(Cooker::new(AssetType::Texture, texture::EXTENSION, texture::cook));
        table.register(Cooker::new(AssetType::Mesh, mesh::EXTENSION, mesh::cook));
        table.register(Cooker::new(AssetType::Material, material::EXTENSION, material::cook));
        table.register(Cooker::new(AssetType::Scene, level::EXTENSION, level::cook));
        table.register(Cooker::new(AssetType::Script, script::EXTENSION, script::cook));
        table
    }
}
