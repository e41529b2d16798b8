#![forbid(unsafe_code)]

use log::{debug, info, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::asset::error::{AssetError, AssetResult};
use crate::asset::metadata::{is_sidecar, sidecar_path, AssetMetadata, Sidecar};
use crate::asset::{AssetHandle, AssetType};
use crate::path::{relative_to, to_virtual};

/// Outcome counts of one registry scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Assets whose identity came from an existing sidecar.
    pub loaded: usize,
    /// Assets seen for the first time; a sidecar was written for each.
    pub imported: usize,
    /// Files with an unreadable, invalid or conflicting sidecar.
    pub skipped: usize,
}

/// In-memory cache of asset identities, rebuilt from sidecars on every scan.
///
/// The registry is an explicit value owned by whoever drives the pipeline;
/// there is no process-wide instance.
#[derive(Debug, Default)]
pub struct AssetRegistry {
    root: Option<PathBuf>,
    by_handle: HashMap<AssetHandle, AssetMetadata>,
    by_path: HashMap<String, AssetHandle>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans `source_root` recursively, loading existing sidecars and importing
    /// every importable file that lacks one.
    pub fn initialize(&mut self, source_root: &Path) -> AssetResult<ScanReport> {
        self.root = Some(source_root.to_path_buf());
        self.by_handle.clear();
        self.by_path.clear();

        let mut report = ScanReport::default();
        for ent in WalkDir::new(source_root).follow_links(false).sort_by_file_name() {
            let ent = ent?;
            if !ent.file_type().is_file() || is_sidecar(ent.path()) {
                continue;
            }
            let Some(rel) = relative_to(source_root, ent.path()) else {
                continue;
            };

            let sc_path = sidecar_path(ent.path());
            if sc_path.is_file() {
                match Sidecar::load(&sc_path) {
                    Ok(sc) if sc.is_valid() => {
                        if let Some(owner) = self.owner_of(sc.handle) {
                            warn!(
                                "skipping {rel}: handle {} is already owned by {owner}",
                                sc.handle
                            );
                            report.skipped += 1;
                            continue;
                        }
                        self.insert(sc.handle, sc.asset_type, rel);
                        report.loaded += 1;
                    }
                    Ok(sc) => {
                        warn!(
                            "skipping {rel}: sidecar holds invalid identity (handle {}, type {})",
                            sc.handle, sc.asset_type
                        );
                        report.skipped += 1;
                    }
                    Err(e) => {
                        warn!("skipping {rel}: {e}");
                        report.skipped += 1;
                    }
                }
                continue;
            }

            let asset_type = AssetType::from_path(ent.path());
            if asset_type == AssetType::None {
                debug!("ignoring {rel}: not an importable asset");
                continue;
            }
            let handle = self.mint_handle();
            match self.persist(ent.path(), handle, asset_type) {
                Ok(()) => {
                    debug!("imported {rel} as {asset_type} {handle}");
                    self.insert(handle, asset_type, rel);
                    report.imported += 1;
                }
                Err(e) => {
                    warn!("skipping {rel}: cannot write sidecar: {e}");
                    report.skipped += 1;
                }
            }
        }

        info!(
            "asset registry: {} loaded, {} imported, {} skipped under {}",
            report.loaded,
            report.imported,
            report.skipped,
            source_root.display()
        );
        Ok(report)
    }

    /// Imports a single file. A registered path keeps its handle and an
    /// existing sidecar is adopted as is; only a file with neither gets a new
    /// handle. A sidecar that cannot be trusted is reported and left untouched.
    pub fn import_asset(&mut self, path: &Path) -> AssetResult<AssetHandle> {
        let (abs, rel) = self.resolve(path)?;
        if let Some(handle) = self.by_path.get(&rel) {
            return Ok(*handle);
        }
        let sc_path = sidecar_path(&abs);
        if sc_path.is_file() {
            let sc = Sidecar::load(&sc_path)?;
            if !sc.is_valid() {
                return Err(AssetError::InvalidSidecar {
                    path: sc_path,
                    handle: sc.handle,
                    asset_type: sc.asset_type,
                });
            }
            if let Some(owner) = self.owner_of(sc.handle) {
                return Err(AssetError::HandleInUse {
                    handle: sc.handle,
                    owner: owner.to_string(),
                });
            }
            debug!("adopted {rel} as {} {}", sc.asset_type, sc.handle);
            self.insert(sc.handle, sc.asset_type, rel);
            return Ok(sc.handle);
        }
        let asset_type = Self::importable_type(&abs)?;
        let handle = self.mint_handle();
        self.persist(&abs, handle, asset_type)?;
        self.insert(handle, asset_type, rel);
        Ok(handle)
    }

    /// Binds `path` to a caller-chosen handle, overwriting its sidecar.
    pub fn import_asset_with_handle(
        &mut self,
        path: &Path,
        handle: AssetHandle,
    ) -> AssetResult<AssetHandle> {
        if !handle.is_valid() {
            return Err(AssetError::InvalidHandle(handle));
        }
        let (abs, rel) = self.resolve(path)?;
        let asset_type = Self::importable_type(&abs)?;
        if let Some(owner) = self.owner_of(handle) {
            if owner != rel {
                return Err(AssetError::HandleInUse {
                    handle,
                    owner: owner.to_string(),
                });
            }
        }

        self.persist(&abs, handle, asset_type)?;
        if let Some(previous) = self.by_path.get(&rel).copied() {
            self.by_handle.remove(&previous);
        }
        self.insert(handle, asset_type, rel);
        Ok(handle)
    }

    pub fn metadata(&self, handle: AssetHandle) -> Option<&AssetMetadata> {
        self.by_handle.get(&handle)
    }

    /// Looks up by path, relative to the source root or absolute beneath it.
    pub fn metadata_by_path(&self, path: impl AsRef<Path>) -> Option<&AssetMetadata> {
        let key = self.key_for(path.as_ref())?;
        let handle = self.by_path.get(&key)?;
        self.by_handle.get(handle)
    }

    pub fn source_root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn absolute_path(&self, metadata: &AssetMetadata) -> Option<PathBuf> {
        let root = self.root.as_ref()?;
        Some(root.join(&metadata.file_path))
    }

    pub fn iter(&self) -> impl Iterator<Item = &AssetMetadata> {
        self.by_handle.values()
    }

    /// All entries ordered by relative path.
    pub fn sorted(&self) -> Vec<&AssetMetadata> {
        let mut out: Vec<_> = self.by_handle.values().collect();
        out.sort_by(|a, b| a.file_path.cmp(&b.file_path));
        out
    }

    pub fn len(&self) -> usize {
        self.by_handle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_handle.is_empty()
    }

    fn insert(&mut self, handle: AssetHandle, asset_type: AssetType, rel: String) {
        self.by_path.insert(rel.clone(), handle);
        self.by_handle.insert(
            handle,
            AssetMetadata {
                handle,
                asset_type,
                file_path: rel,
            },
        );
    }

    fn owner_of(&self, handle: AssetHandle) -> Option<&str> {
        self.by_handle.get(&handle).map(|m| m.file_path.as_str())
    }

    fn mint_handle(&self) -> AssetHandle {
        loop {
            let handle = AssetHandle::generate();
            if !self.by_handle.contains_key(&handle) {
                return handle;
            }
        }
    }

    fn persist(&self, abs: &Path, handle: AssetHandle, asset_type: AssetType) -> AssetResult<()> {
        Sidecar { handle, asset_type }.save(&sidecar_path(abs))
    }

    fn importable_type(abs: &Path) -> AssetResult<AssetType> {
        match AssetType::from_path(abs) {
            AssetType::None => Err(AssetError::Unsupported(abs.to_path_buf())),
            t => Ok(t),
        }
    }

    fn resolve(&self, path: &Path) -> AssetResult<(PathBuf, String)> {
        let root = self.root.as_ref().ok_or(AssetError::NotInitialized)?;
        let abs = if path.is_absolute() {
            path.to_path_buf()
        } else {
            root.join(path)
        };
        let rel = relative_to(root, &abs).ok_or_else(|| AssetError::Outside(abs.clone()))?;
        if !abs.is_file() {
            return Err(AssetError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no such file: {}", abs.display()),
            )));
        }
        Ok((abs, rel))
    }

    fn key_for(&self, path: &Path) -> Option<String> {
        if path.is_absolute() {
            return relative_to(self.root.as_ref()?, path);
        }
        let s = path.to_string_lossy().replace('\\', "/");
        Some(to_virtual(Path::new(&s)))
    }
}
