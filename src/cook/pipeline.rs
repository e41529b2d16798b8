#![forbid(unsafe_code)]

use log::{error, info, warn};
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::asset::{AssetError, AssetHandle, AssetMetadata, AssetRegistry};
use crate::cook::context::{CookContext, CookOptions};
use crate::cook::cooker::{Cooker, CookerTable};
use crate::cook::error::{CookError, CookResult};
use crate::cook::manifest::{CookManifest, MANIFEST_FILE_NAME};
use crate::cook::project::{
    cook_project, find_project_file, COOKED_PROJECT_NAME, PROJECT_EXTENSION,
};
use crate::path::to_virtual;

/// Result of cooking one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetOutcome {
    pub source: String,
    pub handle: AssetHandle,
    /// Cooked path relative to the output root, or the failure message.
    pub result: Result<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookReport {
    /// Per-asset outcomes, ordered by source path.
    pub assets: Vec<AssetOutcome>,
    /// Registered assets whose type has no cooker.
    pub skipped: Vec<String>,
    /// Cooked project, if a project file was found.
    pub project: Option<Result<String, String>>,
    pub manifest: CookManifest,
}

impl CookReport {
    pub fn cooked(&self) -> usize {
        self.assets.iter().filter(|a| a.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.assets.iter().filter(|a| a.result.is_err()).count()
            + usize::from(matches!(self.project, Some(Err(_))))
    }
}

/// `textures/hero.png` + `horsetex` -> `textures/hero.horsetex`
pub fn cooked_path(source_rel: &str, extension: &str) -> String {
    to_virtual(&Path::new(source_rel).with_extension(extension))
}

/// Drives every registered asset through its cooker.
#[derive(Debug, Clone, Default)]
pub struct CookPipeline {
    cookers: CookerTable,
    options: CookOptions,
}

impl CookPipeline {
    pub fn new(options: CookOptions) -> Self {
        Self {
            cookers: CookerTable::default(),
            options,
        }
    }

    pub fn with_cookers(cookers: CookerTable, options: CookOptions) -> Self {
        Self { cookers, options }
    }

    pub fn cookers(&self) -> &CookerTable {
        &self.cookers
    }

    /// Cooks every registry entry into `output_root` and writes the manifest.
    ///
    /// Per-asset failures are recorded in the report; only an unusable output
    /// directory or a failed manifest write is an error.
    pub fn cook(&self, registry: &AssetRegistry, output_root: &Path) -> CookResult<CookReport> {
        let source_root = registry
            .source_root()
            .ok_or(CookError::Registry(AssetError::NotInitialized))?;
        fs::create_dir_all(output_root).map_err(|source| CookError::OutputDir {
            path: output_root.to_path_buf(),
            source,
        })?;

        let ctx = CookContext::new(registry, source_root, &self.options.platform);
        let mut report = CookReport::default();

        // Each cooked path is claimed by the first source in path order;
        // later sources that map onto it fail instead of overwriting it.
        let mut claimed: HashMap<String, &str> = HashMap::new();
        let mut work: Vec<(&AssetMetadata, Cooker, Result<String, String>)> = Vec::new();
        for md in registry.sorted() {
            let Some(cooker) = self.cookers.get(md.asset_type) else {
                info!("no cooker for {} ({}), skipping", md.file_path, md.asset_type);
                report.skipped.push(md.file_path.clone());
                continue;
            };
            let rel = cooked_path(&md.file_path, cooker.cooked_extension());
            let target = match claimed.get(rel.as_str()) {
                Some(owner) => Err(format!("cooked path {rel} is already produced by {owner}")),
                None => {
                    claimed.insert(rel.clone(), md.file_path.as_str());
                    Ok(rel)
                }
            };
            work.push((md, *cooker, target));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.jobs)
            .build()
            .map_err(|e| CookError::Pool(e.to_string()))?;
        info!(
            "cooking {} assets for {} on {} threads",
            work.len(),
            self.options.platform,
            pool.current_num_threads()
        );

        let results: Vec<AssetOutcome> = pool.install(|| {
            work.par_iter()
                .map(|(md, cooker, target)| AssetOutcome {
                    source: md.file_path.clone(),
                    handle: md.handle,
                    result: target.clone().and_then(|rel| {
                        cook_one(&ctx, md, cooker, output_root, &rel)
                            .map(|()| rel)
                            .map_err(|e| e.to_string())
                    }),
                })
                .collect()
        });

        for outcome in results {
            match &outcome.result {
                Ok(cooked) => report.manifest.insert(outcome.handle, cooked.clone()),
                Err(e) => error!("failed to cook {}: {e}", outcome.source),
            }
            report.assets.push(outcome);
        }

        report.project = source_root
            .parent()
            .and_then(find_project_file)
            .map(|project| {
                cook_project_file(&ctx, &project, output_root).map_err(|e| {
                    error!("failed to cook project {}: {e}", project.display());
                    e.to_string()
                })
            });
        if report.project.is_none() {
            warn!("no .{PROJECT_EXTENSION} file beside {}", source_root.display());
        }

        let manifest_path = output_root.join(MANIFEST_FILE_NAME);
        report.manifest.save(&manifest_path).map_err(|e| match e {
            CookError::Io(source) => CookError::OutputDir {
                path: manifest_path.clone(),
                source,
            },
            other => other,
        })?;

        info!(
            "cook finished: {} cooked, {} failed, {} skipped",
            report.cooked(),
            report.failed(),
            report.skipped.len()
        );
        Ok(report)
    }
}

fn cook_one(
    ctx: &CookContext<'_>,
    md: &AssetMetadata,
    cooker: &Cooker,
    output_root: &Path,
    rel: &str,
) -> CookResult<()> {
    let source = fs::read(ctx.source_root.join(&md.file_path))?;
    let bytes = cooker.cook(&source, md, ctx)?;

    let out = output_root.join(rel);
    if let Some(parent) = out.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&out, bytes)?;
    Ok(())
}

fn cook_project_file(ctx: &CookContext<'_>, project: &Path, output_root: &Path) -> CookResult<String> {
    let source = fs::read(project)?;
    let bytes = cook_project(&source, ctx)?;
    fs::write(output_root.join(COOKED_PROJECT_NAME), bytes)?;
    Ok(COOKED_PROJECT_NAME.to_string())
}

/// Scans `source_root`, then cooks everything into `output_root`.
pub fn cook_directory(
    source_root: &Path,
    output_root: &Path,
    options: CookOptions,
) -> CookResult<CookReport> {
    let mut registry = AssetRegistry::new();
    registry.initialize(source_root)?;
    CookPipeline::new(options).cook(&registry, output_root)
}
