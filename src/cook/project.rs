#![forbid(unsafe_code)]

use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::asset::AssetHandle;
use crate::cook::context::CookContext;
use crate::cook::error::{CookError, CookResult};
use crate::cook::format::{begin, invalid, open, ArtifactKind};
use crate::io::{read_blob, read_u32, read_u64, read_vec, write_blob, write_u32, write_u64};

/// Extension of the project file that sits beside the source asset root.
pub const PROJECT_EXTENSION: &str = "horseproject";

/// Well-known name of the cooked project at the root of the cooked tree.
pub const COOKED_PROJECT_NAME: &str = "game.horseproject.bin";

const KIND: ArtifactKind = ArtifactKind::Project;

/// Cooked project.
///
/// Header: startup scene handle, name size. Payload: name, then
/// length-prefixed platform and length-prefixed canonical settings JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectArtifact {
    pub startup_scene: AssetHandle,
    pub name: String,
    pub platform: String,
    pub settings: Vec<u8>,
}

impl ProjectArtifact {
    pub fn encode(&self) -> CookResult<Vec<u8>> {
        let name_size =
            u32::try_from(self.name.len()).map_err(|_| invalid(KIND, "name too long"))?;
        let mut out = begin(KIND);
        write_u64(&mut out, self.startup_scene.get())?;
        write_u32(&mut out, name_size)?;
        out.extend_from_slice(self.name.as_bytes());
        write_blob(&mut out, self.platform.as_bytes())?;
        write_blob(&mut out, &self.settings)?;
        Ok(out)
    }

    pub fn decode(bytes: &[u8]) -> CookResult<Self> {
        let mut cur = open(bytes, KIND)?;
        let startup_scene = AssetHandle::new(read_u64(&mut cur)?);
        let name_size = read_u32(&mut cur)? as usize;
        let name = String::from_utf8(read_vec(&mut cur, name_size)?)
            .map_err(|_| invalid(KIND, "name is not UTF-8"))?;
        let platform = String::from_utf8(read_blob(&mut cur)?)
            .map_err(|_| invalid(KIND, "platform is not UTF-8"))?;
        let settings = read_blob(&mut cur)?;
        Ok(Self {
            startup_scene,
            name,
            platform,
            settings,
        })
    }
}

/// Finds the project file directly inside `dir`; the first by name wins.
pub fn find_project_file(dir: &Path) -> Option<PathBuf> {
    let mut found: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case(PROJECT_EXTENSION))
        })
        .collect();
    found.sort();
    found.into_iter().next()
}

pub fn cook_project(source: &[u8], ctx: &CookContext<'_>) -> CookResult<Vec<u8>> {
    let doc: Value = serde_json::from_slice(source)?;
    let name = doc
        .get("Name")
        .and_then(Value::as_str)
        .ok_or_else(|| CookError::Parse("project needs a string Name".into()))?
        .to_string();
    let startup = doc.get("StartupScene").and_then(Value::as_str);

    ProjectArtifact {
        startup_scene: ctx.resolve(startup, "project"),
        name,
        platform: ctx.platform.to_string(),
        settings: serde_json::to_vec(&doc)?,
    }
    .encode()
}
