#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

use super::Device;

/// Loose files under a native directory.
pub struct DirDevice {
    dir: PathBuf,
}

impl DirDevice {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            dir: path.as_ref().to_owned(),
        }
    }

    /// Native path for a virtual one; `..` segments are refused.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let mut out = self.dir.clone();
        for seg in path.split('/').filter(|s| !s.is_empty()) {
            if seg == ".." {
                return None;
            }
            out.push(seg);
        }
        Some(out)
    }
}

impl Device for DirDevice {
    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_some_and(|p| p.is_file())
    }

    fn read(&self, path: &str) -> Option<Vec<u8>> {
        let p = self.resolve(path)?;
        if !p.is_file() {
            return None;
        }
        std::fs::read(p).ok()
    }

    fn list(&self, dir: &str) -> Vec<String> {
        let Some(p) = self.resolve(dir) else {
            return Vec::new();
        };
        let Ok(rd) = std::fs::read_dir(p) else {
            return Vec::new();
        };
        let mut names: Vec<String> = rd
            .filter_map(Result::ok)
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    fn describe(&self) -> String {
        format!("dir:{}", self.dir.display())
    }
}
