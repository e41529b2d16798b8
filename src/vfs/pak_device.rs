#![forbid(unsafe_code)]

use log::warn;
use std::collections::BTreeSet;

use super::Device;
use crate::pak::PakArchive;

/// Files sealed in an HPAK archive.
pub struct PakDevice {
    archive: PakArchive,
}

impl PakDevice {
    pub fn new(archive: PakArchive) -> Self {
        Self { archive }
    }
}

impl Device for PakDevice {
    fn exists(&self, path: &str) -> bool {
        self.archive.contains(path)
    }

    fn read(&self, path: &str) -> Option<Vec<u8>> {
        let entry = self.archive.entry(path)?;
        match self.archive.read_entry(entry) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!("{}: {path}: {e}", self.archive.path().display());
                None
            }
        }
    }

    fn list(&self, dir: &str) -> Vec<String> {
        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{dir}/")
        };
        let names: BTreeSet<&str> = self
            .archive
            .entries()
            .iter()
            .filter_map(|e| e.path.strip_prefix(prefix.as_str()))
            .filter_map(|rest| rest.split('/').next())
            .filter(|name| !name.is_empty())
            .collect();
        names.into_iter().map(str::to_string).collect()
    }

    fn describe(&self) -> String {
        format!("pak:{}", self.archive.path().display())
    }
}
