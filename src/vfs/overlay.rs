#![forbid(unsafe_code)]

use log::{debug, info};
use std::collections::BTreeSet;
use std::path::Path;

use super::{Device, DirDevice, PakDevice, VfsError, VfsResult};
use crate::pak::PakArchive;
use crate::path::canonicalize;

/// Overlay paths are rooted at the mount table, so a leading `/` carries no meaning.
fn overlay_path(path: &str) -> String {
    canonicalize(path).trim_start_matches('/').to_string()
}

struct Mount {
    /// Canonical, no trailing slash; `""` mounts at the root.
    point: String,
    device: Box<dyn Device>,
}

impl Mount {
    /// `path` relative to this mount point, if it lies beneath it.
    fn relative<'p>(&self, path: &'p str) -> Option<&'p str> {
        if self.point.is_empty() {
            return Some(path);
        }
        let rest = path.strip_prefix(self.point.as_str())?;
        if rest.is_empty() {
            Some(rest)
        } else {
            rest.strip_prefix('/')
        }
    }
}

/// Virtual filesystem overlay.
///
/// Lookups consult mounts newest first, so a later mount shadows an earlier
/// one that exposes the same virtual path. When nothing is mounted, or the
/// overlay has no answer, reads fall through to the native filesystem with
/// the caller's original path.
///
/// Mounts are expected to be added before read traffic starts; the table is
/// not synchronized against concurrent mutation.
#[derive(Default)]
pub struct Vfs {
    mounts: Vec<Mount>,
}

impl Vfs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mounts a directory or an archive file at `mount_point`.
    pub fn mount(&mut self, source: impl AsRef<Path>, mount_point: &str) -> VfsResult<()> {
        let source = source.as_ref();
        let device: Box<dyn Device> = if source.is_dir() {
            Box::new(DirDevice::new(source))
        } else if source.is_file() {
            Box::new(PakDevice::new(PakArchive::open(source)?))
        } else {
            return Err(VfsError::MissingTarget(source.to_path_buf()));
        };
        self.mount_device(device, mount_point);
        Ok(())
    }

    pub fn mount_device(&mut self, device: Box<dyn Device>, mount_point: &str) {
        let point = canonicalize(mount_point).trim_matches('/').to_string();
        info!("mounted {} at /{point}", device.describe());
        self.mounts.push(Mount { point, device });
    }

    pub fn is_mounted(&self) -> bool {
        !self.mounts.is_empty()
    }

    pub fn mount_count(&self) -> usize {
        self.mounts.len()
    }

    pub fn unmount_all(&mut self) {
        self.mounts.clear();
    }

    /// Mounts that can answer for `path`, newest first, with the device-relative path.
    fn candidates<'a>(&'a self, path: &'a str) -> impl Iterator<Item = (&'a Mount, &'a str)> + 'a {
        self.mounts
            .iter()
            .rev()
            .filter_map(move |m| m.relative(path).map(|rel| (m, rel)))
    }

    pub fn overlay_exists(&self, path: &str) -> bool {
        let path = overlay_path(path);
        let found = self.candidates(&path).any(|(m, rel)| m.device.exists(rel));
        found
    }

    pub fn overlay_read(&self, path: &str) -> Option<Vec<u8>> {
        let path = overlay_path(path);
        let bytes = self
            .candidates(&path)
            .find(|(m, rel)| m.device.exists(rel))
            .and_then(|(m, rel)| m.device.read(rel));
        bytes
    }

    pub fn native_exists(path: &str) -> bool {
        Path::new(path).is_file()
    }

    pub fn native_read(path: &str) -> Option<Vec<u8>> {
        std::fs::read(path).ok()
    }

    pub fn exists(&self, path: &str) -> bool {
        self.overlay_exists(path) || Self::native_exists(path)
    }

    pub fn read_bytes(&self, path: &str) -> Option<Vec<u8>> {
        if let Some(bytes) = self.overlay_read(path) {
            return Some(bytes);
        }
        debug!("{path}: not in overlay, trying native filesystem");
        Self::native_read(path)
    }

    pub fn read_text(&self, path: &str) -> Option<String> {
        String::from_utf8(self.read_bytes(path)?).ok()
    }

    /// Sorted, de-duplicated child names of `dir` across all mounts, or the
    /// native directory listing when nothing is mounted.
    pub fn enumerate(&self, dir: &str) -> Vec<String> {
        if !self.is_mounted() {
            return Self::native_enumerate(dir);
        }
        let dir = overlay_path(dir);
        let dir = dir.as_str();
        let mut names = BTreeSet::new();
        for m in &self.mounts {
            if let Some(rel) = m.relative(dir) {
                names.extend(m.device.list(rel));
                continue;
            }
            // Mount points nested below `dir` show up as a directory.
            let nested = if dir.is_empty() {
                Some(m.point.as_str())
            } else {
                m.point
                    .strip_prefix(dir)
                    .and_then(|rest| rest.strip_prefix('/'))
            };
            if let Some(first) = nested.and_then(|rest| rest.split('/').next()) {
                names.insert(first.to_string());
            }
        }
        names.into_iter().collect()
    }

    fn native_enumerate(dir: &str) -> Vec<String> {
        let Ok(rd) = std::fs::read_dir(dir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = rd
            .filter_map(Result::ok)
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pak::PakWriter;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn loose(dir: &TempDir, name: &str, files: &[(&str, &str)]) -> PathBuf {
        let root = dir.path().join(name);
        for (rel, text) in files {
            let p = root.join(rel);
            fs::create_dir_all(p.parent().unwrap()).unwrap();
            fs::write(p, text).unwrap();
        }
        root
    }

    fn sealed(dir: &TempDir, name: &str, files: &[(&str, &str)]) -> PathBuf {
        let pak = dir.path().join(name);
        let mut w = PakWriter::create(&pak, 3).unwrap();
        for (rel, text) in files {
            w.add_bytes(rel, text.as_bytes()).unwrap();
        }
        w.finalize().unwrap();
        pak
    }

    #[test]
    fn loose_and_sealed_answer_identically() {
        let dir = TempDir::new().unwrap();
        let files = &[
            ("textures/a.horsetex", "AAAA"),
            ("level.horselevel.bin", "{}"),
        ];
        let root = loose(&dir, "loose", files);
        let pak = sealed(&dir, "sealed.hpak", files);

        for source in [root, pak] {
            let mut vfs = Vfs::new();
            vfs.mount(&source, "").unwrap();
            assert!(vfs.exists("textures/a.horsetex"));
            assert!(vfs.exists(".\\textures\\a.horsetex"));
            assert!(!vfs.exists("textures"));
            assert_eq!(vfs.read_bytes("./textures/a.horsetex").unwrap(), b"AAAA");
            assert_eq!(vfs.read_text("level.horselevel.bin").unwrap(), "{}");
            assert_eq!(vfs.read_bytes("textures/missing"), None);
            assert_eq!(
                vfs.enumerate(""),
                vec!["level.horselevel.bin".to_string(), "textures".to_string()]
            );
            assert_eq!(vfs.enumerate("textures/"), vec!["a.horsetex".to_string()]);
        }
    }

    #[test]
    fn rooted_paths_resolve_in_loose_and_sealed_mounts() {
        let dir = TempDir::new().unwrap();
        let files = &[("a.txt", "a"), ("sub/b.txt", "b")];
        let root = loose(&dir, "loose", files);
        let pak = sealed(&dir, "sealed.hpak", files);

        for source in [root, pak] {
            let mut vfs = Vfs::new();
            vfs.mount(&source, "").unwrap();
            assert!(vfs.overlay_exists("/a.txt"), "{}", source.display());
            assert_eq!(vfs.overlay_read("/a.txt").unwrap(), b"a");
            assert_eq!(vfs.overlay_read("\\sub\\b.txt").unwrap(), b"b");
            assert_eq!(vfs.enumerate("/sub"), vec!["b.txt".to_string()]);
        }

        let mut scoped = Vfs::new();
        scoped.mount(&sealed(&dir, "scoped.hpak", files), "/assets").unwrap();
        assert!(scoped.overlay_exists("/assets/a.txt"));
        assert!(scoped.overlay_exists("assets/sub/b.txt"));
    }

    #[test]
    fn last_mount_wins() {
        let dir = TempDir::new().unwrap();
        let base = sealed(&dir, "base.hpak", &[("shared.txt", "base"), ("base.txt", "b")]);
        let patch = loose(&dir, "patch", &[("shared.txt", "patch")]);

        let mut vfs = Vfs::new();
        vfs.mount(&base, "").unwrap();
        vfs.mount(&patch, "").unwrap();
        assert_eq!(vfs.read_text("shared.txt").unwrap(), "patch");
        assert_eq!(vfs.read_text("base.txt").unwrap(), "b");

        let mut reversed = Vfs::new();
        reversed.mount(&patch, "").unwrap();
        reversed.mount(&base, "").unwrap();
        assert_eq!(reversed.read_text("shared.txt").unwrap(), "base");
    }

    #[test]
    fn mount_points_scope_lookups() {
        let dir = TempDir::new().unwrap();
        let pak = sealed(&dir, "a.hpak", &[("hero.horsetex", "hero")]);

        let mut vfs = Vfs::new();
        vfs.mount(&pak, "./assets/").unwrap();
        assert!(vfs.exists("assets/hero.horsetex"));
        assert!(!vfs.overlay_exists("hero.horsetex"));
        assert!(!vfs.overlay_exists("assetsX/hero.horsetex"));
        assert_eq!(vfs.enumerate(""), vec!["assets".to_string()]);
        assert_eq!(vfs.enumerate("assets"), vec!["hero.horsetex".to_string()]);
    }

    #[test]
    fn falls_back_to_native_paths() {
        let dir = TempDir::new().unwrap();
        let native = dir.path().join("native.txt");
        fs::write(&native, b"native").unwrap();
        let native_str = native.to_str().unwrap();

        let vfs = Vfs::new();
        assert!(!vfs.is_mounted());
        assert!(!vfs.overlay_exists(native_str));
        assert!(Vfs::native_exists(native_str));
        assert!(vfs.exists(native_str));
        assert_eq!(vfs.read_text(native_str).unwrap(), "native");
        assert_eq!(
            vfs.enumerate(dir.path().to_str().unwrap()),
            vec!["native.txt".to_string()]
        );

        let mut mounted = Vfs::new();
        mounted.mount(&loose(&dir, "m", &[("x", "x")]), "").unwrap();
        assert_eq!(mounted.read_text(native_str).unwrap(), "native");
    }

    #[test]
    fn missing_and_broken_targets_fail_to_mount() {
        let dir = TempDir::new().unwrap();
        let mut vfs = Vfs::new();
        assert!(matches!(
            vfs.mount(dir.path().join("nope"), ""),
            Err(VfsError::MissingTarget(_))
        ));
        let junk = dir.path().join("junk.hpak");
        fs::write(&junk, b"not an archive at all, really").unwrap();
        assert!(matches!(vfs.mount(&junk, ""), Err(VfsError::Pak(_))));
        assert_eq!(vfs.mount_count(), 0);
    }

    #[test]
    fn directory_device_refuses_parent_segments() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("secret.txt"), b"s").unwrap();
        let root = loose(&dir, "root", &[("ok.txt", "ok")]);

        let mut vfs = Vfs::new();
        vfs.mount(&root, "").unwrap();
        assert!(!vfs.overlay_exists("../secret.txt"));
        assert_eq!(vfs.overlay_read("../secret.txt"), None);

        vfs.unmount_all();
        assert!(!vfs.is_mounted());
    }
}
