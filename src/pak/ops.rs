#![forbid(unsafe_code)]

use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use crate::pak::build::{pack_directory, PackOptions, PackReport};
use crate::pak::error::{PakError, PakResult};
use crate::pak::format::{EntryInfo, HEADER_SIZE};
use crate::pak::read::PakArchive;

/// File name of the archive written by [`package`].
pub const ARCHIVE_FILE_NAME: &str = "assets.hpak";

/// Read pak directory entries (without extracting payloads).
pub fn entries(pak: &Path) -> PakResult<Vec<EntryInfo>> {
    let archive = PakArchive::open(pak)?;
    Ok(archive.entries().iter().map(EntryInfo::from).collect())
}

pub fn list(pak: &Path, verbose: bool) -> PakResult<()> {
    for e in entries(pak)? {
        if verbose {
            println!(
                "{}  off={} stored={} original={} kind={} hash={}",
                e.path, e.offset, e.stored_size, e.original_size, e.storage, e.hash_hex
            );
        } else {
            println!("{}", e.path);
        }
    }
    Ok(())
}

/// Writes every entry (optionally only those containing a filter substring)
/// under `output`, verifying each against its hash first.
pub fn extract(pak: &Path, output: &Path, filter: &[String]) -> PakResult<usize> {
    let archive = PakArchive::open(pak)?;
    fs::create_dir_all(output)?;

    let mut written = 0;
    for e in archive.entries() {
        if !filter.is_empty() && !filter.iter().any(|s| e.path.contains(s)) {
            continue;
        }
        if e.path.split('/').any(|seg| seg == ".." || seg.is_empty()) {
            return Err(PakError::Invalid(format!("unsafe entry path: {}", e.path)));
        }

        let raw = archive.read_entry(e)?;
        let out_path = output.join(e.path.replace('/', std::path::MAIN_SEPARATOR_STR));
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&out_path, &raw)?;
        written += 1;
    }
    Ok(written)
}

/// Checks payload contiguity and every entry's size and hash.
pub fn verify(pak: &Path) -> PakResult<usize> {
    let archive = PakArchive::open(pak)?;

    let mut spans: Vec<(u64, u64, &str)> = archive
        .entries()
        .iter()
        .map(|e| (e.offset, e.stored_size, e.path.as_str()))
        .collect();
    spans.sort_unstable();
    let mut expected = HEADER_SIZE;
    for (offset, size, path) in &spans {
        if *offset != expected {
            return Err(PakError::Invalid(format!(
                "payload of {path} at {offset}, expected {expected}"
            )));
        }
        expected += size;
    }
    if expected != archive.dir_offset() {
        return Err(PakError::Invalid(format!(
            "directory at {}, payloads end at {expected}",
            archive.dir_offset()
        )));
    }

    for e in archive.entries() {
        archive.read_entry(e)?;
    }
    Ok(archive.len())
}

/// Output of the package tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageReport {
    pub archive: PathBuf,
    pub pack: PackReport,
    pub copied: Vec<PathBuf>,
}

/// Packs `cooked` into `<output>/assets.hpak` and copies the runtime
/// executable and game module beside it.
pub fn package(
    cooked: &Path,
    output: &Path,
    runtime: &Path,
    game_module: &Path,
    options: &PackOptions,
) -> PakResult<PackageReport> {
    if !cooked.is_dir() {
        return Err(PakError::Source {
            path: cooked.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        });
    }
    for input in [runtime, game_module] {
        if !input.is_file() {
            return Err(PakError::Source {
                path: input.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a file"),
            });
        }
    }
    fs::create_dir_all(output)?;

    let archive = output.join(ARCHIVE_FILE_NAME);
    if archive.starts_with(cooked) {
        return Err(PakError::Invalid(
            "output archive must not be inside the cooked directory".into(),
        ));
    }
    let pack = pack_directory(cooked, &archive, options)?;

    let mut copied = Vec::new();
    for input in [runtime, game_module] {
        let name = input
            .file_name()
            .ok_or_else(|| PakError::Invalid(format!("no file name: {}", input.display())))?;
        let dest = output.join(name);
        fs::copy(input, &dest)?;
        info!("copied {} -> {}", input.display(), dest.display());
        copied.push(dest);
    }

    Ok(PackageReport {
        archive,
        pack,
        copied,
    })
}
