#![forbid(unsafe_code)]

use log::{debug, error, info};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::io::hash32;
use crate::pak::error::{PakError, PakResult};
use crate::pak::format::{Header, PakEntry, FLAG_COMPRESSED, HEADER_SIZE};
use crate::path::{prefixed, relative_to, should_exclude};

/// Default zstd level.
pub const DEFAULT_ZSTD_LEVEL: i32 = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackOptions {
    /// Zstd level (1..=22).
    pub zstd_level: i32,
    /// Optional mount prefix inside the pak (e.g. "assets/").
    pub prefix: String,
    /// Substring filters on normalized paths.
    pub excludes: Vec<String>,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            zstd_level: DEFAULT_ZSTD_LEVEL,
            prefix: String::new(),
            excludes: Vec::new(),
        }
    }
}

/// Totals of a finalized archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PakSummary {
    pub file_count: u32,
    pub dir_offset: u64,
    pub original_bytes: u64,
    pub stored_bytes: u64,
}

/// Writes an HPAK v1 archive.
///
/// Layout:
/// - header (24 bytes, rewritten by [`PakWriter::finalize`])
/// - payload blobs (raw or zstd), back to back
/// - directory: one record per entry
///   - [u16 path_len][path bytes UTF-8]
///   - [u64 offset][u64 original_size][u64 stored_size]
///   - [u32 hash][u32 flags]
///
/// Dropping the writer without finalizing leaves a header with a zero
/// directory offset, which readers reject.
pub struct PakWriter {
    out: BufWriter<File>,
    path: PathBuf,
    offset: u64,
    zstd_level: i32,
    entries: Vec<PakEntry>,
    seen: HashSet<String>,
}

impl PakWriter {
    pub fn create(path: &Path, zstd_level: i32) -> PakResult<Self> {
        let mut out = BufWriter::new(File::create(path)?);
        Header {
            file_count: 0,
            flags: 0,
            dir_offset: 0,
        }
        .write(&mut out)?;
        Ok(Self {
            out,
            path: path.to_path_buf(),
            offset: HEADER_SIZE,
            zstd_level: zstd_level.clamp(1, 22),
            entries: Vec::new(),
            seen: HashSet::new(),
        })
    }

    /// Reads `source` whole and appends it as `internal_path`.
    pub fn add_file(&mut self, source: &Path, internal_path: &str) -> PakResult<&PakEntry> {
        let raw = std::fs::read(source).map_err(|e| PakError::Source {
            path: source.to_path_buf(),
            source: e,
        })?;
        self.add_bytes(internal_path, &raw)
    }

    /// Appends `raw` as `internal_path`, stored compressed when that is smaller.
    pub fn add_bytes(&mut self, internal_path: &str, raw: &[u8]) -> PakResult<&PakEntry> {
        let path = internal_path.replace('\\', "/");
        if path.is_empty() {
            return Err(PakError::Invalid("empty entry path".into()));
        }
        if path.len() > u16::MAX as usize {
            return Err(PakError::Invalid(format!("path too long: {path}")));
        }
        if self.seen.contains(&path) {
            return Err(PakError::Invalid(format!("duplicate entry: {path}")));
        }

        let hash = hash32(raw);
        let compressed =
            zstd::bulk::compress(raw, self.zstd_level).map_err(|source| PakError::Compression {
                path: path.clone(),
                source,
            })?;
        let (payload, flags) = if compressed.len() < raw.len() {
            (compressed.as_slice(), FLAG_COMPRESSED)
        } else {
            (raw, 0)
        };

        self.out.write_all(payload)?;
        let entry = PakEntry {
            path: path.clone(),
            offset: self.offset,
            original_size: raw.len() as u64,
            stored_size: payload.len() as u64,
            hash,
            flags,
        };
        self.offset += entry.stored_size;
        debug!(
            "added {} ({} -> {} bytes)",
            entry.path, entry.original_size, entry.stored_size
        );
        self.seen.insert(path);
        self.entries.push(entry);
        Ok(&self.entries[self.entries.len() - 1])
    }

    pub fn entries(&self) -> &[PakEntry] {
        &self.entries
    }

    /// Writes the directory after the last payload, then backpatches the header.
    pub fn finalize(mut self) -> PakResult<PakSummary> {
        let file_count = u32::try_from(self.entries.len())
            .map_err(|_| PakError::Invalid("too many entries".into()))?;
        let dir_offset = self.offset;
        for e in &self.entries {
            e.write(&mut self.out)?;
        }

        self.out.seek(SeekFrom::Start(0))?;
        Header {
            file_count,
            flags: 0,
            dir_offset,
        }
        .write(&mut self.out)?;
        self.out.flush()?;
        self.out.get_ref().sync_all()?;

        let summary = PakSummary {
            file_count,
            dir_offset,
            original_bytes: self.entries.iter().map(|e| e.original_size).sum(),
            stored_bytes: self.entries.iter().map(|e| e.stored_size).sum(),
        };
        info!(
            "wrote {}: {} entries, {} -> {} bytes",
            self.path.display(),
            summary.file_count,
            summary.original_bytes,
            summary.stored_bytes
        );
        Ok(summary)
    }
}

/// Outcome of packing a directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackReport {
    pub summary: PakSummary,
    /// Entries that could not be added, with the reason.
    pub failed: Vec<(String, String)>,
}

/// Packs every file under `input` into `output`.
///
/// Paths are normalized to forward slashes and sorted bytewise so the same
/// tree always produces the same archive.
pub fn pack_directory(input: &Path, output: &Path, options: &PackOptions) -> PakResult<PackReport> {
    let mut files: Vec<(String, PathBuf)> = Vec::new();
    for ent in WalkDir::new(input).follow_links(false) {
        let ent = ent?;
        if !ent.file_type().is_file() {
            continue;
        }
        let rel = relative_to(input, ent.path())
            .ok_or_else(|| PakError::Outside(ent.path().to_string_lossy().into_owned()))?;
        let logical = prefixed(&options.prefix, &rel);
        if should_exclude(&logical, &options.excludes) {
            continue;
        }
        files.push((logical, ent.path().to_path_buf()));
    }
    files.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

    let mut writer = PakWriter::create(output, options.zstd_level)?;
    let mut failed = Vec::new();
    for (logical, physical) in files {
        match writer.add_file(&physical, &logical) {
            Ok(_) => {}
            Err(e) if e.is_entry_error() => {
                error!("skipping {logical}: {e}");
                failed.push((logical, e.to_string()));
            }
            Err(e) => return Err(e),
        }
    }

    let summary = writer.finalize()?;
    Ok(PackReport { summary, failed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn compressible_data_is_stored_compressed() {
        let dir = TempDir::new().unwrap();
        let pak = dir.path().join("t.hpak");
        let mut w = PakWriter::create(&pak, DEFAULT_ZSTD_LEVEL).unwrap();

        let e = w.add_bytes("zeros.bin", &[0u8; 4096]).unwrap().clone();
        assert!(e.is_compressed());
        assert!(e.stored_size < e.original_size);
        assert_eq!(e.offset, HEADER_SIZE);
        assert_eq!(e.hash, hash32(&[0u8; 4096]));

        let e = w.add_bytes("tiny.bin", b"x").unwrap().clone();
        assert!(!e.is_compressed());
        assert_eq!(e.stored_size, 1);

        let summary = w.finalize().unwrap();
        assert_eq!(summary.file_count, 2);
        assert_eq!(summary.original_bytes, 4097);
        let len = fs::metadata(&pak).unwrap().len();
        assert!(summary.dir_offset > HEADER_SIZE && summary.dir_offset < len);
    }

    #[test]
    fn duplicates_and_empty_paths_are_entry_errors() {
        let dir = TempDir::new().unwrap();
        let mut w = PakWriter::create(&dir.path().join("t.hpak"), 3).unwrap();
        w.add_bytes("a\\b.bin", b"1").unwrap();
        let err = w.add_bytes("a/b.bin", b"2").unwrap_err();
        assert!(err.is_entry_error());
        assert!(w.add_bytes("", b"2").unwrap_err().is_entry_error());
        assert_eq!(w.entries().len(), 1);
        assert_eq!(w.entries()[0].path, "a/b.bin");
    }

    #[test]
    fn missing_source_is_an_entry_error() {
        let dir = TempDir::new().unwrap();
        let mut w = PakWriter::create(&dir.path().join("t.hpak"), 3).unwrap();
        let err = w.add_file(&dir.path().join("nope"), "nope").unwrap_err();
        assert!(matches!(err, PakError::Source { .. }));
        assert!(err.is_entry_error());
    }

    #[test]
    fn unfinalized_archive_has_no_directory() {
        let dir = TempDir::new().unwrap();
        let pak = dir.path().join("t.hpak");
        {
            let mut w = PakWriter::create(&pak, 3).unwrap();
            w.add_bytes("a", b"abc").unwrap();
        }
        let bytes = fs::read(&pak).unwrap();
        assert_eq!(&bytes[16..24], &[0u8; 8]);
    }

    #[test]
    fn pack_directory_applies_prefix_and_excludes() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("cooked");
        fs::create_dir_all(input.join("textures")).unwrap();
        fs::create_dir_all(input.join(".git")).unwrap();
        fs::write(input.join("textures/b.horsetex"), b"b").unwrap();
        fs::write(input.join("a.horselevel.bin"), b"a").unwrap();
        fs::write(input.join(".git/HEAD"), b"ref").unwrap();

        let options = PackOptions {
            prefix: "assets".into(),
            excludes: vec![".git".into()],
            ..PackOptions::default()
        };
        let pak = dir.path().join("out.hpak");
        let report = pack_directory(&input, &pak, &options).unwrap();
        assert_eq!(report.summary.file_count, 2);
        assert!(report.failed.is_empty());
    }
}
