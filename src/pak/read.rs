#![forbid(unsafe_code)]

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::io::hash32;
use crate::pak::error::{PakError, PakResult};
use crate::pak::format::{Header, PakEntry, HEADER_SIZE, MIN_RECORD_SIZE};

/// Read-only view of an HPAK archive. The directory is loaded on open;
/// payloads are read on demand.
#[derive(Debug)]
pub struct PakArchive {
    path: PathBuf,
    file: Mutex<File>,
    dir_offset: u64,
    entries: Vec<PakEntry>,
    index: HashMap<String, usize>,
}

impl PakArchive {
    pub fn open(path: &Path) -> PakResult<Self> {
        let mut file = File::open(path)?;
        let file_len = file.metadata()?.len();
        if file_len < HEADER_SIZE {
            return Err(PakError::Invalid("file too small".into()));
        }

        let header = Header::read(&mut file)?;
        if header.dir_offset < HEADER_SIZE || header.dir_offset > file_len {
            return Err(PakError::Invalid(format!(
                "directory offset {} outside file",
                header.dir_offset
            )));
        }

        let dir_len = file_len - header.dir_offset;
        if u64::from(header.file_count) > dir_len / MIN_RECORD_SIZE {
            return Err(PakError::Invalid(format!(
                "{} records cannot fit in a {dir_len}-byte directory",
                header.file_count
            )));
        }

        file.seek(SeekFrom::Start(header.dir_offset))?;
        let mut dir = BufReader::new((&mut file).take(dir_len));
        let mut entries = Vec::with_capacity(header.file_count as usize);
        let mut index = HashMap::with_capacity(header.file_count as usize);
        for i in 0..header.file_count as usize {
            let e = PakEntry::read(&mut dir)
                .map_err(|e| PakError::Invalid(format!("directory record {i}: {e}")))?;
            e.check()?;
            let end = e.offset.checked_add(e.stored_size);
            if e.offset < HEADER_SIZE || end.map_or(true, |end| end > header.dir_offset) {
                return Err(PakError::Invalid(format!("payload outside body: {}", e.path)));
            }
            if index.insert(e.path.clone(), i).is_some() {
                return Err(PakError::Invalid(format!("duplicate entry: {}", e.path)));
            }
            entries.push(e);
        }
        let mut rest = [0u8; 1];
        if dir.read(&mut rest)? != 0 {
            return Err(PakError::Invalid(
                "trailing bytes after directory".into(),
            ));
        }
        drop(dir);

        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
            dir_offset: header.dir_offset,
            entries,
            index,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dir_offset(&self) -> u64 {
        self.dir_offset
    }

    /// Entries in directory order.
    pub fn entries(&self) -> &[PakEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, path: &str) -> Option<&PakEntry> {
        self.index.get(path).map(|i| &self.entries[*i])
    }

    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    /// Stored bytes of `entry`, exactly as they sit in the archive.
    pub fn read_stored(&self, entry: &PakEntry) -> PakResult<Vec<u8>> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| PakError::Invalid("archive handle poisoned".into()))?;
        file.seek(SeekFrom::Start(entry.offset))?;
        let mut payload = vec![0u8; entry.stored_size as usize];
        file.read_exact(&mut payload)?;
        Ok(payload)
    }

    /// Original bytes of `entry`, decompressed and checked against size and hash.
    pub fn read_entry(&self, entry: &PakEntry) -> PakResult<Vec<u8>> {
        let payload = self.read_stored(entry)?;
        let raw = if entry.is_compressed() {
            // Grow with the decoded stream; the recorded size is checked after.
            let mut raw = Vec::new();
            zstd::stream::read::Decoder::new(payload.as_slice())?
                .take(entry.original_size.saturating_add(1))
                .read_to_end(&mut raw)?;
            raw
        } else {
            payload
        };
        if raw.len() as u64 != entry.original_size {
            return Err(PakError::Invalid(format!("size mismatch: {}", entry.path)));
        }
        if hash32(&raw) != entry.hash {
            return Err(PakError::HashMismatch(entry.path.clone()));
        }
        Ok(raw)
    }

    pub fn read(&self, path: &str) -> PakResult<Vec<u8>> {
        let entry = self
            .entry(path)
            .ok_or_else(|| PakError::NotFound(path.to_string()))?;
        self.read_entry(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pak::build::PakWriter;
    use crate::pak::format::FLAG_COMPRESSED;
    use std::fs;
    use tempfile::TempDir;

    fn sample(dir: &TempDir) -> PathBuf {
        let pak = dir.path().join("s.hpak");
        let mut w = PakWriter::create(&pak, 6).unwrap();
        w.add_bytes("text/lorem.txt", "lorem ipsum ".repeat(200).as_bytes())
            .unwrap();
        w.add_bytes("bin/noise.bin", &(0..=255u8).collect::<Vec<_>>())
            .unwrap();
        w.add_bytes("empty", b"").unwrap();
        w.finalize().unwrap();
        pak
    }

    #[test]
    fn round_trip_verifies_hash() {
        let dir = TempDir::new().unwrap();
        let pak = PakArchive::open(&sample(&dir)).unwrap();
        assert_eq!(pak.len(), 3);
        assert_eq!(
            pak.read("text/lorem.txt").unwrap(),
            "lorem ipsum ".repeat(200).into_bytes()
        );
        assert_eq!(pak.read("bin/noise.bin").unwrap().len(), 256);
        assert_eq!(pak.read("empty").unwrap(), Vec::<u8>::new());
        assert!(matches!(pak.read("missing"), Err(PakError::NotFound(_))));

        for e in pak.entries() {
            let stored = pak.read_stored(e).unwrap();
            let raw = if e.flags & FLAG_COMPRESSED != 0 {
                assert!(e.stored_size <= e.original_size);
                zstd::bulk::decompress(&stored, e.original_size as usize).unwrap()
            } else {
                assert_eq!(e.stored_size, e.original_size);
                stored
            };
            assert_eq!(hash32(&raw), e.hash);
        }
    }

    #[test]
    fn dir_offset_follows_last_payload() {
        let dir = TempDir::new().unwrap();
        let pak = PakArchive::open(&sample(&dir)).unwrap();
        let last = pak.entries().iter().max_by_key(|e| e.offset).unwrap();
        assert_eq!(last.offset + last.stored_size, pak.dir_offset());
    }

    #[test]
    fn corrupted_payload_is_detected() {
        let dir = TempDir::new().unwrap();
        let path = sample(&dir);
        let (offset, size) = {
            let pak = PakArchive::open(&path).unwrap();
            let e = pak.entry("bin/noise.bin").unwrap();
            assert!(!e.is_compressed());
            (e.offset as usize, e.stored_size as usize)
        };
        let mut bytes = fs::read(&path).unwrap();
        bytes[offset + size / 2] ^= 0xff;
        fs::write(&path, bytes).unwrap();

        let pak = PakArchive::open(&path).unwrap();
        assert!(matches!(
            pak.read("bin/noise.bin"),
            Err(PakError::HashMismatch(_))
        ));
    }

    #[test]
    fn truncated_or_unfinalized_archives_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = sample(&dir);
        let mut bytes = fs::read(&path).unwrap();
        bytes.truncate(bytes.len() - 3);
        fs::write(&path, &bytes).unwrap();
        assert!(PakArchive::open(&path).is_err());

        let raw = dir.path().join("raw.hpak");
        {
            let mut w = PakWriter::create(&raw, 3).unwrap();
            w.add_bytes("a", b"abc").unwrap();
        }
        assert!(matches!(PakArchive::open(&raw), Err(PakError::Invalid(_))));

        fs::write(&raw, b"HPAK").unwrap();
        assert!(matches!(PakArchive::open(&raw), Err(PakError::Invalid(_))));
    }

    /// Header, payloads back to back, then one record per entry.
    fn handmade(path: &Path, file_count: u32, payloads: &[(&PakEntry, &[u8])]) {
        let mut out = Vec::new();
        let body: u64 = payloads.iter().map(|(_, p)| p.len() as u64).sum();
        Header {
            file_count,
            flags: 0,
            dir_offset: HEADER_SIZE + body,
        }
        .write(&mut out)
        .unwrap();
        for (_, payload) in payloads {
            out.extend_from_slice(payload);
        }
        for (entry, _) in payloads {
            entry.write(&mut out).unwrap();
        }
        fs::write(path, out).unwrap();
    }

    #[test]
    fn record_count_larger_than_directory_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("count.hpak");
        handmade(&path, u32::MAX, &[]);
        assert!(matches!(PakArchive::open(&path), Err(PakError::Invalid(_))));

        let entry = PakEntry {
            path: "a".into(),
            offset: HEADER_SIZE,
            original_size: 1,
            stored_size: 1,
            hash: hash32(b"x"),
            flags: 0,
        };
        handmade(&path, 2, &[(&entry, b"x".as_slice())]);
        assert!(matches!(PakArchive::open(&path), Err(PakError::Invalid(_))));
    }

    #[test]
    fn inflated_original_size_is_rejected_on_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("inflated.hpak");
        let payload = zstd::bulk::compress(b"hello hello hello", 3).unwrap();
        let entry = PakEntry {
            path: "greeting.txt".into(),
            offset: HEADER_SIZE,
            original_size: 1 << 60,
            stored_size: payload.len() as u64,
            hash: hash32(b"hello hello hello"),
            flags: FLAG_COMPRESSED,
        };
        handmade(&path, 1, &[(&entry, payload.as_slice())]);

        let pak = PakArchive::open(&path).unwrap();
        assert!(matches!(
            pak.read("greeting.txt"),
            Err(PakError::Invalid(_))
        ));
    }

    #[test]
    fn trailing_garbage_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = sample(&dir);
        let mut bytes = fs::read(&path).unwrap();
        bytes.extend_from_slice(b"junk");
        fs::write(&path, &bytes).unwrap();
        assert!(matches!(PakArchive::open(&path), Err(PakError::Invalid(_))));
    }
}
