#![forbid(unsafe_code)]

use std::io::{Read, Write};

use crate::io::{read_exact, read_u16, read_u32, read_u64, write_u16, write_u32, write_u64};
use crate::pak::error::{PakError, PakResult};

/// HPAK v1 header magic.
pub const MAGIC: [u8; 4] = *b"HPAK";

pub const VERSION: u32 = 1;

/// `[magic 4][version u32][file_count u32][flags u32][dir_offset u64]`
pub const HEADER_SIZE: u64 = 24;

/// Smallest directory record: an empty path plus the fixed fields.
pub(crate) const MIN_RECORD_SIZE: u64 = 2 + 8 + 8 + 8 + 4 + 4;

/// Entry flag: stored bytes are zstd-compressed.
pub const FLAG_COMPRESSED: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Header {
    pub file_count: u32,
    pub flags: u32,
    pub dir_offset: u64,
}

impl Header {
    pub fn write(&self, w: &mut dyn Write) -> PakResult<()> {
        w.write_all(&MAGIC)?;
        write_u32(w, VERSION)?;
        write_u32(w, self.file_count)?;
        write_u32(w, self.flags)?;
        write_u64(w, self.dir_offset)?;
        Ok(())
    }

    pub fn read(r: &mut dyn Read) -> PakResult<Self> {
        let magic = read_exact::<4>(r)?;
        if magic != MAGIC {
            return Err(PakError::Invalid("bad header magic".into()));
        }
        let version = read_u32(r)?;
        if version != VERSION {
            return Err(PakError::Invalid(format!("unsupported version {version}")));
        }
        Ok(Self {
            file_count: read_u32(r)?,
            flags: read_u32(r)?,
            dir_offset: read_u64(r)?,
        })
    }
}

/// One directory record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PakEntry {
    /// Virtual, `/`-separated.
    pub path: String,
    pub offset: u64,
    pub original_size: u64,
    pub stored_size: u64,
    /// Integrity hash of the original, uncompressed bytes.
    pub hash: u32,
    pub flags: u32,
}

impl PakEntry {
    pub fn is_compressed(&self) -> bool {
        self.flags & FLAG_COMPRESSED != 0
    }

    pub(crate) fn write(&self, w: &mut dyn Write) -> PakResult<()> {
        let p = self.path.as_bytes();
        let len = u16::try_from(p.len())
            .map_err(|_| PakError::Invalid(format!("path too long: {}", self.path)))?;
        write_u16(w, len)?;
        w.write_all(p)?;
        write_u64(w, self.offset)?;
        write_u64(w, self.original_size)?;
        write_u64(w, self.stored_size)?;
        write_u32(w, self.hash)?;
        write_u32(w, self.flags)?;
        Ok(())
    }

    pub(crate) fn read(r: &mut dyn Read) -> PakResult<Self> {
        let path_len = read_u16(r)? as usize;
        let mut path_bytes = vec![0u8; path_len];
        r.read_exact(&mut path_bytes)?;
        let path =
            String::from_utf8(path_bytes).map_err(|_| PakError::Invalid("path is not utf8".into()))?;
        Ok(Self {
            path,
            offset: read_u64(r)?,
            original_size: read_u64(r)?,
            stored_size: read_u64(r)?,
            hash: read_u32(r)?,
            flags: read_u32(r)?,
        })
    }

    /// Size and flag invariants every record must satisfy.
    pub(crate) fn check(&self) -> PakResult<()> {
        if self.flags & !FLAG_COMPRESSED != 0 {
            return Err(PakError::Invalid(format!(
                "unknown flags {:#x}: {}",
                self.flags, self.path
            )));
        }
        let ok = if self.is_compressed() {
            self.stored_size <= self.original_size
        } else {
            self.stored_size == self.original_size
        };
        if !ok {
            return Err(PakError::Invalid(format!(
                "stored size {} inconsistent with original size {}: {}",
                self.stored_size, self.original_size, self.path
            )));
        }
        Ok(())
    }
}

/// Public view of a pak entry (for listings and inspectors).
#[derive(Debug, Clone)]
pub struct EntryInfo {
    pub path: String,
    pub offset: u64,
    pub original_size: u64,
    pub stored_size: u64,
    /// "raw" or "zstd"
    pub storage: &'static str,
    pub hash_hex: String,
}

impl From<&PakEntry> for EntryInfo {
    fn from(e: &PakEntry) -> Self {
        Self {
            path: e.path.clone(),
            offset: e.offset,
            original_size: e.original_size,
            stored_size: e.stored_size,
            storage: if e.is_compressed() { "zstd" } else { "raw" },
            hash_hex: format!("{:08x}", e.hash),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn header_is_fixed_size() {
        let mut buf = Vec::new();
        Header {
            file_count: 2,
            flags: 0,
            dir_offset: 99,
        }
        .write(&mut buf)
        .unwrap();
        assert_eq!(buf.len() as u64, HEADER_SIZE);
        assert_eq!(&buf[..4], b"HPAK");

        let h = Header::read(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(h.file_count, 2);
        assert_eq!(h.dir_offset, 99);
    }

    #[test]
    fn header_rejects_other_formats() {
        let mut buf = b"PACK\x01\x00\x00\x00".to_vec();
        buf.resize(HEADER_SIZE as usize, 0);
        assert!(matches!(
            Header::read(&mut Cursor::new(&buf)),
            Err(PakError::Invalid(_))
        ));
    }

    #[test]
    fn record_layout() {
        let e = PakEntry {
            path: "textures/a.horsetex".into(),
            offset: 24,
            original_size: 100,
            stored_size: 40,
            hash: 0xdead_beef,
            flags: FLAG_COMPRESSED,
        };
        let mut buf = Vec::new();
        e.write(&mut buf).unwrap();
        assert_eq!(buf.len(), 2 + e.path.len() + 8 * 3 + 4 + 4);
        assert_eq!(PakEntry::read(&mut Cursor::new(&buf)).unwrap(), e);
        assert!(e.check().is_ok());
        assert_eq!(EntryInfo::from(&e).hash_hex, "deadbeef");
    }

    #[test]
    fn size_flag_invariant() {
        let mut e = PakEntry {
            path: "a".into(),
            offset: 24,
            original_size: 10,
            stored_size: 11,
            hash: 0,
            flags: FLAG_COMPRESSED,
        };
        assert!(e.check().is_err());
        e.flags = 0;
        assert!(e.check().is_err());
        e.stored_size = 10;
        assert!(e.check().is_ok());
        e.flags = 4;
        assert!(e.check().is_err());
    }
}
