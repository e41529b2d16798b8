#![forbid(unsafe_code)]

mod build;
mod error;
mod format;
mod ops;
mod read;

pub use build::{pack_directory, PackOptions, PackReport, PakSummary, PakWriter, DEFAULT_ZSTD_LEVEL};
pub use error::{PakError, PakResult};
pub use format::{EntryInfo, PakEntry, FLAG_COMPRESSED, HEADER_SIZE, MAGIC, VERSION};
pub use ops::{entries, extract, list, package, verify, PackageReport, ARCHIVE_FILE_NAME};
pub use read::PakArchive;
