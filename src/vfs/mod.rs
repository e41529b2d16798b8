#![forbid(unsafe_code)]

mod dir_device;
mod error;
mod overlay;
mod pak_device;

pub use dir_device::DirDevice;
pub use error::{VfsError, VfsResult};
pub use overlay::Vfs;
pub use pak_device::PakDevice;

/// A mounted source of files. Paths handed to a device are canonical and
/// relative to its mount point; `""` names the device root.
pub trait Device: Send + Sync {
    fn exists(&self, path: &str) -> bool;

    fn read(&self, path: &str) -> Option<Vec<u8>>;

    /// Names of the immediate children of `dir`, sorted.
    fn list(&self, dir: &str) -> Vec<String>;

    fn describe(&self) -> String;
}
