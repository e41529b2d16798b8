#![forbid(unsafe_code)]

mod error;
mod handle;
mod metadata;
mod registry;
mod types;

pub use error::{AssetError, AssetResult};
pub use handle::AssetHandle;
pub use metadata::{sidecar_path, AssetMetadata, Sidecar, SIDECAR_EXTENSION};
pub use registry::{AssetRegistry, ScanReport};
pub use types::AssetType;
