#![forbid(unsafe_code)]

mod context;
mod cooker;
mod error;
mod format;
mod level;
mod manifest;
mod material;
mod mesh;
mod pipeline;
mod project;
mod script;
mod texture;

pub use context::{CookContext, CookOptions};
pub use cooker::{CookFn, Cooker, CookerTable};
pub use error::{CookError, CookResult};
pub use format::{ArtifactKind, ARTIFACT_VERSION};
pub use level::LevelArtifact;
pub use manifest::{CookManifest, MANIFEST_FILE_NAME};
pub use material::MaterialArtifact;
pub use mesh::{MeshArtifact, Vertex, VERTEX_STRIDE};
pub use pipeline::{cook_directory, cooked_path, AssetOutcome, CookPipeline, CookReport};
pub use project::{
    cook_project, find_project_file, ProjectArtifact, COOKED_PROJECT_NAME, PROJECT_EXTENSION,
};
pub use script::ScriptArtifact;
pub use texture::{TextureArtifact, TextureFormat};
