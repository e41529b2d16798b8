#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AssetType {
    #[default]
    None,
    Texture,
    Mesh,
    Material,
    Scene,
    Script,
    Prefab,
}

const EXTENSIONS: &[(&str, AssetType)] = &[
    ("png", AssetType::Texture),
    ("jpg", AssetType::Texture),
    ("jpeg", AssetType::Texture),
    ("bmp", AssetType::Texture),
    ("tga", AssetType::Texture),
    ("obj", AssetType::Mesh),
    ("gltf", AssetType::Mesh),
    ("glb", AssetType::Mesh),
    ("fbx", AssetType::Mesh),
    ("horsemat", AssetType::Material),
    ("horselevel", AssetType::Scene),
    ("horsescene", AssetType::Scene),
    ("lua", AssetType::Script),
    ("js", AssetType::Script),
    ("cs", AssetType::Script),
    ("horseprefab", AssetType::Prefab),
];

impl AssetType {
    pub const ALL: [Self; 6] = [
        Self::Texture,
        Self::Mesh,
        Self::Material,
        Self::Scene,
        Self::Script,
        Self::Prefab,
    ];

    /// Maps a file extension (without the dot, any case) to its asset type.
    pub fn from_extension(ext: &str) -> Self {
        EXTENSIONS
            .iter()
            .find(|(e, _)| e.eq_ignore_ascii_case(ext))
            .map_or(Self::None, |(_, t)| *t)
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map_or(Self::None, Self::from_extension)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Texture => "Texture",
            Self::Mesh => "Mesh",
            Self::Material => "Material",
            Self::Scene => "Scene",
            Self::Script => "Script",
            Self::Prefab => "Prefab",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
