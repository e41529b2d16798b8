#![forbid(unsafe_code)]

use serde::Deserialize;

use crate::asset::{AssetHandle, AssetMetadata};
use crate::cook::context::CookContext;
use crate::cook::error::CookResult;
use crate::cook::format::{begin, invalid, open, ArtifactKind};
use crate::io::{read_f32, read_u64, write_f32, write_u64};

pub(crate) const EXTENSION: &str = "horsemat.bin";

const KIND: ArtifactKind = ArtifactKind::Material;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
struct MaterialSource {
    #[serde(default = "default_albedo")]
    albedo: [f32; 4],
    #[serde(default = "default_roughness")]
    roughness: f32,
    #[serde(default)]
    metallic: f32,
    #[serde(default)]
    albedo_texture: Option<String>,
    #[serde(default)]
    normal_texture: Option<String>,
}

fn default_albedo() -> [f32; 4] {
    [1.0; 4]
}

fn default_roughness() -> f32 {
    0.5
}

/// Cooked material. Fixed-size; texture references are handles (0 = none).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialArtifact {
    pub albedo: [f32; 4],
    pub roughness: f32,
    pub metallic: f32,
    pub albedo_texture: AssetHandle,
    pub normal_texture: AssetHandle,
}

impl MaterialArtifact {
    pub fn encode(&self) -> CookResult<Vec<u8>> {
        let mut out = begin(KIND);
        for c in self.albedo {
            write_f32(&mut out, c)?;
        }
        write_f32(&mut out, self.roughness)?;
        write_f32(&mut out, self.metallic)?;
        write_u64(&mut out, self.albedo_texture.get())?;
        write_u64(&mut out, self.normal_texture.get())?;
        Ok(out)
    }

    pub fn decode(bytes: &[u8]) -> CookResult<Self> {
        let mut cur = open(bytes, KIND)?;
        let mut albedo = [0f32; 4];
        for c in &mut albedo {
            *c = read_f32(&mut cur)?;
        }
        let roughness = read_f32(&mut cur)?;
        let metallic = read_f32(&mut cur)?;
        let albedo_texture = AssetHandle::new(read_u64(&mut cur)?);
        let normal_texture = AssetHandle::new(read_u64(&mut cur)?);
        Ok(Self {
            albedo,
            roughness,
            metallic,
            albedo_texture,
            normal_texture,
        })
    }
}

pub(crate) fn cook(source: &[u8], md: &AssetMetadata, ctx: &CookContext<'_>) -> CookResult<Vec<u8>> {
    let src: MaterialSource = serde_json::from_slice(source)?;
    if !(0.0..=1.0).contains(&src.roughness) || !(0.0..=1.0).contains(&src.metallic) {
        return Err(invalid(KIND, "roughness and metallic must lie in 0..=1"));
    }
    MaterialArtifact {
        albedo: src.albedo,
        roughness: src.roughness,
        metallic: src.metallic,
        albedo_texture: ctx.resolve(src.albedo_texture.as_deref(), &md.file_path),
        normal_texture: ctx.resolve(src.normal_texture.as_deref(), &md.file_path),
    }
    .encode()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{AssetRegistry, AssetType};
    use crate::cook::CookError;
    use std::fs;
    use tempfile::TempDir;

    fn md() -> AssetMetadata {
        AssetMetadata {
            handle: AssetHandle::new(11),
            asset_type: AssetType::Material,
            file_path: "materials/hero.horsemat".into(),
        }
    }

    #[test]
    fn resolves_texture_references() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("textures")).unwrap();
        fs::write(dir.path().join("textures/hero.png"), b"x").unwrap();
        let mut reg = AssetRegistry::new();
        reg.initialize(dir.path()).unwrap();
        let tex = reg.metadata_by_path("textures/hero.png").unwrap().handle;

        let ctx = CookContext::new(&reg, dir.path(), "desktop");
        let src = br#"{ "Albedo": [0.5, 0.25, 1.0, 1.0], "Metallic": 1.0,
                        "AlbedoTexture": "textures/hero.png",
                        "NormalTexture": "textures/missing.png" }"#;
        let bytes = cook(src, &md(), &ctx).unwrap();
        assert_eq!(bytes.len(), 8 + 6 * 4 + 2 * 8);

        let mat = MaterialArtifact::decode(&bytes).unwrap();
        assert_eq!(mat.albedo, [0.5, 0.25, 1.0, 1.0]);
        assert_eq!(mat.roughness, 0.5);
        assert_eq!(mat.metallic, 1.0);
        assert_eq!(mat.albedo_texture, tex);
        assert_eq!(mat.normal_texture, AssetHandle::INVALID);
    }

    #[test]
    fn rejects_bad_sources() {
        let reg = AssetRegistry::new();
        let ctx = CookContext::new(&reg, std::path::Path::new("."), "desktop");
        assert!(matches!(cook(b"{", &md(), &ctx), Err(CookError::Json(_))));
        assert!(matches!(
            cook(br#"{ "Shininess": 3 }"#, &md(), &ctx),
            Err(CookError::Json(_))
        ));
        assert!(matches!(
            cook(br#"{ "Roughness": 2.0 }"#, &md(), &ctx),
            Err(CookError::Invalid { .. })
        ));
    }
}
