#![forbid(unsafe_code)]

use serde_json::Value;

use crate::asset::AssetMetadata;
use crate::cook::context::CookContext;
use crate::cook::error::{CookError, CookResult};
use crate::cook::format::{begin, invalid, open, ArtifactKind};
use crate::io::{read_u32, read_vec, write_u32};

pub(crate) const EXTENSION: &str = "horselevel.bin";

const KIND: ArtifactKind = ArtifactKind::Level;

/// Cooked level: entity count plus the scene document as canonical JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelArtifact {
    pub entity_count: u32,
    pub json: Vec<u8>,
}

impl LevelArtifact {
    pub fn encode(&self) -> CookResult<Vec<u8>> {
        let size = u32::try_from(self.json.len()).map_err(|_| invalid(KIND, "scene too large"))?;
        let mut out = begin(KIND);
        write_u32(&mut out, self.entity_count)?;
        write_u32(&mut out, size)?;
        out.extend_from_slice(&self.json);
        Ok(out)
    }

    pub fn decode(bytes: &[u8]) -> CookResult<Self> {
        let mut cur = open(bytes, KIND)?;
        let entity_count = read_u32(&mut cur)?;
        let size = read_u32(&mut cur)? as usize;
        let json = read_vec(&mut cur, size)?;
        Ok(Self { entity_count, json })
    }

    pub fn document(&self) -> CookResult<Value> {
        Ok(serde_json::from_slice(&self.json)?)
    }
}

pub(crate) fn cook(source: &[u8], _md: &AssetMetadata, _ctx: &CookContext<'_>) -> CookResult<Vec<u8>> {
    let doc: Value = serde_json::from_slice(source)?;
    let Value::Object(map) = &doc else {
        return Err(CookError::Parse("scene root must be a JSON object".into()));
    };
    let entity_count = match map.get("Entities") {
        None => 0,
        Some(Value::Array(entities)) => u32::try_from(entities.len())
            .map_err(|_| CookError::Parse("too many entities".into()))?,
        Some(_) => return Err(CookError::Parse("Entities must be an array".into())),
    };
    // serde_json's map is key-ordered, so this is canonical.
    let json = serde_json::to_vec(&doc)?;
    LevelArtifact { entity_count, json }.encode()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{AssetHandle, AssetRegistry, AssetType};
    use std::path::Path;

    fn md() -> AssetMetadata {
        AssetMetadata {
            handle: AssetHandle::new(21),
            asset_type: AssetType::Scene,
            file_path: "level.horselevel".into(),
        }
    }

    #[test]
    fn counts_entities_and_canonicalizes() {
        let reg = AssetRegistry::new();
        let ctx = CookContext::new(&reg, Path::new("."), "desktop");
        let a = br#"{ "Name": "test", "Entities": [ {"Id": 1}, {"Id": 2} ] }"#;
        let b = br#"{"Entities":[{"Id":1},{"Id":2}],
                     "Name":"test"}"#;

        let cooked_a = cook(a, &md(), &ctx).unwrap();
        let cooked_b = cook(b, &md(), &ctx).unwrap();
        assert_eq!(cooked_a, cooked_b);

        let level = LevelArtifact::decode(&cooked_a).unwrap();
        assert_eq!(level.entity_count, 2);
        assert_eq!(level.document().unwrap()["Name"], "test");
    }

    #[test]
    fn rejects_non_objects() {
        let reg = AssetRegistry::new();
        let ctx = CookContext::new(&reg, Path::new("."), "desktop");
        assert!(matches!(cook(b"[1, 2]", &md(), &ctx), Err(CookError::Parse(_))));
        assert!(matches!(
            cook(br#"{"Entities": 4}"#, &md(), &ctx),
            Err(CookError::Parse(_))
        ));
        assert!(matches!(cook(b"not json", &md(), &ctx), Err(CookError::Json(_))));
    }
}
