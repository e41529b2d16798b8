#![forbid(unsafe_code)]

use crate::asset::AssetMetadata;
use crate::cook::context::CookContext;
use crate::cook::error::{CookError, CookResult};
use crate::cook::format::{begin, invalid, open, ArtifactKind};
use crate::io::{read_u32, read_vec, write_u32};

pub(crate) const EXTENSION: &str = "horsescript";

const KIND: ArtifactKind = ArtifactKind::Script;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptArtifact {
    pub source: String,
}

impl ScriptArtifact {
    pub fn encode(&self) -> CookResult<Vec<u8>> {
        let size =
            u32::try_from(self.source.len()).map_err(|_| invalid(KIND, "script too large"))?;
        let mut out = begin(KIND);
        write_u32(&mut out, size)?;
        out.extend_from_slice(self.source.as_bytes());
        Ok(out)
    }

    pub fn decode(bytes: &[u8]) -> CookResult<Self> {
        let mut cur = open(bytes, KIND)?;
        let size = read_u32(&mut cur)? as usize;
        let source = String::from_utf8(read_vec(&mut cur, size)?)
            .map_err(|_| invalid(KIND, "source is not UTF-8"))?;
        Ok(Self { source })
    }
}

pub(crate) fn cook(source: &[u8], _md: &AssetMetadata, _ctx: &CookContext<'_>) -> CookResult<Vec<u8>> {
    let text = std::str::from_utf8(source)
        .map_err(|_| CookError::Parse("script is not valid UTF-8".into()))?;
    ScriptArtifact {
        source: text.replace("\r\n", "\n"),
    }
    .encode()
}
