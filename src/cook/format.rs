#![forbid(unsafe_code)]

use std::io::Cursor;

use crate::cook::error::{CookError, CookResult};
use crate::io::{read_exact, read_u32};

/// Current version written into every cooked artifact header.
pub const ARTIFACT_VERSION: u32 = 1;

/// Kinds of cooked artifacts. Each begins with `[magic 4][version u32]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Texture,
    Mesh,
    Material,
    Level,
    Script,
    Project,
}

impl ArtifactKind {
    pub const ALL: [Self; 6] = [
        Self::Texture,
        Self::Mesh,
        Self::Material,
        Self::Level,
        Self::Script,
        Self::Project,
    ];

    pub const fn magic(self) -> [u8; 4] {
        match self {
            Self::Texture => *b"HTEX",
            Self::Mesh => *b"HMSH",
            Self::Material => *b"HMAT",
            Self::Level => *b"HLVL",
            Self::Script => *b"HSCR",
            Self::Project => *b"HPRJ",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Texture => "texture",
            Self::Mesh => "mesh",
            Self::Material => "material",
            Self::Level => "level",
            Self::Script => "script",
            Self::Project => "project",
        }
    }

    /// Identifies an artifact by its leading magic without trusting anything else.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        let head = bytes.get(..4)?;
        Self::ALL.into_iter().find(|k| k.magic() == head)
    }
}

/// Starts an artifact buffer with the kind's magic and the current version.
pub(crate) fn begin(kind: ArtifactKind) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&kind.magic());
    out.extend_from_slice(&ARTIFACT_VERSION.to_le_bytes());
    out
}

/// Checks magic and version, returning a cursor positioned at the kind-specific header.
pub(crate) fn open(bytes: &[u8], kind: ArtifactKind) -> CookResult<Cursor<&[u8]>> {
    let mut cur = Cursor::new(bytes);
    let magic = read_exact::<4>(&mut cur).map_err(|_| CookError::Invalid {
        kind: kind.name(),
        reason: "shorter than header".into(),
    })?;
    if magic != kind.magic() {
        return Err(CookError::BadMagic {
            kind: kind.name(),
            found: magic,
        });
    }
    let version = read_u32(&mut cur).map_err(|_| CookError::Invalid {
        kind: kind.name(),
        reason: "shorter than header".into(),
    })?;
    if version == 0 || version > ARTIFACT_VERSION {
        return Err(CookError::BadVersion {
            kind: kind.name(),
            version,
        });
    }
    Ok(cur)
}

pub(crate) fn invalid(kind: ArtifactKind, reason: impl Into<String>) -> CookError {
    CookError::Invalid {
        kind: kind.name(),
        reason: reason.into(),
    }
}
