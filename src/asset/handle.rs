#![forbid(unsafe_code)]

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable 64-bit asset identity. Zero is reserved and never valid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetHandle(u64);

impl AssetHandle {
    pub const INVALID: Self = Self(0);

    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }

    /// Draws a random non-zero handle.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        loop {
            let raw: u64 = rng.gen();
            if raw != 0 {
                return Self(raw);
            }
        }
    }
}

impl fmt::Display for AssetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for AssetHandle {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}
