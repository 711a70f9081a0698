//! Deterministic asset identifiers
//!
//! The registry stores references to asset files rather than paths, so
//! records survive project relocation. An id is derived from the normalized
//! path string, which keeps derivation stable across hosts and separator
//! styles.

use crate::path::AssetPath;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

const ID_LEN: usize = 32;

/// An opaque reference to an asset file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    /// Derive the id for an asset path.
    pub fn for_path(path: &AssetPath) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(path.as_str().as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        Self(digest[..ID_LEN].to_string())
    }

    /// Wrap an already-derived id, e.g. one read back from a store.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
