//! Normalized asset paths
//!
//! Import batches arrive as strings produced by an external change-detection
//! mechanism, which on some hosts reports backslash separators. All paths are
//! normalized to forward slashes internally and converted to platform-native
//! form only at I/O boundaries.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A path normalized to forward slashes.
///
/// Segment-level accessors (`segments`, `file_stem`, `extension`) drive the
/// import-convention resolver; identity derivation hashes the normalized
/// string, so equal paths always yield equal asset ids regardless of the
/// separator style they arrived with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetPath {
    inner: String,
}

impl AssetPath {
    /// Create a new AssetPath from any path-like input.
    ///
    /// Converts backslashes to forward slashes and collapses empty and `.`
    /// segments; a trailing slash is dropped.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let raw = path.as_ref().to_string_lossy().replace('\\', "/");
        let absolute = raw.starts_with('/');

        let mut inner = String::with_capacity(raw.len());
        if absolute {
            inner.push('/');
        }
        for segment in raw.split('/') {
            if segment.is_empty() || segment == "." {
                continue;
            }
            if !inner.is_empty() && !inner.ends_with('/') {
                inner.push('/');
            }
            inner.push_str(segment);
        }

        Self { inner }
    }

    /// The normalized string form.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Iterate over the non-empty path segments, including the file name.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.inner.split('/').filter(|s| !s.is_empty())
    }

    /// True when `segment` appears anywhere in the path as a whole segment.
    pub fn has_segment(&self, segment: &str) -> bool {
        self.segments().any(|s| s == segment)
    }

    /// Join this path with a further segment or relative path.
    pub fn join(&self, segment: &str) -> Self {
        if self.inner.is_empty() {
            return Self::new(segment);
        }
        Self::new(format!("{}/{}", self.inner, segment))
    }

    /// The final segment, if any.
    pub fn file_name(&self) -> Option<&str> {
        self.segments().last()
    }

    /// The file name without its extension.
    pub fn file_stem(&self) -> Option<&str> {
        let name = self.file_name()?;
        match name.rfind('.') {
            Some(0) | None => Some(name),
            Some(idx) => Some(&name[..idx]),
        }
    }

    /// The extension without the leading dot, if present.
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name()?;
        match name.rfind('.') {
            Some(0) | None => None,
            Some(idx) => Some(&name[idx + 1..]),
        }
    }

    /// The directory part of the path, without the file name.
    pub fn parent(&self) -> Option<Self> {
        let trimmed = self.inner.trim_end_matches('/');
        match trimmed.rfind('/') {
            Some(0) => Some(Self {
                inner: "/".to_string(),
            }),
            Some(idx) => Some(Self {
                inner: trimmed[..idx].to_string(),
            }),
            None => None,
        }
    }

    /// Strip `prefix` (segment-aligned) and return the remainder.
    ///
    /// An empty prefix matches everything; a prefix that is not a
    /// segment-aligned ancestor returns `None`.
    pub fn strip_prefix(&self, prefix: &AssetPath) -> Option<AssetPath> {
        if prefix.inner.is_empty() {
            return Some(self.clone());
        }
        let rest = self.inner.strip_prefix(&prefix.inner)?;
        if rest.is_empty() {
            return Some(AssetPath::new(""));
        }
        let rest = rest.strip_prefix('/')?;
        Some(AssetPath {
            inner: rest.to_string(),
        })
    }

    /// True when the path has no segments.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty() || self.inner == "/"
    }

    /// Check if this path exists on the filesystem.
    pub fn exists(&self) -> bool {
        self.to_native().exists()
    }
}

impl AsRef<Path> for AssetPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for AssetPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for AssetPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for AssetPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&Path> for AssetPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}

impl From<PathBuf> for AssetPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}
