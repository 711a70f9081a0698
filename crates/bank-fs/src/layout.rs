//! Import-convention resolver
//!
//! Generated audio assets land under a single import root laid out as
//! `<root>/<platform>[/<language>[/...]]/<name>.<ext>`. Files directly under
//! the platform directory carry no localization and map to the default
//! language; anything nested one level deeper is localized.

use crate::path::AssetPath;
use serde::{Deserialize, Serialize};

/// Language assigned to files that sit directly under a platform directory.
pub const DEFAULT_LANGUAGE: &str = "default";

/// The identity resolved from an imported file path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetIdentity {
    /// Logical name, the file stem without extension.
    pub name: String,
    /// Platform directory the file was imported under.
    pub platform: String,
    /// Language directory, or [`DEFAULT_LANGUAGE`] for unlocalized files.
    pub language: String,
}

impl AssetIdentity {
    /// True when the file sat directly under its platform directory.
    pub fn is_default_language(&self) -> bool {
        self.language == DEFAULT_LANGUAGE
    }
}

impl std::fmt::Display for AssetIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}/{}]", self.name, self.platform, self.language)
    }
}

/// Resolves imported file paths against the generated-asset layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportLayout {
    /// Root directory all generated assets live under.
    pub root: AssetPath,
    /// Directory segment for externally sourced media, exempt from the
    /// platform/language convention.
    pub external_sources: String,
}

impl ImportLayout {
    pub fn new(root: impl Into<AssetPath>, external_sources: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            external_sources: external_sources.into(),
        }
    }

    /// Resolve a path to its identity, or `None` when the path does not
    /// follow the convention.
    ///
    /// `None` covers paths outside the root and paths directly under the
    /// root with no platform directory. Externally sourced media resolves
    /// like anything else; its special treatment is a manifest-lookup
    /// concern, checked via [`ImportLayout::is_external_source`].
    pub fn resolve(&self, path: &AssetPath) -> Option<AssetIdentity> {
        let relative = path.strip_prefix(&self.root)?;
        let segments: Vec<&str> = relative.segments().collect();
        // Need at least a platform directory and a file name.
        if segments.len() < 2 {
            return None;
        }

        let platform = segments[0].to_string();
        let language = if segments.len() >= 3 {
            segments[1].to_string()
        } else {
            DEFAULT_LANGUAGE.to_string()
        };
        let name = relative.file_stem()?.to_string();

        Some(AssetIdentity {
            name,
            platform,
            language,
        })
    }

    /// Reconstruct the canonical path for an identity.
    ///
    /// Default-language assets omit the language segment, mirroring how the
    /// generator lays them out.
    pub fn path_for(&self, identity: &AssetIdentity, extension: &str) -> AssetPath {
        let mut path = self.root.join(&identity.platform);
        if !identity.is_default_language() {
            path = path.join(&identity.language);
        }
        path.join(&format!("{}.{}", identity.name, extension))
    }

    /// True when `path` passes through the external-sources directory under
    /// this layout's root.
    pub fn is_external_source(&self, path: &AssetPath) -> bool {
        path.strip_prefix(&self.root)
            .is_some_and(|relative| relative.has_segment(&self.external_sources))
    }

    /// True when `path` lives under this layout's root.
    pub fn contains(&self, path: &AssetPath) -> bool {
        path.strip_prefix(&self.root).is_some()
    }
}
