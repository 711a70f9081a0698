//! Bank record model
//!
//! One record per logical bank name. Mutators report whether they changed
//! anything, which drives dirty tracking in the store and keeps re-imports
//! idempotent: applying identical updates twice leaves the record (and the
//! disk) untouched the second time.

use bank_fs::AssetId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

fn default_version() -> String {
    "1.0".to_string()
}

/// A streamed media file tracked under one `(platform, language)` bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaReference {
    /// Media identity from the manifest.
    pub id: String,
    /// Reference to the media's binary asset.
    pub asset: AssetId,
}

/// Everything the registry knows about one bank on one platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformLocalization {
    /// Declared localization languages. Widened by manifest updates,
    /// never shrunk by media changes.
    #[serde(default)]
    pub languages: BTreeSet<String>,

    /// Bank binary per language; non-localized banks sit under the
    /// default language sentinel.
    #[serde(default)]
    pub bank_assets: BTreeMap<String, AssetId>,

    /// Streamed media per language.
    #[serde(default)]
    pub media_by_language: BTreeMap<String, Vec<MediaReference>>,
}

impl PlatformLocalization {
    /// Media ids present for `language`, for assertions and inspection.
    pub fn media_ids(&self, language: &str) -> Vec<&str> {
        self.media_by_language
            .get(language)
            .map(|refs| refs.iter().map(|r| r.id.as_str()).collect())
            .unwrap_or_default()
    }

    fn has_bank_asset(&self, asset: &AssetId) -> bool {
        self.bank_assets.values().any(|a| a == asset)
    }
}

/// One registry record per logical bank name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankRecord {
    #[serde(default = "default_version")]
    pub version: String,

    /// Unique logical name, stable across platforms.
    pub name: String,

    // Timestamps precede the per-platform tables so the document stays
    // valid TOML (values may not follow tables).
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub per_platform: BTreeMap<String, PlatformLocalization>,
}

impl BankRecord {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            version: default_version(),
            name: name.into(),
            created_at: now,
            updated_at: now,
            per_platform: BTreeMap::new(),
        }
    }

    pub fn platform(&self, platform: &str) -> Option<&PlatformLocalization> {
        self.per_platform.get(platform)
    }

    /// Widen the declared language set for `platform`.
    ///
    /// Returns `true` when any language was new. Languages are only ever
    /// added here; nothing shrinks the set.
    pub fn declare_languages<I, S>(&mut self, platform: &str, languages: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self.per_platform.entry(platform.to_string()).or_default();
        let mut changed = false;
        for language in languages {
            changed |= entry.languages.insert(language.into());
        }
        if changed {
            self.touch();
        }
        changed
    }

    /// Point `(platform, language)` at the bank's binary asset.
    ///
    /// Returns `true` when the reference was new or different.
    pub fn set_bank_asset(&mut self, platform: &str, language: &str, asset: AssetId) -> bool {
        let entry = self.per_platform.entry(platform.to_string()).or_default();
        let changed = entry.bank_assets.get(language) != Some(&asset);
        if changed {
            entry.bank_assets.insert(language.to_string(), asset);
            self.touch();
        }
        changed
    }

    /// Replace the streamed media bucket for `(platform, language)`.
    ///
    /// The incoming list is authoritative for the whole bucket, so ids are
    /// unique by construction and re-applying the same list is a no-op.
    /// The language is also added to the declared set, keeping the
    /// languages-superset invariant without a separate call.
    pub fn set_streaming_media(
        &mut self,
        platform: &str,
        language: &str,
        media: Vec<MediaReference>,
    ) -> bool {
        let entry = self.per_platform.entry(platform.to_string()).or_default();
        let mut changed = entry.languages.insert(language.to_string());

        if entry.media_by_language.get(language) != Some(&media) {
            if media.is_empty() {
                changed |= entry.media_by_language.remove(language).is_some();
            } else {
                entry.media_by_language.insert(language.to_string(), media);
                changed = true;
            }
        }

        if changed {
            self.touch();
        }
        changed
    }

    /// Remove every reference to `asset` from the `(platform, language)`
    /// bucket. Returns `true` when something was removed. Buckets emptied by
    /// the removal are dropped; the declared language set is left alone.
    pub fn remove_media(&mut self, platform: &str, language: &str, asset: &AssetId) -> bool {
        let Some(entry) = self.per_platform.get_mut(platform) else {
            return false;
        };
        let Some(bucket) = entry.media_by_language.get_mut(language) else {
            return false;
        };

        let before = bucket.len();
        bucket.retain(|r| &r.asset != asset);
        let removed = bucket.len() != before;

        if bucket.is_empty() {
            entry.media_by_language.remove(language);
        }
        if removed {
            self.touch();
        }
        removed
    }

    /// Remove the whole platform entry whose bank binary is `asset`.
    ///
    /// Returns the platform name when a match was found. Bank names are
    /// unique, so at most one platform entry per record can match.
    pub fn remove_bank_asset(&mut self, asset: &AssetId) -> Option<String> {
        let platform = self
            .per_platform
            .iter()
            .find(|(_, entry)| entry.has_bank_asset(asset))
            .map(|(platform, _)| platform.clone())?;

        self.per_platform.remove(&platform);
        self.touch();
        Some(platform)
    }

    /// True when no platform entries remain.
    pub fn is_orphaned(&self) -> bool {
        self.per_platform.is_empty()
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
