//! Manifest data model
//!
//! One `PlatformManifest` per platform, declaring for every bank the
//! languages it is generated in and the streamed media ids each language
//! carries:
//!
//! ```toml
//! version = "1.0"
//!
//! [banks.Music.English]
//! media = ["955558531", "955558532"]
//!
//! [banks.Music.default]
//! media = []
//! ```
//!
//! A reverse media-id index is derived on load so the engine can answer
//! "which banks reference this media id" without scanning.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_version() -> String {
    "1.0".to_string()
}

/// Streamed media ids declared for one language of one bank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageEntry {
    #[serde(default)]
    pub media: Vec<String>,
}

/// Manifest entry for a single bank: language -> streamed media ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BankManifest {
    languages: BTreeMap<String, LanguageEntry>,
}

impl BankManifest {
    /// Declared languages, in stable order.
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.languages.keys().map(String::as_str)
    }

    pub fn has_language(&self, language: &str) -> bool {
        self.languages.contains_key(language)
    }

    /// Media ids declared for `language`, or `None` when the language is
    /// not in the declared set.
    pub fn media(&self, language: &str) -> Option<&[String]> {
        self.languages.get(language).map(|e| e.media.as_slice())
    }
}

/// The full manifest for one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformManifest {
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    banks: BTreeMap<String, BankManifest>,

    // Derived: media id -> names of banks referencing it.
    #[serde(skip)]
    media_index: BTreeMap<String, Vec<String>>,
}

impl Default for PlatformManifest {
    fn default() -> Self {
        Self {
            version: default_version(),
            banks: BTreeMap::new(),
            media_index: BTreeMap::new(),
        }
    }
}

impl PlatformManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a manifest document and build the reverse media index.
    pub fn parse(text: &str) -> std::result::Result<Self, toml::de::Error> {
        let mut manifest: Self = toml::from_str(text)?;
        manifest.rebuild_index();
        Ok(manifest)
    }

    /// Serialize back to the document form.
    pub fn to_toml(&self) -> crate::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn bank(&self, name: &str) -> Option<&BankManifest> {
        self.banks.get(name)
    }

    pub fn contains_bank(&self, name: &str) -> bool {
        self.banks.contains_key(name)
    }

    pub fn bank_names(&self) -> impl Iterator<Item = &str> {
        self.banks.keys().map(String::as_str)
    }

    /// Names of banks referencing `media_id`, in stable order.
    pub fn banks_for_media(&self, media_id: &str) -> &[String] {
        self.media_index
            .get(media_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Declare `media` ids for `(bank, language)`, creating the bank and
    /// language entries as needed. An empty list declares the language
    /// without media.
    pub fn declare_media<I, S>(&mut self, bank: &str, language: &str, media: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self
            .banks
            .entry(bank.to_string())
            .or_default()
            .languages
            .entry(language.to_string())
            .or_default();
        entry.media = media.into_iter().map(Into::into).collect();
        self.rebuild_index();
    }

    fn rebuild_index(&mut self) {
        self.media_index.clear();
        for (bank_name, bank) in &self.banks {
            for entry in bank.languages.values() {
                for id in &entry.media {
                    let refs = self.media_index.entry(id.clone()).or_default();
                    if !refs.contains(bank_name) {
                        refs.push(bank_name.clone());
                    }
                }
            }
        }
    }
}
