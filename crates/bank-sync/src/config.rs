//! Engine configuration
//!
//! Everything is optional in the TOML form; defaults match the layout the
//! audio toolchain generates out of the box.

use crate::Result;
use bank_fs::ImportLayout;
use serde::{Deserialize, Serialize};

fn default_import_root() -> String {
    "GeneratedSoundBanks".to_string()
}

fn default_bank_extension() -> String {
    "bnk".to_string()
}

fn default_media_extension() -> String {
    "wem".to_string()
}

fn default_external_sources() -> String {
    "ExternalSources".to_string()
}

fn default_init_bank_name() -> String {
    "Init".to_string()
}

fn default_workers() -> usize {
    4
}

fn default_entry_labels() -> Vec<String> {
    vec!["Remote_Assets".to_string(), "Remote_Sounds".to_string()]
}

fn default_registry_dir() -> String {
    "registry/banks".to_string()
}

fn default_manifest_dir() -> String {
    "manifests".to_string()
}

fn default_group_ledger() -> String {
    "registry/groups.toml".to_string()
}

/// What to do when a deleted media asset is referenced by several banks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MediaRemovalPolicy {
    /// Remove the reference from every bank that carries it.
    #[default]
    EveryBank,
    /// Stop scanning after the first bank that matched.
    FirstMatch,
}

/// Engine configuration, parsed from `bankreg.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Directory all generated assets live under.
    #[serde(default = "default_import_root")]
    pub import_root: String,

    /// Extension identifying bank files.
    #[serde(default = "default_bank_extension")]
    pub bank_extension: String,

    /// Extension identifying streamed media files.
    #[serde(default = "default_media_extension")]
    pub media_extension: String,

    /// Directory segment whose media is exempt from manifest-miss warnings.
    #[serde(default = "default_external_sources")]
    pub external_sources: String,

    /// Logical name of the always-loaded initialization bank.
    #[serde(default = "default_init_bank_name")]
    pub init_bank_name: String,

    /// Worker threads for the resolution phase.
    #[serde(default = "default_workers")]
    pub workers: usize,

    #[serde(default)]
    pub media_removal: MediaRemovalPolicy,

    /// Labels attached to every assigned group entry.
    #[serde(default = "default_entry_labels")]
    pub entry_labels: Vec<String>,

    /// Directory of persisted bank record documents.
    #[serde(default = "default_registry_dir")]
    pub registry_dir: String,

    /// Directory of per-platform manifest documents.
    #[serde(default = "default_manifest_dir")]
    pub manifest_dir: String,

    /// Path of the group ledger document.
    #[serde(default = "default_group_ledger")]
    pub group_ledger: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            import_root: default_import_root(),
            bank_extension: default_bank_extension(),
            media_extension: default_media_extension(),
            external_sources: default_external_sources(),
            init_bank_name: default_init_bank_name(),
            workers: default_workers(),
            media_removal: MediaRemovalPolicy::default(),
            entry_labels: default_entry_labels(),
            registry_dir: default_registry_dir(),
            manifest_dir: default_manifest_dir(),
            group_ledger: default_group_ledger(),
        }
    }
}

impl SyncConfig {
    /// Parse a configuration from TOML content.
    ///
    /// # Example
    ///
    /// ```
    /// use bank_sync::SyncConfig;
    ///
    /// let config = SyncConfig::parse(r#"
    /// import_root = "Assets/Audio/Banks"
    /// workers = 8
    /// "#).unwrap();
    ///
    /// assert_eq!(config.import_root, "Assets/Audio/Banks");
    /// assert_eq!(config.bank_extension, "bnk");
    /// ```
    pub fn parse(content: &str) -> Result<Self> {
        let config: SyncConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// The import-convention resolver this configuration describes.
    pub fn layout(&self) -> ImportLayout {
        ImportLayout::new(self.import_root.as_str(), self.external_sources.as_str())
    }
}
