//! [`ImportTree`] builder for synchronization test scenarios.
//!
//! Extracted from the per-crate test fixtures to enable reuse across the
//! workspace: one temporary directory holding the import root, the manifest
//! directory, the record store and the group ledger.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use bank_fs::AssetPath;
use bank_groups::GroupLedger;
use bank_manifest::{write_manifest, PlatformManifest, TomlManifestSource};
use bank_registry::RecordStore;
use bank_sync::{SyncConfig, SyncEngine};

/// A temporary import tree with helper methods for test setup and assertion.
///
/// # Example
///
/// ```rust,no_run
/// use bank_manifest::PlatformManifest;
/// use bank_test_utils::tree::ImportTree;
///
/// let tree = ImportTree::new();
/// let mut manifest = PlatformManifest::new();
/// manifest.declare_media("Music", "English", ["804841978"]);
/// tree.write_manifest("Windows", &manifest);
///
/// let (mut engine, _ledger) = tree.build_engine();
/// let added = vec![tree.bank_path("Windows", Some("English"), "Music")];
/// engine.apply(&added, &[]).unwrap();
/// tree.assert_record_exists("Music");
/// ```
pub struct ImportTree {
    temp_dir: TempDir,
    config: SyncConfig,
}

impl Default for ImportTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportTree {
    /// Create an empty tree with the default configuration.
    pub fn new() -> Self {
        Self::with_config(SyncConfig::default())
    }

    /// Create an empty tree with an explicit configuration.
    pub fn with_config(config: SyncConfig) -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
            config,
        }
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// The configuration this tree was built with.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Write `manifest` as the platform's manifest document under the
    /// configured manifest directory.
    pub fn write_manifest(&self, platform: &str, manifest: &PlatformManifest) {
        write_manifest(
            &self.root().join(&self.config.manifest_dir),
            platform,
            manifest,
        )
        .expect("ImportTree::write_manifest: failed to write manifest");
    }

    /// Import-relative path of a bank file, e.g.
    /// `GeneratedSoundBanks/Windows/English/Music.bnk`.
    pub fn bank_path(&self, platform: &str, language: Option<&str>, name: &str) -> AssetPath {
        self.asset_path(platform, language, name, &self.config.bank_extension)
    }

    /// Import-relative path of a streamed media file, e.g.
    /// `GeneratedSoundBanks/Windows/English/804841978.wem`.
    pub fn media_path(&self, platform: &str, language: Option<&str>, id: &str) -> AssetPath {
        self.asset_path(platform, language, id, &self.config.media_extension)
    }

    fn asset_path(&self, platform: &str, language: Option<&str>, stem: &str, ext: &str) -> AssetPath {
        let mut path = AssetPath::new(&self.config.import_root).join(platform);
        if let Some(language) = language {
            path = path.join(language);
        }
        path.join(&format!("{stem}.{ext}"))
    }

    /// Create the physical file for `path` under the tree root, mirroring
    /// what an audio build drops on disk before a batch is applied.
    pub fn touch(&self, path: &AssetPath) {
        let full = self.root().join(path.to_native());
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, b"").unwrap();
    }

    /// Build an engine over this tree's stores. The ledger handle is
    /// returned alongside so tests can assert on group state directly.
    pub fn build_engine(&self) -> (SyncEngine, Arc<GroupLedger>) {
        let records = RecordStore::open(self.root().join(&self.config.registry_dir))
            .expect("ImportTree::build_engine: failed to open record store");
        let manifests = TomlManifestSource::new(self.root().join(&self.config.manifest_dir));
        let ledger = Arc::new(
            GroupLedger::open(self.root().join(&self.config.group_ledger))
                .expect("ImportTree::build_engine: failed to open group ledger"),
        );
        let engine = SyncEngine::new(self.config.clone(), records, Arc::new(manifests))
            .with_group_store(ledger.clone());
        (engine, ledger)
    }

    /// Re-read the record store from disk, seeing only persisted state.
    pub fn reopen_records(&self) -> RecordStore {
        RecordStore::open(self.root().join(&self.config.registry_dir))
            .expect("ImportTree::reopen_records: failed to open record store")
    }

    /// Assert that the record document for `name` exists on disk.
    ///
    /// # Panics
    /// Panics with a descriptive message if the document does not exist.
    pub fn assert_record_exists(&self, name: &str) {
        let path = self.record_path(name);
        assert!(
            path.exists(),
            "Expected record document to exist: {}",
            path.display()
        );
    }

    /// Assert that the record document for `name` does **not** exist on disk.
    ///
    /// # Panics
    /// Panics with a descriptive message if the document exists.
    pub fn assert_record_absent(&self, name: &str) {
        let path = self.record_path(name);
        assert!(
            !path.exists(),
            "Expected record document NOT to exist: {}",
            path.display()
        );
    }

    fn record_path(&self, name: &str) -> PathBuf {
        self.root()
            .join(&self.config.registry_dir)
            .join(format!("{name}.toml"))
    }
}
