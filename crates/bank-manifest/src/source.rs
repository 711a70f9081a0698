//! Manifest sources
//!
//! The engine reads manifests through the [`ManifestSource`] trait so tests
//! and embedders can supply their own. The shipped implementation reads one
//! TOML document per platform from a directory and caches parse results for
//! the lifetime of a batch; both hits and misses are cached, since a batch
//! may probe the same missing platform hundreds of times.

use crate::error::{Error, Result};
use crate::model::PlatformManifest;
use bank_fs::io;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Read-only oracle for per-platform manifests.
pub trait ManifestSource: Send + Sync {
    /// The manifest for `platform`, or `None` when the platform has no
    /// manifest document.
    fn platform_manifest(&self, platform: &str) -> Result<Option<Arc<PlatformManifest>>>;

    /// Drop any cached state so the next lookup re-reads the backing store.
    fn invalidate(&self);
}

/// Directory-backed source: `<dir>/<platform>.toml` per platform.
pub struct TomlManifestSource {
    dir: PathBuf,
    cache: RwLock<BTreeMap<String, Option<Arc<PlatformManifest>>>>,
}

impl TomlManifestSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cache: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn manifest_path(&self, platform: &str) -> PathBuf {
        self.dir.join(format!("{platform}.toml"))
    }

    fn load(&self, platform: &str) -> Result<Option<Arc<PlatformManifest>>> {
        let path = self.manifest_path(platform);
        if !path.exists() {
            debug!(platform, path = %path.display(), "no manifest document");
            return Ok(None);
        }
        let text = io::read_locked(&path)?;
        let manifest = PlatformManifest::parse(&text).map_err(|source| Error::Parse {
            platform: platform.to_string(),
            source,
        })?;
        debug!(platform, banks = manifest.bank_names().count(), "parsed manifest");
        Ok(Some(Arc::new(manifest)))
    }
}

impl ManifestSource for TomlManifestSource {
    fn platform_manifest(&self, platform: &str) -> Result<Option<Arc<PlatformManifest>>> {
        if let Some(cached) = self.cache.read().unwrap().get(platform) {
            return Ok(cached.clone());
        }

        let loaded = self.load(platform)?;
        let mut cache = self.cache.write().unwrap();
        let entry = cache
            .entry(platform.to_string())
            .or_insert_with(|| loaded.clone());
        Ok(entry.clone())
    }

    fn invalidate(&self) {
        self.cache.write().unwrap().clear();
        debug!("cleared manifest cache");
    }
}

/// In-memory source for tests and embedders that build manifests
/// programmatically.
#[derive(Default)]
pub struct MemoryManifestSource {
    manifests: RwLock<BTreeMap<String, Arc<PlatformManifest>>>,
}

impl MemoryManifestSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, platform: impl Into<String>, manifest: PlatformManifest) {
        self.manifests
            .write()
            .unwrap()
            .insert(platform.into(), Arc::new(manifest));
    }
}

impl ManifestSource for MemoryManifestSource {
    fn platform_manifest(&self, platform: &str) -> Result<Option<Arc<PlatformManifest>>> {
        Ok(self.manifests.read().unwrap().get(platform).cloned())
    }

    fn invalidate(&self) {}
}

/// Write `manifest` as `<dir>/<platform>.toml`, creating the directory as
/// needed. Used by fixtures and by tooling that mirrors manifests in from
/// the audio toolchain.
pub fn write_manifest(dir: &Path, platform: &str, manifest: &PlatformManifest) -> Result<()> {
    let text = manifest.to_toml()?;
    io::write_atomic(&dir.join(format!("{platform}.toml")), &text)?;
    Ok(())
}
