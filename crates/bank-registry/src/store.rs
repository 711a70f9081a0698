//! Persisted record store
//!
//! The store is an arena of bank records keyed by name, backed by one TOML
//! document per record under a store directory. During a batch, lookups may
//! come from parallel resolution workers; creation uses a
//! lookup-then-atomic-insert pattern so at most one record instance exists
//! per name. Nothing is written until `save_all`, which flushes every record
//! touched since the last flush in one pass.

use crate::error::{Error, Result};
use crate::record::BankRecord;
use bank_fs::io;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, warn};

/// Shared handle to one record; mutation goes through the lock.
pub type BankHandle = Arc<Mutex<BankRecord>>;

pub struct RecordStore {
    dir: PathBuf,
    records: RwLock<BTreeMap<String, BankHandle>>,
    dirty: Mutex<BTreeSet<String>>,
}

impl RecordStore {
    /// Open a store directory, loading every record document in it.
    ///
    /// Malformed documents are skipped with a warning rather than failing
    /// the whole store; a corrupt record should not block synchronization
    /// of the healthy ones.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| bank_fs::Error::io(&dir, e))?;

        let mut records = BTreeMap::new();
        for entry in fs::read_dir(&dir).map_err(|e| bank_fs::Error::io(&dir, e))? {
            let entry = entry.map_err(|e| bank_fs::Error::io(&dir, e))?;
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') || path.extension().and_then(|e| e.to_str()) != Some("toml") {
                continue;
            }
            match load_record(&path) {
                Ok(record) => {
                    records.insert(record.name.clone(), Arc::new(Mutex::new(record)));
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping malformed record");
                }
            }
        }
        debug!(dir = %dir.display(), count = records.len(), "opened record store");

        Ok(Self {
            dir,
            records: RwLock::new(records),
            dirty: Mutex::new(BTreeSet::new()),
        })
    }

    pub fn record_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.toml"))
    }

    pub fn find(&self, name: &str) -> Option<BankHandle> {
        self.records.read().unwrap().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.read().unwrap().contains_key(name)
    }

    /// Locate the record for `name`, creating it when absent.
    ///
    /// Safe against concurrent creation attempts: the second caller for the
    /// same name gets the instance the first one inserted. A fresh record is
    /// marked dirty immediately so an item that fails after creation still
    /// gets its empty record cleaned up at flush time.
    pub fn find_or_create(&self, name: &str) -> (BankHandle, bool) {
        if let Some(handle) = self.find(name) {
            return (handle, false);
        }

        let (handle, created) = {
            let mut records = self.records.write().unwrap();
            match records.entry(name.to_string()) {
                Entry::Occupied(e) => (e.get().clone(), false),
                Entry::Vacant(v) => {
                    let handle = Arc::new(Mutex::new(BankRecord::new(name)));
                    v.insert(handle.clone());
                    (handle, true)
                }
            }
        };

        if created {
            self.mark_dirty(name);
            debug!(name, "created bank record");
        }
        (handle, created)
    }

    /// Queue `name` for the next `save_all`.
    pub fn mark_dirty(&self, name: &str) {
        self.dirty.lock().unwrap().insert(name.to_string());
    }

    /// Flush every dirty record to disk.
    ///
    /// Records whose platform map emptied out are deregistered instead:
    /// dropped from the store and their backing document deleted. A store
    /// with nothing dirty performs no I/O at all. Returns the number of
    /// documents written or deleted.
    pub fn save_all(&self) -> Result<usize> {
        let snapshot: Vec<String> = self.dirty.lock().unwrap().iter().cloned().collect();
        if snapshot.is_empty() {
            return Ok(0);
        }

        let mut flushed = 0;
        for name in snapshot {
            let Some(handle) = self.find(&name) else {
                self.dirty.lock().unwrap().remove(&name);
                continue;
            };

            let serialized = {
                let record = handle.lock().unwrap();
                if record.is_orphaned() {
                    None
                } else {
                    Some(toml::to_string_pretty(&*record).map_err(|source| {
                        Error::Serialize {
                            name: name.clone(),
                            source,
                        }
                    })?)
                }
            };

            let path = self.record_path(&name);
            match serialized {
                Some(text) => {
                    io::write_atomic(&path, &text)?;
                    flushed += 1;
                }
                None => {
                    self.records.write().unwrap().remove(&name);
                    if io::remove_if_exists(&path)? {
                        flushed += 1;
                        debug!(name = %name, "deregistered bank record");
                    } else {
                        debug!(name = %name, "discarded empty record before first persist");
                    }
                }
            }
            self.dirty.lock().unwrap().remove(&name);
        }
        Ok(flushed)
    }

    /// Snapshot of every record handle, for removal scans.
    pub fn handles(&self) -> Vec<BankHandle> {
        self.records.read().unwrap().values().cloned().collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.records.read().unwrap().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().unwrap().is_empty()
    }
}

fn load_record(path: &Path) -> Result<BankRecord> {
    let text = io::read_locked(path)?;
    toml::from_str(&text).map_err(|source| Error::Parse {
        path: path.to_path_buf(),
        source,
    })
}
