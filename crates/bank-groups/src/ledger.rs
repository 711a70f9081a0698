//! TOML-backed group ledger
//!
//! A single document records every group, its settings, and which group each
//! asset currently sits in:
//!
//! ```toml
//! version = "1.0"
//! updated_at = "2026-08-25T12:00:00Z"
//!
//! [groups.Data_Windows]
//! compressed = false
//! pack_separately = true
//!
//! [entries.3fe2a1c4b5d6e7f8a9b0c1d2e3f40516]
//! group = "Data_Windows"
//! labels = ["Remote_Assets", "Remote_Sounds"]
//! ```
//!
//! Mutations accumulate in memory; `flush` writes the document once per
//! batch, and only when something actually changed.

use crate::error::{Error, Result};
use crate::store::{GroupSettings, GroupStore, MoveOutcome};
use bank_fs::{io, AssetId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

fn default_version() -> String {
    "1.0".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct GroupEntry {
    group: String,
    #[serde(default)]
    labels: BTreeSet<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LedgerDoc {
    #[serde(default = "default_version")]
    version: String,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    groups: BTreeMap<String, GroupSettings>,
    #[serde(default)]
    entries: BTreeMap<String, GroupEntry>,
}

impl Default for LedgerDoc {
    fn default() -> Self {
        Self {
            version: default_version(),
            updated_at: Utc::now(),
            groups: BTreeMap::new(),
            entries: BTreeMap::new(),
        }
    }
}

struct LedgerState {
    doc: LedgerDoc,
    modified: bool,
}

/// The shipped [`GroupStore`] implementation.
pub struct GroupLedger {
    path: PathBuf,
    state: Mutex<LedgerState>,
}

impl GroupLedger {
    /// Open the ledger at `path`, starting empty when no document exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let doc = if path.exists() {
            let text = io::read_locked(&path)?;
            toml::from_str(&text).map_err(|source| Error::Parse {
                path: path.clone(),
                source,
            })?
        } else {
            LedgerDoc::default()
        };

        Ok(Self {
            path,
            state: Mutex::new(LedgerState {
                doc,
                modified: false,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The group `asset` is currently assigned to, if any.
    pub fn group_of(&self, asset: &AssetId) -> Option<String> {
        let state = self.state.lock().unwrap();
        state.doc.entries.get(asset.as_str()).map(|e| e.group.clone())
    }

    /// Labels attached to `asset`'s entry.
    pub fn labels_of(&self, asset: &AssetId) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .doc
            .entries
            .get(asset.as_str())
            .map(|e| e.labels.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Asset ids assigned to `group`, in stable order.
    pub fn entries_in(&self, group: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .doc
            .entries
            .iter()
            .filter(|(_, e)| e.group == group)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Every known group name with its settings.
    pub fn groups(&self) -> Vec<(String, GroupSettings)> {
        let state = self.state.lock().unwrap();
        state
            .doc
            .groups
            .iter()
            .map(|(name, settings)| (name.clone(), settings.clone()))
            .collect()
    }
}

impl GroupStore for GroupLedger {
    fn get_or_create_group(&self, name: &str) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        if state.doc.groups.contains_key(name) {
            return Ok(false);
        }
        state
            .doc
            .groups
            .insert(name.to_string(), GroupSettings::default());
        state.modified = true;
        debug!(group = name, "created distribution group");
        Ok(true)
    }

    fn move_entry(&self, asset: &AssetId, group: &str) -> Result<MoveOutcome> {
        let mut state = self.state.lock().unwrap();
        if !state.doc.groups.contains_key(group) {
            state
                .doc
                .groups
                .insert(group.to_string(), GroupSettings::default());
            state.modified = true;
        }

        match state.doc.entries.get_mut(asset.as_str()) {
            Some(entry) if entry.group == group => Ok(MoveOutcome::AlreadyAssigned),
            Some(entry) => {
                entry.group = group.to_string();
                state.modified = true;
                Ok(MoveOutcome::Moved)
            }
            None => {
                state.doc.entries.insert(
                    asset.as_str().to_string(),
                    GroupEntry {
                        group: group.to_string(),
                        labels: BTreeSet::new(),
                    },
                );
                state.modified = true;
                Ok(MoveOutcome::Moved)
            }
        }
    }

    fn remove_entry(&self, asset: &AssetId) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        let removed = state.doc.entries.remove(asset.as_str()).is_some();
        if removed {
            state.modified = true;
        }
        Ok(removed)
    }

    fn add_label(&self, asset: &AssetId, label: &str) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        let Some(entry) = state.doc.entries.get_mut(asset.as_str()) else {
            return Ok(false);
        };
        let added = entry.labels.insert(label.to_string());
        if added {
            state.modified = true;
        }
        Ok(added)
    }

    fn flush(&self) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        if !state.modified {
            return Ok(false);
        }
        state.doc.updated_at = Utc::now();
        let text = toml::to_string_pretty(&state.doc)?;
        io::write_atomic(&self.path, &text)?;
        state.modified = false;
        debug!(path = %self.path.display(), "flushed group ledger");
        Ok(true)
    }
}
