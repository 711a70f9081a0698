//! Group store boundary
//!
//! The distribution-group system is an external collaborator; the engine
//! talks to it through [`GroupStore`]. Implementations must make every
//! operation idempotent: the engine re-applies assignments freely when files
//! are re-imported.

use crate::error::Result;
use bank_fs::AssetId;
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

fn default_remote() -> String {
    "remote".to_string()
}

/// Bundling configuration recorded with a group on creation.
///
/// Defaults match the delivery setup the audio pipeline expects: bundles
/// are not recompressed (the media is already compressed), each entry packs
/// separately so one changed bank invalidates one bundle, and content is
/// built to and loaded from the remote profile paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSettings {
    #[serde(default)]
    pub compressed: bool,
    #[serde(default = "default_true")]
    pub pack_separately: bool,
    #[serde(default = "default_remote")]
    pub build_path: String,
    #[serde(default = "default_remote")]
    pub load_path: String,
    #[serde(default)]
    pub static_content: bool,
}

impl Default for GroupSettings {
    fn default() -> Self {
        Self {
            compressed: false,
            pack_separately: true,
            build_path: default_remote(),
            load_path: default_remote(),
            static_content: false,
        }
    }
}

/// Result of a `move_entry` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The entry was created in, or moved into, the group.
    Moved,
    /// The entry was already in the group; nothing changed.
    AlreadyAssigned,
}

/// External distribution-group system boundary.
pub trait GroupStore: Send + Sync {
    /// Ensure a group exists, applying [`GroupSettings::default`] when it is
    /// created. Returns `true` when the group was created by this call.
    fn get_or_create_group(&self, name: &str) -> Result<bool>;

    /// Assign `asset` to `group`, creating the group if needed.
    ///
    /// An asset belongs to exactly one group; assigning it elsewhere removes
    /// it from the previous group first.
    fn move_entry(&self, asset: &AssetId, group: &str) -> Result<MoveOutcome>;

    /// Remove `asset`'s assignment. Returns `false` (not an error) when the
    /// asset has no assignment.
    fn remove_entry(&self, asset: &AssetId) -> Result<bool>;

    /// Attach `label` to `asset`'s entry. Returns `true` when the label was
    /// newly added; an unassigned asset is tolerated and reported as `false`.
    fn add_label(&self, asset: &AssetId, label: &str) -> Result<bool>;

    /// Persist pending changes. Returns `true` when anything was written;
    /// an unmodified store performs no I/O.
    fn flush(&self) -> Result<bool>;
}
