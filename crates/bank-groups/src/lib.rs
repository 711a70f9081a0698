//! Distribution group assignment for Soundbank Registry
//!
//! Every synchronized file belongs to exactly one distribution group, named
//! after its platform. The group system itself is external; this crate
//! provides the naming rule, the classifier override hook, the `GroupStore`
//! boundary trait, and a TOML-ledger implementation of that boundary.

pub mod error;
pub mod ledger;
pub mod naming;
pub mod store;

pub use error::{Error, Result};
pub use ledger::GroupLedger;
pub use naming::{group_for, resolve_group_name, GroupClassifier};
pub use store::{GroupSettings, GroupStore, MoveOutcome};
