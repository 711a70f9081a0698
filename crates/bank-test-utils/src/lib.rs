//! Shared test utilities for the soundbank-registry workspace.
//!
//! Standardised fixtures shared by the crate test suites, centred on
//! [`ImportTree`]: a full on-disk import root with manifests, a record
//! store and a group ledger. Dev-dependency only, never published.

pub mod tree;

pub use tree::ImportTree;
