//! Synchronization engine for Soundbank Registry
//!
//! The engine applies a batch of added and removed asset paths to the bank
//! registry: it partitions the batch by file kind, resolves each path to a
//! logical identity, updates or creates bank records, maintains distribution
//! group assignments, and persists everything it touched once per batch.
//!
//! Failures are per item. An unparseable path or a manifest miss skips that
//! item with a classified diagnostic on the batch report; the rest of the
//! batch proceeds. The engine never aborts the process.

pub mod config;
pub mod engine;
pub mod error;
pub mod report;

pub use config::{MediaRemovalPolicy, SyncConfig};
pub use engine::{InitBankObserver, SyncEngine};
pub use error::{Error, Result};
pub use report::{BatchReport, Diagnostic, DiagnosticKind, Severity};
