//! Engine error types
//!
//! Recoverable per-item conditions never surface here; they become
//! [`Diagnostic`](crate::report::Diagnostic) values on the batch report.
//! `Error` is reserved for store-level failures that prevent the batch from
//! completing at all.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Fs(#[from] bank_fs::Error),

    #[error(transparent)]
    Manifest(#[from] bank_manifest::Error),

    #[error(transparent)]
    Registry(#[from] bank_registry::Error),

    #[error(transparent)]
    Groups(#[from] bank_groups::Error),

    #[error("Invalid sync configuration: {0}")]
    Config(#[from] toml::de::Error),
}
