//! Per-platform soundbank manifest lookup
//!
//! The audio toolchain emits one manifest per platform describing which
//! languages and streamed media ids belong to each bank. This crate models
//! that document and provides the read-only lookup the synchronization
//! engine consults, with a cache that survives a batch and an invalidation
//! hook for the start of the next one.

pub mod error;
pub mod model;
pub mod source;

pub use error::{Error, Result};
pub use model::{BankManifest, PlatformManifest};
pub use source::{write_manifest, ManifestSource, MemoryManifestSource, TomlManifestSource};
