//! Bank registry records and their persisted store
//!
//! A `BankRecord` tracks, per platform and language, which bank binaries and
//! streamed media files belong to one logical bank. The `RecordStore` is the
//! arena those records live in during a synchronization batch: lookups are
//! concurrency-safe, mutations go through per-record locks, and everything
//! touched is flushed to disk once at the end of the batch.

pub mod error;
pub mod record;
pub mod store;

pub use error::{Error, Result};
pub use record::{BankRecord, MediaReference, PlatformLocalization};
pub use store::{BankHandle, RecordStore};
