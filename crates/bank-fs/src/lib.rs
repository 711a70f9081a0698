//! Filesystem primitives for Soundbank Registry
//!
//! Provides normalized asset paths, the path-to-identity resolver for the
//! platform/language import convention, deterministic asset ids, and safe
//! atomic I/O for the persisted stores.

pub mod error;
pub mod ident;
pub mod io;
pub mod layout;
pub mod path;

pub use error::{Error, Result};
pub use ident::AssetId;
pub use layout::{AssetIdentity, ImportLayout, DEFAULT_LANGUAGE};
pub use path::AssetPath;
