//! Registry error types

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Fs(#[from] bank_fs::Error),

    #[error("Malformed record at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize record '{name}': {source}")]
    Serialize {
        name: String,
        #[source]
        source: toml::ser::Error,
    },
}
