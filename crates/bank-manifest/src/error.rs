//! Manifest error types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Fs(#[from] bank_fs::Error),

    #[error("Malformed manifest for platform '{platform}': {source}")]
    Parse {
        platform: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize manifest: {0}")]
    Serialize(#[from] toml::ser::Error),
}
