//! Error types for the updater.
//!
//! None of these escape a reconciliation pass: each one is logged, recorded
//! against its entry in the [`UpdateReport`](crate::UpdateReport), and the
//! pass continues with the next entry.

use propsync_fetch::FetchError;
use propsync_model::ReferenceError;
use propsync_store::StoreError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for per-entry updater operations.
pub type UpdaterResult<T> = Result<T, UpdaterError>;

/// Why a single configuration entry could not be applied.
#[derive(Debug, Error)]
pub enum UpdaterError {
    /// The key matched a prefix but its suffix is not a valid reference.
    #[error("cannot resolve key '{key}': {source}")]
    Parse {
        key: String,
        #[source]
        source: ReferenceError,
    },

    /// The attachment source could not be turned into bytes.
    #[error("failed to fetch attachment [{reference}] from [{uri}]: {source}")]
    Fetch {
        reference: String,
        uri: String,
        #[source]
        source: FetchError,
    },

    /// The store failed to load or save the target document.
    #[error("failed to update [{reference}]: {source}")]
    Store {
        reference: String,
        #[source]
        source: StoreError,
    },
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading [`UpdaterConfig`](crate::UpdaterConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
