//! Error types for attachment fetching.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Errors that can occur while resolving an attachment source to bytes.
///
/// Every variant is recoverable: the caller skips the entry and moves on.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid attachment URI '{value}': {reason}")]
    InvalidUri { value: String, reason: String },

    #[error("http client: {0}")]
    Client(String),

    #[error("fetch failed for {uri}: {message}")]
    Http { uri: String, message: String },

    #[error("HTTP {status} fetching {uri}")]
    Status { uri: String, status: u16 },

    #[error("URI {0} does not name a local file")]
    InvalidFilePath(String),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed data URI: {0}")]
    MalformedDataUri(String),

    #[error("unsupported attachment URI scheme '{scheme}' in {uri}")]
    UnsupportedScheme { scheme: String, uri: String },
}
