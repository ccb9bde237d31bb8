//! Attachment payload fetching for propsync.
//!
//! An [`AttachmentSource`] turns a URI into the complete byte payload of an
//! attachment, or fails without producing partial content. [`UriFetcher`]
//! dispatches on the URI scheme (case-insensitively):
//!
//! - `http` / `https`: blocking GET, body of a 2xx response
//! - `file`: whole local file
//! - `data`: inline RFC 2397 payload, plain or base64
//!
//! Any other scheme is rejected with [`FetchError::UnsupportedScheme`].

mod data_uri;
mod error;
mod fetcher;

pub use data_uri::DataUri;
pub use error::{FetchError, FetchResult};
pub use fetcher::{FetcherConfig, UriFetcher};

use propsync_model::AttachmentReference;
use url::Url;

/// Source of attachment bytes.
pub trait AttachmentSource: Send + Sync {
    /// Fetches the full content behind `uri` for the attachment `target`.
    fn fetch(&self, uri: &Url, target: &AttachmentReference) -> FetchResult<Vec<u8>>;
}
