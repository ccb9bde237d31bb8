//! Document store contract for propsync.
//!
//! The updater never persists anything itself: it asks a [`DocumentStore`]
//! for a detached [`Document`] handle, mutates it, and hands it back with a
//! change comment. Two reference stores ship with the crate:
//!
//! - [`InMemoryDocumentStore`]: process-local, keeps full revision history
//! - [`JsonFileStore`]: one JSON file per document plus content-addressed
//!   attachment blobs on disk
//!
//! Neither store locks across a read-modify-write cycle; concurrent writers
//! to the same document race and the last save wins.

mod error;
mod file_store;
mod memory;

pub use error::{StoreError, StoreResult};
pub use file_store::JsonFileStore;
pub use memory::InMemoryDocumentStore;

use propsync_model::{Document, DocumentReference};
use sha2::{Digest, Sha256};

/// Storage backend for documents, objects and attachments.
pub trait DocumentStore: Send + Sync {
    /// Loads a document, or returns a new empty one when it does not exist.
    ///
    /// The returned handle is an isolated copy; mutating it has no effect
    /// until [`DocumentStore::save_document`] is called.
    fn load_or_create_document(&self, reference: &DocumentReference) -> StoreResult<Document>;

    /// Current content of a named attachment, `None` when there is none.
    ///
    /// Content staged on the handle takes precedence over persisted content.
    fn attachment_content(&self, document: &Document, name: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Persists the document and its staged attachments as one new revision.
    fn save_document(&self, document: &mut Document, comment: &str) -> StoreResult<()>;
}

/// Content key of an attachment blob: lowercase hex SHA-256.
pub fn content_key(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}
