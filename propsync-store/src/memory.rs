use crate::error::{StoreError, StoreResult};
use crate::{DocumentStore, content_key};
use chrono::Utc;
use propsync_model::{Document, DocumentReference, Revision};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

#[derive(Default)]
struct Inner {
    documents: HashMap<DocumentReference, Document>,
    /// Blob content keyed by content key.
    blobs: HashMap<String, Vec<u8>>,
    saves: u64,
}

/// Process-local document store.
///
/// Every load returns a clone, so callers can never mutate stored state
/// behind the store's back.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    inner: Mutex<Inner>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Inner>> {
        self.inner.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Snapshot of a stored document, without creating it.
    pub fn document(&self, reference: &DocumentReference) -> StoreResult<Option<Document>> {
        Ok(self.lock()?.documents.get(reference).cloned())
    }

    /// Save history of a document, oldest first.
    pub fn revisions(&self, reference: &DocumentReference) -> StoreResult<Vec<Revision>> {
        Ok(self
            .lock()?
            .documents
            .get(reference)
            .map(|d| d.history.clone())
            .unwrap_or_default())
    }

    /// Total number of saves across all documents.
    pub fn save_count(&self) -> StoreResult<u64> {
        Ok(self.lock()?.saves)
    }

    /// Number of stored documents.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.lock()?.documents.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.lock()?.documents.is_empty())
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn load_or_create_document(&self, reference: &DocumentReference) -> StoreResult<Document> {
        let inner = self.lock()?;
        Ok(inner
            .documents
            .get(reference)
            .cloned()
            .unwrap_or_else(|| Document::new(reference.clone())))
    }

    fn attachment_content(&self, document: &Document, name: &str) -> StoreResult<Option<Vec<u8>>> {
        if let Some(staged) = document.staged_content(name) {
            return Ok(Some(staged.to_vec()));
        }
        let Some(key) = document.attachment(name).and_then(|a| a.content_key.as_deref()) else {
            return Ok(None);
        };
        let inner = self.lock()?;
        inner
            .blobs
            .get(key)
            .cloned()
            .map(Some)
            .ok_or_else(|| StoreError::NotFound(format!("attachment content {key}")))
    }

    fn save_document(&self, document: &mut Document, comment: &str) -> StoreResult<()> {
        let mut inner = self.lock()?;

        let mut saved = document.clone();
        for (name, content) in saved.take_staged() {
            let key = content_key(&content);
            if let Some(info) = saved.attachments.get_mut(&name) {
                info.content_key = Some(key.clone());
            }
            inner.blobs.insert(key, content);
        }
        saved.record_revision(comment, Utc::now());

        debug!(document = %saved.reference, version = saved.version, "Saved document");
        inner.documents.insert(saved.reference.clone(), saved.clone());
        inner.saves += 1;
        *document = saved;
        Ok(())
    }
}
