use crate::error::{StoreError, StoreResult};
use crate::{DocumentStore, content_key};
use chrono::Utc;
use propsync_model::{Document, DocumentReference};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

const DOCUMENTS_DIR: &str = "documents";
const BLOBS_DIR: &str = "blobs";

/// Directory-backed document store.
///
/// Layout:
/// ```text
/// <root>/documents/<wiki>/<Space.Page>.json
/// <root>/blobs/<first two hex chars>/<sha256 hex>
/// ```
/// Attachment blobs are content-addressed, so identical payloads attached
/// to several documents are stored once.
pub struct JsonFileStore {
    root: PathBuf,
    /// Serializes saves; loads read whatever is on disk.
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Opens (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(root.join(DOCUMENTS_DIR))?;
        fs::create_dir_all(root.join(BLOBS_DIR))?;
        info!(root = %root.display(), "Opened JSON file store");
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn document_path(&self, reference: &DocumentReference) -> PathBuf {
        self.root
            .join(DOCUMENTS_DIR)
            .join(urlencoding::encode(&reference.wiki).into_owned())
            .join(format!("{}.json", urlencoding::encode(&reference.local_name())))
    }

    fn blob_path(&self, key: &str) -> StoreResult<PathBuf> {
        if key.len() < 3 || !key.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(StoreError::InvalidData(format!("bad content key: {key}")));
        }
        Ok(self.root.join(BLOBS_DIR).join(&key[..2]).join(key))
    }

    fn write_blob(&self, content: &[u8]) -> StoreResult<String> {
        let key = content_key(content);
        let path = self.blob_path(&key)?;
        if path.exists() {
            debug!(key = %key, "Blob already present");
            return Ok(key);
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        write_atomically(&path, content)?;
        Ok(key)
    }
}

impl DocumentStore for JsonFileStore {
    fn load_or_create_document(&self, reference: &DocumentReference) -> StoreResult<Document> {
        let path = self.document_path(reference);
        if !path.exists() {
            return Ok(Document::new(reference.clone()));
        }
        let bytes = fs::read(&path)?;
        let document: Document = serde_json::from_slice(&bytes)?;
        if &document.reference != reference {
            return Err(StoreError::InvalidData(format!(
                "{} holds document {}, expected {}",
                path.display(),
                document.reference,
                reference
            )));
        }
        Ok(document)
    }

    fn attachment_content(&self, document: &Document, name: &str) -> StoreResult<Option<Vec<u8>>> {
        if let Some(staged) = document.staged_content(name) {
            return Ok(Some(staged.to_vec()));
        }
        let Some(key) = document.attachment(name).and_then(|a| a.content_key.as_deref()) else {
            return Ok(None);
        };
        let path = self.blob_path(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StoreError::NotFound(format!(
                "attachment content {key} of {}",
                document.reference
            ))),
            Err(e) => Err(e.into()),
        }
    }

    fn save_document(&self, document: &mut Document, comment: &str) -> StoreResult<()> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::LockPoisoned)?;

        let mut saved = document.clone();
        for (name, content) in saved.take_staged() {
            let key = self.write_blob(&content)?;
            if let Some(info) = saved.attachments.get_mut(&name) {
                info.content_key = Some(key);
            }
        }
        saved.record_revision(comment, Utc::now());

        let path = self.document_path(&saved.reference);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        write_atomically(&path, &serde_json::to_vec_pretty(&saved)?)?;

        debug!(document = %saved.reference, version = saved.version, path = %path.display(), "Saved document");
        *document = saved;
        Ok(())
    }
}

/// Writes through a sibling temp file and renames it into place.
fn write_atomically(path: &Path, content: &[u8]) -> StoreResult<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, content)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
