use crate::reference::{ClassReference, DocumentReference, ObjectReference};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A document as handed out by a document store.
///
/// A `Document` is an owned, detached copy: mutating it never affects the
/// store until the store is asked to save it. Attachment content set on the
/// handle is staged here and written by the store on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub reference: DocumentReference,
    /// Number of saves so far; `0` for a document that was never persisted.
    pub version: u64,
    #[serde(default)]
    pub objects: Vec<XObject>,
    #[serde(default)]
    pub attachments: BTreeMap<String, AttachmentInfo>,
    #[serde(default)]
    pub history: Vec<Revision>,
    #[serde(skip)]
    staged: BTreeMap<String, Vec<u8>>,
}

/// A structured object: a typed property map conforming to a class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XObject {
    pub class: ClassReference,
    pub number: u32,
    #[serde(default)]
    pub properties: BTreeMap<String, serde_json::Value>,
}

/// Metadata of an attachment. Content is owned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentInfo {
    pub name: String,
    pub size: u64,
    pub version: u32,
    /// Store-specific key of the persisted content, set on save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_key: Option<String>,
}

/// One entry of a document's save history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    pub version: u64,
    pub comment: String,
    pub saved_at: DateTime<Utc>,
}

impl Document {
    /// A fresh, never-saved document.
    pub fn new(reference: DocumentReference) -> Self {
        Self {
            reference,
            version: 0,
            objects: Vec::new(),
            attachments: BTreeMap::new(),
            history: Vec::new(),
            staged: BTreeMap::new(),
        }
    }

    pub fn is_new(&self) -> bool {
        self.version == 0
    }

    /// Finds the object designated by `class` and `number`
    /// (`None` picks the lowest-numbered object of the class).
    pub fn object(&self, class: &ClassReference, number: Option<u32>) -> Option<&XObject> {
        self.object_index(class, number).map(|idx| &self.objects[idx])
    }

    /// Returns the designated object, creating it when missing.
    ///
    /// The boolean is `true` when the object was just created.
    pub fn get_or_create_object(&mut self, reference: &ObjectReference) -> (&mut XObject, bool) {
        match self.object_index(&reference.class, reference.number) {
            Some(idx) => (&mut self.objects[idx], false),
            None => {
                let number = reference.number.unwrap_or_else(|| self.next_object_number(&reference.class));
                self.objects.push(XObject {
                    class: reference.class.clone(),
                    number,
                    properties: BTreeMap::new(),
                });
                let idx = self.objects.len() - 1;
                (&mut self.objects[idx], true)
            }
        }
    }

    fn object_index(&self, class: &ClassReference, number: Option<u32>) -> Option<usize> {
        let mut candidates = self
            .objects
            .iter()
            .enumerate()
            .filter(|(_, o)| &o.class == class);
        let found = match number {
            Some(n) => candidates.find(|(_, o)| o.number == n),
            None => candidates.min_by_key(|(_, o)| o.number),
        };
        found.map(|(idx, _)| idx)
    }

    fn next_object_number(&self, class: &ClassReference) -> u32 {
        self.objects
            .iter()
            .filter(|o| &o.class == class)
            .map(|o| o.number + 1)
            .max()
            .unwrap_or(0)
    }

    pub fn attachment(&self, name: &str) -> Option<&AttachmentInfo> {
        self.attachments.get(name)
    }

    /// Replaces (or adds) an attachment's content on this handle.
    pub fn set_attachment_content(&mut self, name: &str, content: Vec<u8>) {
        let size = content.len() as u64;
        let info = self
            .attachments
            .entry(name.to_string())
            .or_insert_with(|| AttachmentInfo {
                name: name.to_string(),
                size: 0,
                version: 0,
                content_key: None,
            });
        info.size = size;
        info.version += 1;
        info.content_key = None;
        self.staged.insert(name.to_string(), content);
    }

    /// Content set on this handle and not yet saved.
    pub fn staged_content(&self, name: &str) -> Option<&[u8]> {
        self.staged.get(name).map(Vec::as_slice)
    }

    /// Drains the staged attachment content; used by stores while saving.
    pub fn take_staged(&mut self) -> BTreeMap<String, Vec<u8>> {
        std::mem::take(&mut self.staged)
    }

    /// Bumps the version and appends a history entry; used by stores while saving.
    pub fn record_revision(&mut self, comment: &str, saved_at: DateTime<Utc>) {
        self.version += 1;
        self.history.push(Revision {
            version: self.version,
            comment: comment.to_string(),
            saved_at,
        });
    }
}

impl XObject {
    pub fn get(&self, property: &str) -> Option<&serde_json::Value> {
        self.properties.get(property)
    }

    /// Sets a property, returning the previous value.
    pub fn set(&mut self, property: &str, value: serde_json::Value) -> Option<serde_json::Value> {
        self.properties.insert(property.to_string(), value)
    }
}
