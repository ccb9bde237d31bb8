//! Reconciliation of configuration entries into one wiki.
//!
//! For every entry of a pass:
//! 1. classify the key ([`KeyParser`]); foreign keys are ignored
//! 2. property keys: sanitize, load the document, get or create the object,
//!    write and save only if the value changed
//! 3. attachment keys: fetch the payload, load the document, write and save
//!    only if the content digest changed
//!
//! A failing entry is logged and recorded; it never stops the pass.

use crate::change::{attachment_needs_write, property_needs_write};
use crate::config::UpdaterConfig;
use crate::error::{UpdaterError, UpdaterResult};
use crate::key::{KeyParser, ParsedKey};
use crate::provider::ConfigProvider;
use crate::resolver::{DefaultReferenceResolver, ReferenceResolver};
use crate::sanitize::sanitize;
use propsync_fetch::{AttachmentSource, FetchError};
use propsync_model::{AttachmentReference, ConfigEntry, ConfigValue, ObjectPropertyReference};
use propsync_store::{DocumentStore, StoreError};
use std::sync::Arc;
use tracing::{debug, enabled, error, info, Level};
use url::Url;

/// What happened to a single entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryOutcome {
    /// The key does not target this scope.
    Ignored,
    /// The store already held this value or content.
    Unchanged,
    PropertyUpdated(ObjectPropertyReference),
    AttachmentUpdated(AttachmentReference),
}

/// An entry that could not be applied.
#[derive(Debug)]
pub struct EntryFailure {
    pub key: String,
    pub error: UpdaterError,
}

/// Summary of one reconciliation pass.
#[derive(Debug, Default)]
pub struct UpdateReport {
    pub scope: String,
    pub properties_updated: Vec<ObjectPropertyReference>,
    pub attachments_updated: Vec<AttachmentReference>,
    pub unchanged: usize,
    pub ignored: usize,
    pub failures: Vec<EntryFailure>,
}

impl UpdateReport {
    fn new(scope: &str) -> Self {
        Self {
            scope: scope.to_string(),
            ..Self::default()
        }
    }

    fn record(&mut self, outcome: EntryOutcome) {
        match outcome {
            EntryOutcome::Ignored => self.ignored += 1,
            EntryOutcome::Unchanged => self.unchanged += 1,
            EntryOutcome::PropertyUpdated(r) => self.properties_updated.push(r),
            EntryOutcome::AttachmentUpdated(r) => self.attachments_updated.push(r),
        }
    }

    /// Number of document saves performed.
    pub fn writes(&self) -> usize {
        self.properties_updated.len() + self.attachments_updated.len()
    }

    /// `true` when every matching entry was applied or already up to date.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Applies configuration entries to a document store.
///
/// Holds no per-pass state, so one manager can serve passes for different
/// scopes from several threads at once.
pub struct UpdaterManager {
    store: Arc<dyn DocumentStore>,
    fetcher: Arc<dyn AttachmentSource>,
    provider: Arc<dyn ConfigProvider>,
    resolver: Arc<dyn ReferenceResolver>,
    config: UpdaterConfig,
}

impl UpdaterManager {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        fetcher: Arc<dyn AttachmentSource>,
        provider: Arc<dyn ConfigProvider>,
        config: UpdaterConfig,
    ) -> Self {
        Self {
            store,
            fetcher,
            provider,
            resolver: Arc::new(DefaultReferenceResolver),
            config,
        }
    }

    /// Replaces the default reference resolver.
    pub fn with_resolver(mut self, resolver: Arc<dyn ReferenceResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn config(&self) -> &UpdaterConfig {
        &self.config
    }

    /// Reads the provider afresh and reconciles its entries into `scope`.
    pub fn update_properties(&self, scope: &str) -> UpdateReport {
        let entries = self.provider.entries();
        if enabled!(Level::DEBUG) {
            for entry in &entries {
                debug!("Found system property [{}] with value [{}]", entry.key, entry.value);
            }
        }
        self.reconcile(scope, entries)
    }

    /// Applies `entries`, in order, to `scope`.
    pub fn reconcile<I>(&self, scope: &str, entries: I) -> UpdateReport
    where
        I: IntoIterator<Item = ConfigEntry>,
    {
        let parser = KeyParser::new(scope);
        let mut report = UpdateReport::new(scope);

        for entry in entries {
            match self.apply_entry(&parser, &entry) {
                Ok(outcome) => report.record(outcome),
                Err(e) => {
                    error!(scope, key = %entry.key, "{}", e);
                    report.failures.push(EntryFailure {
                        key: entry.key,
                        error: e,
                    });
                }
            }
        }

        info!(
            scope,
            properties_updated = report.properties_updated.len(),
            attachments_updated = report.attachments_updated.len(),
            unchanged = report.unchanged,
            failures = report.failures.len(),
            "System properties applied"
        );
        report
    }

    fn apply_entry(&self, parser: &KeyParser, entry: &ConfigEntry) -> UpdaterResult<EntryOutcome> {
        let parsed = parser
            .parse(&entry.key, self.resolver.as_ref())
            .map_err(|source| UpdaterError::Parse {
                key: entry.key.clone(),
                source,
            })?;

        match parsed {
            None => Ok(EntryOutcome::Ignored),
            Some(ParsedKey::Property { reference, .. }) => self.update_property(reference, &entry.value),
            Some(ParsedKey::Attachment { reference, .. }) => self.update_attachment(reference, &entry.value),
        }
    }

    fn update_property(
        &self,
        reference: ObjectPropertyReference,
        value: &ConfigValue,
    ) -> UpdaterResult<EntryOutcome> {
        let value = sanitize(value.clone(), self.config.trim_double_quotes);
        let new_value = serde_json::Value::String(value.to_string());
        debug!(
            property = %reference,
            document = %reference.document(),
            "Found object reference for document"
        );

        let store_error = |source: StoreError| UpdaterError::Store {
            reference: reference.to_string(),
            source,
        };

        let mut document = self
            .store
            .load_or_create_document(reference.document())
            .map_err(store_error)?;
        let (object, _) = document.get_or_create_object(&reference.object);

        if !property_needs_write(object.get(&reference.name), &new_value) {
            debug!(property = %reference, "Property already up to date");
            return Ok(EntryOutcome::Unchanged);
        }

        object.set(&reference.name, new_value);
        info!(
            "Updating object property [{}] to value [{}] from system properties",
            reference, value
        );
        let comment = format!("Updated property [{reference}] from system properties");
        self.store
            .save_document(&mut document, &comment)
            .map_err(store_error)?;

        Ok(EntryOutcome::PropertyUpdated(reference))
    }

    fn update_attachment(
        &self,
        reference: AttachmentReference,
        value: &ConfigValue,
    ) -> UpdaterResult<EntryOutcome> {
        let fetch_error = |uri: &str, source: FetchError| UpdaterError::Fetch {
            reference: reference.to_string(),
            uri: uri.to_string(),
            source,
        };
        let store_error = |source: StoreError| UpdaterError::Store {
            reference: reference.to_string(),
            source,
        };

        let uri = source_uri(value).map_err(|e| fetch_error(&value.to_string(), e))?;
        let content = self
            .fetcher
            .fetch(&uri, &reference)
            .map_err(|e| fetch_error(uri.as_str(), e))?;

        let mut document = self
            .store
            .load_or_create_document(&reference.document)
            .map_err(store_error)?;
        let existing = self
            .store
            .attachment_content(&document, &reference.name)
            .map_err(store_error)?;

        if !attachment_needs_write(existing.as_deref(), &content) {
            debug!(attachment = %reference, uri = %uri, "Attachment content already up to date");
            return Ok(EntryOutcome::Unchanged);
        }

        info!(attachment = %reference, uri = %uri, size_bytes = content.len(), "Updating attachment from system properties");
        document.set_attachment_content(&reference.name, content);
        let comment = format!("Updated attachment [{}] from system properties", reference.name);
        self.store
            .save_document(&mut document, &comment)
            .map_err(store_error)?;

        Ok(EntryOutcome::AttachmentUpdated(reference))
    }
}

/// The attachment source designated by a raw value. Text is parsed as a
/// URI verbatim: attachment sources are never sanitized.
fn source_uri(value: &ConfigValue) -> Result<Url, FetchError> {
    match value {
        ConfigValue::Source(url) => Ok(url.clone()),
        ConfigValue::Text(text) => Url::parse(text).map_err(|e| FetchError::InvalidUri {
            value: text.clone(),
            reason: e.to_string(),
        }),
    }
}
