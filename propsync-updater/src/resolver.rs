use propsync_model::{AttachmentReference, ObjectPropertyReference, ReferenceError};

/// Turns the opaque suffix of a configuration key into a typed reference.
///
/// `scope` is the wiki being reconciled; suffixes that do not name a wiki
/// resolve inside it.
pub trait ReferenceResolver: Send + Sync {
    fn resolve_property(&self, suffix: &str, scope: &str) -> Result<ObjectPropertyReference, ReferenceError>;

    fn resolve_attachment(&self, suffix: &str, scope: &str) -> Result<AttachmentReference, ReferenceError>;
}

/// Resolver for the `Space.Page^Space.Class[n].field` and `Space.Page@file`
/// string syntax.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultReferenceResolver;

impl ReferenceResolver for DefaultReferenceResolver {
    fn resolve_property(&self, suffix: &str, scope: &str) -> Result<ObjectPropertyReference, ReferenceError> {
        ObjectPropertyReference::parse(suffix, scope)
    }

    fn resolve_attachment(&self, suffix: &str, scope: &str) -> Result<AttachmentReference, ReferenceError> {
        AttachmentReference::parse(suffix, scope)
    }
}
