//! Classification of raw configuration keys.
//!
//! Keys look like `<kind>:<scope>:<suffix>` with kind `property` or
//! `attachment`. Matching is literal and case-sensitive; anything else is
//! someone else's configuration and is ignored.

use crate::resolver::ReferenceResolver;
use propsync_model::{AttachmentReference, ObjectPropertyReference, ReferenceError};

const PROPERTY_KIND: &str = "property";
const ATTACHMENT_KIND: &str = "attachment";

/// A key that targets this scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedKey {
    Property {
        scope: String,
        reference: ObjectPropertyReference,
    },
    Attachment {
        scope: String,
        reference: AttachmentReference,
    },
}

/// Prefix matcher for one scope.
#[derive(Debug, Clone)]
pub struct KeyParser {
    scope: String,
    property_prefix: String,
    attachment_prefix: String,
}

impl KeyParser {
    pub fn new(scope: &str) -> Self {
        Self {
            scope: scope.to_string(),
            property_prefix: format!("{PROPERTY_KIND}:{scope}:"),
            attachment_prefix: format!("{ATTACHMENT_KIND}:{scope}:"),
        }
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Classifies `raw_key`.
    ///
    /// Returns `Ok(None)` for keys outside this scope or of another kind,
    /// and an error only when a matching key's suffix fails to resolve.
    pub fn parse(
        &self,
        raw_key: &str,
        resolver: &dyn ReferenceResolver,
    ) -> Result<Option<ParsedKey>, ReferenceError> {
        if let Some(suffix) = raw_key.strip_prefix(&self.property_prefix) {
            let reference = resolver.resolve_property(suffix, &self.scope)?;
            return Ok(Some(ParsedKey::Property {
                scope: self.scope.clone(),
                reference,
            }));
        }
        if let Some(suffix) = raw_key.strip_prefix(&self.attachment_prefix) {
            let reference = resolver.resolve_attachment(suffix, &self.scope)?;
            return Ok(Some(ParsedKey::Attachment {
                scope: self.scope.clone(),
                reference,
            }));
        }
        Ok(None)
    }
}
