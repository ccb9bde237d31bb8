//! System-properties updater.
//!
//! Reconciles externally supplied key/value pairs (environment variables,
//! startup properties) into document object properties and attachments.
//!
//! Keys follow `<kind>:<wiki>:<reference>`:
//!
//! ```text
//! property:xwiki:XWiki.XWikiPreferences^XWiki.XWikiSkinClass.skin=flamingo
//! attachment:mywiki:Main.WebHome@logo.png=https://example.org/logo.png
//! ```
//!
//! Writes are idempotent: a property is saved only when its value changes
//! and an attachment only when its SHA-256 digest changes, so repeated
//! passes leave the revision history untouched.

mod change;
mod config;
mod error;
mod key;
mod listener;
mod manager;
mod provider;
mod resolver;
mod sanitize;

pub use change::{ContentDigest, attachment_needs_write, property_needs_write};
pub use config::{DEFAULT_MAIN_WIKI, UpdaterConfig};
pub use error::{ConfigError, ConfigResult, UpdaterError, UpdaterResult};
pub use key::{KeyParser, ParsedKey};
pub use listener::{
    ExtensionId, FlavorManager, InstalledExtension, LifecycleEvent, PropertiesSetterListener,
    StaticFlavorManager,
};
pub use manager::{EntryFailure, EntryOutcome, UpdateReport, UpdaterManager};
pub use provider::{
    ConfigProvider, EnvironmentProvider, LayeredProvider, PropertiesFileProvider, StaticProvider,
    parse_properties,
};
pub use resolver::{DefaultReferenceResolver, ReferenceResolver};
pub use sanitize::{sanitize, strip_double_quotes};
