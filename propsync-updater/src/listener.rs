//! Lifecycle event adapter.
//!
//! Maps host events onto the scopes to reconcile:
//! - application ready → the main wiki
//! - wiki ready → that wiki
//! - flavor installed/upgraded → every wiki, among the extension's
//!   namespaces, whose active flavor is exactly that extension

use crate::manager::{UpdateReport, UpdaterManager};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::info;

const FLAVOR_CATEGORY: &str = "flavor";
const WIKI_NAMESPACE_PREFIX: &str = "wiki:";

/// Identifier and version of an installable extension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExtensionId {
    pub id: String,
    pub version: String,
}

impl ExtensionId {
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for ExtensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.id, self.version)
    }
}

/// An extension that was just installed or upgraded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledExtension {
    pub id: ExtensionId,
    #[serde(default)]
    pub category: Option<String>,
    /// Namespaces the extension is installed in (`wiki:<id>`); `None` means
    /// installed at root level.
    #[serde(default)]
    pub namespaces: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    ApplicationReady,
    WikiReady { wiki_id: String },
    ExtensionInstalled(InstalledExtension),
    ExtensionUpgraded(InstalledExtension),
}

/// Knows which flavor each wiki runs.
pub trait FlavorManager: Send + Sync {
    fn flavor_of_wiki(&self, wiki_id: &str) -> Option<ExtensionId>;
}

/// Fixed wiki → flavor table.
#[derive(Debug, Clone, Default)]
pub struct StaticFlavorManager {
    flavors: HashMap<String, ExtensionId>,
}

impl StaticFlavorManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flavor(mut self, wiki_id: impl Into<String>, flavor: ExtensionId) -> Self {
        self.flavors.insert(wiki_id.into(), flavor);
        self
    }
}

impl FlavorManager for StaticFlavorManager {
    fn flavor_of_wiki(&self, wiki_id: &str) -> Option<ExtensionId> {
        self.flavors.get(wiki_id).cloned()
    }
}

/// Runs a reconciliation pass for every scope an event designates.
pub struct PropertiesSetterListener {
    manager: Arc<UpdaterManager>,
    flavors: Arc<dyn FlavorManager>,
}

impl PropertiesSetterListener {
    pub fn new(manager: Arc<UpdaterManager>, flavors: Arc<dyn FlavorManager>) -> Self {
        Self { manager, flavors }
    }

    /// Scopes to reconcile for `event`, in event order.
    pub fn scopes_for(&self, event: &LifecycleEvent) -> Vec<String> {
        match event {
            LifecycleEvent::ApplicationReady => vec![self.manager.config().main_wiki.clone()],
            LifecycleEvent::WikiReady { wiki_id } => vec![wiki_id.clone()],
            LifecycleEvent::ExtensionInstalled(extension) | LifecycleEvent::ExtensionUpgraded(extension) => {
                self.flavor_scopes(extension)
            }
        }
    }

    fn flavor_scopes(&self, extension: &InstalledExtension) -> Vec<String> {
        if extension.category.as_deref() != Some(FLAVOR_CATEGORY) {
            return Vec::new();
        }
        let Some(namespaces) = &extension.namespaces else {
            return Vec::new();
        };

        namespaces
            .iter()
            .map(|ns| ns.strip_prefix(WIKI_NAMESPACE_PREFIX).unwrap_or(ns))
            .filter(|wiki_id| self.flavors.flavor_of_wiki(wiki_id).as_ref() == Some(&extension.id))
            .map(str::to_string)
            .collect()
    }

    /// Handles one event, returning a report per reconciled scope.
    pub fn on_event(&self, event: &LifecycleEvent) -> Vec<UpdateReport> {
        self.scopes_for(event)
            .iter()
            .map(|scope| {
                announce(event, scope);
                self.manager.update_properties(scope)
            })
            .collect()
    }
}

fn announce(event: &LifecycleEvent, scope: &str) {
    match event {
        LifecycleEvent::ApplicationReady => {
            info!("Applying system properties on main wiki [{}].", scope);
        }
        LifecycleEvent::WikiReady { .. } => {
            info!("Applying system properties on wiki [{}]", scope);
        }
        LifecycleEvent::ExtensionInstalled(ext) | LifecycleEvent::ExtensionUpgraded(ext) => {
            info!(
                "Applying system properties on wiki [{}] following installation or upgrade of flavor [{}]",
                scope, ext.id
            );
        }
    }
}
