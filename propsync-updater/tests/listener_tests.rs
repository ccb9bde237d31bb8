use pretty_assertions::assert_eq;
use propsync_fetch::{FetcherConfig, UriFetcher};
use propsync_model::DocumentReference;
use propsync_store::InMemoryDocumentStore;
use propsync_updater::{
    ExtensionId, InstalledExtension, LifecycleEvent, PropertiesSetterListener, StaticFlavorManager,
    StaticProvider, UpdaterConfig, UpdaterManager,
};
use std::io;
use std::sync::{Arc, Mutex};

fn flavor() -> ExtensionId {
    ExtensionId::new("org.xwiki.platform:xwiki-platform-distribution-flavor-mainwiki", "16.10.0")
}

fn listener(store: Arc<InMemoryDocumentStore>, flavors: StaticFlavorManager) -> PropertiesSetterListener {
    let provider = StaticProvider::new()
        .with("property:xwiki:Main.WebHome^XWiki.ConfigClass.value", "main")
        .with("property:sub:Main.WebHome^XWiki.ConfigClass.value", "sub")
        .with("property:other:Main.WebHome^XWiki.ConfigClass.value", "other");
    let manager = UpdaterManager::new(
        store,
        Arc::new(UriFetcher::new(FetcherConfig::default()).unwrap()),
        Arc::new(provider),
        UpdaterConfig::default(),
    );
    PropertiesSetterListener::new(Arc::new(manager), Arc::new(flavors))
}

fn flavor_event(extension: InstalledExtension) -> LifecycleEvent {
    LifecycleEvent::ExtensionInstalled(extension)
}

// ── Scope selection ──────────────────────────────────────────────

#[test]
fn application_ready_targets_main_wiki() {
    let listener = listener(Arc::new(InMemoryDocumentStore::new()), StaticFlavorManager::new());
    assert_eq!(listener.scopes_for(&LifecycleEvent::ApplicationReady), vec!["xwiki"]);
}

#[test]
fn wiki_ready_targets_that_wiki() {
    let listener = listener(Arc::new(InMemoryDocumentStore::new()), StaticFlavorManager::new());
    let event = LifecycleEvent::WikiReady {
        wiki_id: "sub".to_string(),
    };
    assert_eq!(listener.scopes_for(&event), vec!["sub"]);
}

#[test]
fn flavor_targets_wikis_running_it() {
    let flavors = StaticFlavorManager::new()
        .with_flavor("sub", flavor())
        .with_flavor("other", ExtensionId::new("some.other:flavor", "1.0"));
    let listener = listener(Arc::new(InMemoryDocumentStore::new()), flavors);

    let event = flavor_event(InstalledExtension {
        id: flavor(),
        category: Some("flavor".to_string()),
        namespaces: Some(vec![
            "wiki:sub".to_string(),
            "wiki:other".to_string(),
            "wiki:unknown".to_string(),
        ]),
    });
    assert_eq!(listener.scopes_for(&event), vec!["sub"]);
}

#[test]
fn flavor_version_must_match() {
    let flavors = StaticFlavorManager::new().with_flavor("sub", ExtensionId::new(flavor().id, "15.0"));
    let listener = listener(Arc::new(InMemoryDocumentStore::new()), flavors);

    let event = LifecycleEvent::ExtensionUpgraded(InstalledExtension {
        id: flavor(),
        category: Some("flavor".to_string()),
        namespaces: Some(vec!["wiki:sub".to_string()]),
    });
    assert!(listener.scopes_for(&event).is_empty());
}

#[test]
fn non_flavor_extensions_are_ignored() {
    let flavors = StaticFlavorManager::new().with_flavor("sub", flavor());
    let listener = listener(Arc::new(InMemoryDocumentStore::new()), flavors);

    let not_flavor = flavor_event(InstalledExtension {
        id: flavor(),
        category: Some("application".to_string()),
        namespaces: Some(vec!["wiki:sub".to_string()]),
    });
    let root_level = flavor_event(InstalledExtension {
        id: flavor(),
        category: Some("flavor".to_string()),
        namespaces: None,
    });
    assert!(listener.scopes_for(&not_flavor).is_empty());
    assert!(listener.scopes_for(&root_level).is_empty());
}

#[test]
fn namespace_without_prefix_is_used_verbatim() {
    let flavors = StaticFlavorManager::new().with_flavor("sub", flavor());
    let listener = listener(Arc::new(InMemoryDocumentStore::new()), flavors);

    let event = flavor_event(InstalledExtension {
        id: flavor(),
        category: Some("flavor".to_string()),
        namespaces: Some(vec!["sub".to_string()]),
    });
    assert_eq!(listener.scopes_for(&event), vec!["sub"]);
}

// ── Event handling ───────────────────────────────────────────────

#[test]
fn events_reconcile_their_scopes() {
    let store = Arc::new(InMemoryDocumentStore::new());
    let listener = listener(store.clone(), StaticFlavorManager::new().with_flavor("sub", flavor()));

    let reports = listener.on_event(&LifecycleEvent::ApplicationReady);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].scope, "xwiki");
    assert_eq!(reports[0].properties_updated.len(), 1);
    assert_eq!(reports[0].ignored, 2);

    let reports = listener.on_event(&flavor_event(InstalledExtension {
        id: flavor(),
        category: Some("flavor".to_string()),
        namespaces: Some(vec!["wiki:sub".to_string()]),
    }));
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].scope, "sub");

    assert!(store.document(&DocumentReference::new("xwiki", &["Main"], "WebHome")).unwrap().is_some());
    assert!(store.document(&DocumentReference::new("sub", &["Main"], "WebHome")).unwrap().is_some());
    assert!(store.document(&DocumentReference::new("other", &["Main"], "WebHome")).unwrap().is_none());
}

#[test]
fn repeated_events_are_idempotent() {
    let store = Arc::new(InMemoryDocumentStore::new());
    let listener = listener(store.clone(), StaticFlavorManager::new());

    listener.on_event(&LifecycleEvent::ApplicationReady);
    let again = listener.on_event(&LifecycleEvent::ApplicationReady);

    assert_eq!(again[0].writes(), 0);
    assert_eq!(store.save_count().unwrap(), 1);
}

#[derive(Clone, Default)]
struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn each_pass_is_announced_right_before_it_runs() {
    let store = Arc::new(InMemoryDocumentStore::new());
    let flavors = StaticFlavorManager::new()
        .with_flavor("sub", flavor())
        .with_flavor("other", flavor());
    let listener = listener(store, flavors);
    let event = flavor_event(InstalledExtension {
        id: flavor(),
        category: Some("flavor".to_string()),
        namespaces: Some(vec!["wiki:sub".to_string(), "wiki:other".to_string()]),
    });

    let log = CapturedLog::default();
    let writer = log.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .finish();
    let reports = tracing::subscriber::with_default(subscriber, || listener.on_event(&event));
    assert_eq!(reports.len(), 2);

    let output = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
    let lines: Vec<&str> = output
        .lines()
        .filter(|l| l.contains("Applying system properties") || l.contains("System properties applied"))
        .collect();
    assert_eq!(lines.len(), 4, "{output}");
    assert!(lines[0].contains("Applying system properties on wiki [sub]"), "{output}");
    assert!(lines[1].contains("System properties applied"), "{output}");
    assert!(lines[2].contains("Applying system properties on wiki [other]"), "{output}");
    assert!(lines[3].contains("System properties applied"), "{output}");
}
