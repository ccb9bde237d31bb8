use pretty_assertions::assert_eq;
use propsync_cli::{PassSummary, build_provider, events_for, parse_override};
use propsync_fetch::{FetcherConfig, UriFetcher};
use propsync_store::JsonFileStore;
use propsync_updater::{ConfigProvider, LifecycleEvent, StaticProvider, UpdaterConfig, UpdaterManager};
use std::sync::Arc;

fn pairs(provider: &dyn ConfigProvider) -> Vec<(String, String)> {
    provider
        .entries()
        .into_iter()
        .map(|e| (e.key, e.value.to_string()))
        .collect()
}

// ── Overrides ────────────────────────────────────────────────────

#[test]
fn override_splits_at_first_equals() {
    assert_eq!(
        parse_override("property:xwiki:Main.WebHome^XWiki.C.p=a=b").unwrap(),
        ("property:xwiki:Main.WebHome^XWiki.C.p".to_string(), "a=b".to_string())
    );
    assert_eq!(parse_override("k=").unwrap(), ("k".to_string(), String::new()));
}

#[test]
fn override_without_key_or_separator_is_rejected() {
    assert!(parse_override("novalue").is_err());
    assert!(parse_override("=value").is_err());
}

// ── Provider assembly ────────────────────────────────────────────

#[test]
fn overrides_win_over_properties_files() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.properties");
    let second = dir.path().join("second.properties");
    std::fs::write(&first, "a=from-first\nb=from-first\nc=from-first\n").unwrap();
    std::fs::write(&second, "b=from-second\nc=from-second\n").unwrap();

    let config = UpdaterConfig {
        include_environment: false,
        properties_files: vec![first, second],
        ..UpdaterConfig::default()
    };
    let provider = build_provider(&config, &[("c".to_string(), "from-cli".to_string())]);

    assert_eq!(provider.len(), 3);
    assert_eq!(
        pairs(&provider),
        vec![
            ("a".to_string(), "from-first".to_string()),
            ("b".to_string(), "from-second".to_string()),
            ("c".to_string(), "from-cli".to_string()),
        ]
    );
}

#[test]
fn environment_layer_is_optional() {
    let with_env = build_provider(&UpdaterConfig::default(), &[]);
    assert_eq!(with_env.len(), 1);

    let config = UpdaterConfig {
        include_environment: false,
        ..UpdaterConfig::default()
    };
    assert!(build_provider(&config, &[]).is_empty());
}

// ── Events ───────────────────────────────────────────────────────

#[test]
fn no_wiki_means_application_ready() {
    assert_eq!(events_for(&[]), vec![LifecycleEvent::ApplicationReady]);
}

#[test]
fn each_wiki_gets_an_event() {
    let wikis = vec!["a".to_string(), "b".to_string()];
    assert_eq!(
        events_for(&wikis),
        vec![
            LifecycleEvent::WikiReady { wiki_id: "a".to_string() },
            LifecycleEvent::WikiReady { wiki_id: "b".to_string() },
        ]
    );
}

// ── Summaries ────────────────────────────────────────────────────

#[test]
fn summary_of_a_file_store_pass() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::open(dir.path()).unwrap();
    let provider = StaticProvider::new()
        .with("property:xwiki:XWiki.XWikiPreferences^XWiki.XWikiSkinClass.skin", "flamingo")
        .with("attachment:xwiki:Main.WebHome@logo.png", "ftp://example.org/logo.png")
        .with("HOME", "/root");
    let manager = UpdaterManager::new(
        Arc::new(store),
        Arc::new(UriFetcher::new(FetcherConfig::default()).unwrap()),
        Arc::new(provider),
        UpdaterConfig::default(),
    );

    let summary = PassSummary::from(&manager.update_properties("xwiki"));

    assert_eq!(summary.scope, "xwiki");
    assert_eq!(
        summary.properties_updated,
        vec!["xwiki:XWiki.XWikiPreferences^XWiki.XWikiSkinClass.skin".to_string()]
    );
    assert!(summary.attachments_updated.is_empty());
    assert_eq!(summary.ignored, 1);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].key, "attachment:xwiki:Main.WebHome@logo.png");
    assert!(!summary.is_clean());

    let json = serde_json::to_string(&summary).unwrap();
    let decoded: PassSummary = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, summary);

    // A second pass over the same store has nothing left to write.
    let again = PassSummary::from(&manager.update_properties("xwiki"));
    assert!(again.properties_updated.is_empty());
    assert_eq!(again.unchanged, 1);
}
