//! Helpers behind the `propsync` binary: override parsing, provider
//! assembly and printable pass summaries.

use propsync_updater::{
    EnvironmentProvider, LayeredProvider, LifecycleEvent, PropertiesFileProvider,
    StaticProvider, UpdateReport, UpdaterConfig,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Parses a `-D key=value` override. The value may itself contain `=`.
pub fn parse_override(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, _)) if key.is_empty() => Err(format!("empty key in override '{raw}'")),
        Some((key, value)) => Ok((key.to_string(), value.to_string())),
        None => Err(format!("expected key=value, got '{raw}'")),
    }
}

/// Layers, lowest precedence first: environment (when enabled), the
/// configured properties files in order, then command-line overrides.
pub fn build_provider(config: &UpdaterConfig, overrides: &[(String, String)]) -> LayeredProvider {
    let mut provider = LayeredProvider::new();
    if config.include_environment {
        provider = provider.layer(Arc::new(EnvironmentProvider::new()));
    }
    for path in &config.properties_files {
        provider = provider.layer(Arc::new(PropertiesFileProvider::new(path)));
    }
    if !overrides.is_empty() {
        let overrides: StaticProvider = overrides.iter().cloned().collect();
        provider = provider.layer(Arc::new(overrides));
    }
    provider
}

/// One wiki-ready event per requested wiki, or application-ready when none.
pub fn events_for(wikis: &[String]) -> Vec<LifecycleEvent> {
    if wikis.is_empty() {
        return vec![LifecycleEvent::ApplicationReady];
    }
    wikis
        .iter()
        .map(|wiki_id| LifecycleEvent::WikiReady {
            wiki_id: wiki_id.clone(),
        })
        .collect()
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FailureSummary {
    pub key: String,
    pub error: String,
}

/// Serializable view of an [`UpdateReport`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PassSummary {
    pub scope: String,
    pub properties_updated: Vec<String>,
    pub attachments_updated: Vec<String>,
    pub unchanged: usize,
    pub ignored: usize,
    pub failures: Vec<FailureSummary>,
}

impl From<&UpdateReport> for PassSummary {
    fn from(report: &UpdateReport) -> Self {
        Self {
            scope: report.scope.clone(),
            properties_updated: report.properties_updated.iter().map(ToString::to_string).collect(),
            attachments_updated: report.attachments_updated.iter().map(ToString::to_string).collect(),
            unchanged: report.unchanged,
            ignored: report.ignored,
            failures: report
                .failures
                .iter()
                .map(|f| FailureSummary {
                    key: f.key.clone(),
                    error: f.error.to_string(),
                })
                .collect(),
        }
    }
}

impl PassSummary {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
