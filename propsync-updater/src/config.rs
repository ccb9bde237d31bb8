//! Updater settings, loadable from TOML.
//!
//! ```toml
//! trim_double_quotes = true
//! main_wiki = "xwiki"
//! http_timeout_secs = 60
//! include_environment = true
//! properties_files = ["/etc/propsync/startup.properties"]
//! ```

use crate::error::{ConfigError, ConfigResult};
use propsync_fetch::FetcherConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

pub const DEFAULT_MAIN_WIKI: &str = "xwiki";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdaterConfig {
    /// Strip one pair of wrapping double quotes from property values.
    pub trim_double_quotes: bool,
    /// Scope reconciled on application-ready.
    pub main_wiki: String,
    /// No timeout when absent.
    pub http_timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
    /// Read keys from the process environment.
    pub include_environment: bool,
    /// Startup properties files, later files overriding earlier ones.
    pub properties_files: Vec<PathBuf>,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            trim_double_quotes: false,
            main_wiki: DEFAULT_MAIN_WIKI.to_string(),
            http_timeout_secs: None,
            user_agent: None,
            include_environment: true,
            properties_files: Vec::new(),
        }
    }
}

impl UpdaterConfig {
    /// Loads settings from a TOML file. Missing keys take their defaults.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str::<Self>(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded updater config from {:?}", path);
        Ok(config)
    }

    /// HTTP settings for the attachment fetcher.
    pub fn fetcher_config(&self) -> FetcherConfig {
        let mut fetcher = FetcherConfig::default();
        fetcher.timeout = self.http_timeout_secs.map(Duration::from_secs);
        if let Some(agent) = &self.user_agent {
            fetcher.user_agent = agent.clone();
        }
        fetcher
    }
}
