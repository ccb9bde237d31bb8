//! Sources of raw configuration entries.
//!
//! Providers are asked again on every pass; nothing is cached, so a
//! changed environment or properties file is picked up by the next event.
//! Entries come back sorted by key so that passes are reproducible.

use propsync_model::{ConfigEntry, ConfigValue};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

/// Supplies the full key/value map for one pass.
pub trait ConfigProvider: Send + Sync {
    fn entries(&self) -> Vec<ConfigEntry>;
}

/// Fixed entries, e.g. from command-line overrides.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    values: BTreeMap<String, ConfigValue>,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) {
        self.values.insert(key.into(), value.into());
    }
}

impl ConfigProvider for StaticProvider {
    fn entries(&self) -> Vec<ConfigEntry> {
        self.values
            .iter()
            .map(|(k, v)| ConfigEntry::new(k.clone(), v.clone()))
            .collect()
    }
}

impl<K: Into<String>, V: Into<ConfigValue>> FromIterator<(K, V)> for StaticProvider {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut provider = Self::new();
        for (k, v) in iter {
            provider.insert(k, v);
        }
        provider
    }
}

/// The process environment, read at every call.
///
/// Variables whose name or value is not valid UTF-8 are skipped.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentProvider;

impl EnvironmentProvider {
    pub fn new() -> Self {
        Self
    }
}

impl ConfigProvider for EnvironmentProvider {
    fn entries(&self) -> Vec<ConfigEntry> {
        let values: BTreeMap<String, String> = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        values
            .into_iter()
            .map(|(k, v)| ConfigEntry::new(k, v))
            .collect()
    }
}

/// A `key=value` properties file, re-read at every call.
///
/// Blank lines and lines starting with `#` or `!` are skipped. The first
/// unescaped `=` separates key from value (`:` is not a separator, keys are
/// full of them). A trailing `\` continues the value on the next line.
/// An unreadable file yields no entries and a warning.
#[derive(Debug, Clone)]
pub struct PropertiesFileProvider {
    path: PathBuf,
}

impl PropertiesFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigProvider for PropertiesFileProvider {
    fn entries(&self) -> Vec<ConfigEntry> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => parse_properties(&contents)
                .into_iter()
                .map(|(k, v)| ConfigEntry::new(k, v))
                .collect(),
            Err(e) => {
                warn!("Failed to read properties file {:?}: {}", self.path, e);
                Vec::new()
            }
        }
    }
}

/// Merges several providers; on duplicate keys the later provider wins.
#[derive(Clone, Default)]
pub struct LayeredProvider {
    layers: Vec<Arc<dyn ConfigProvider>>,
}

impl LayeredProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layer(mut self, provider: Arc<dyn ConfigProvider>) -> Self {
        self.layers.push(provider);
        self
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl ConfigProvider for LayeredProvider {
    fn entries(&self) -> Vec<ConfigEntry> {
        let mut merged = BTreeMap::new();
        for layer in &self.layers {
            for entry in layer.entries() {
                merged.insert(entry.key, entry.value);
            }
        }
        merged
            .into_iter()
            .map(|(key, value)| ConfigEntry { key, value })
            .collect()
    }
}

/// Parses properties text into a sorted map.
pub fn parse_properties(contents: &str) -> BTreeMap<String, String> {
    let mut values = BTreeMap::new();
    let mut lines = contents.lines();

    while let Some(line) = lines.next() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
            continue;
        }

        let mut logical = trimmed.to_string();
        while ends_with_continuation(&logical) {
            logical.pop();
            match lines.next() {
                Some(next) => logical.push_str(next.trim_start()),
                None => break,
            }
        }

        let Some((raw_key, raw_value)) = split_at_separator(&logical) else {
            warn!("Ignoring properties line without '=': {}", logical);
            continue;
        };
        let key = unescape(raw_key.trim());
        if key.is_empty() {
            continue;
        }
        values.insert(key, unescape(raw_value.trim_start()));
    }

    values
}

/// An odd number of trailing backslashes means the line continues.
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

fn split_at_separator(line: &str) -> Option<(&str, &str)> {
    let mut escaped = false;
    for (idx, c) in line.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '=' {
            return Some((&line[..idx], &line[idx + 1..]));
        }
    }
    None
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn continuation_detection() {
        assert!(ends_with_continuation("abc\\"));
        assert!(!ends_with_continuation("abc\\\\"));
        assert!(!ends_with_continuation("abc"));
    }

    #[test]
    fn separator_skips_escaped_equals() {
        assert_eq!(split_at_separator(r"a\=b=c"), Some((r"a\=b", "c")));
        assert_eq!(split_at_separator("no separator"), None);
    }

    #[test]
    fn unescape_sequences() {
        assert_eq!(unescape(r"a\:b\=c\\d\n"), "a:b=c\\d\n");
    }
}
