//! Fact collection and change detection
//!
//! The [`FactStore`] assembles the system's fact set from the hardware
//! probe, the hardcoded preferred certificate version, custom fact files,
//! and plugin hooks, then compares it against the last set pushed to the
//! entitlement service.

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use serde_json::Value;

use crate::cache::CacheFile;
use crate::diff::diff_facts;
use crate::{Error, Result};

/// A fact mapping: fact name to string/number/boolean value.
pub type FactSet = std::collections::BTreeMap<String, Value>;

/// Certificate version this client prefers when talking to the service.
pub const CERT_VERSION: &str = "3.2";

/// Fact key carrying the preferred certificate version.
pub const CERT_VERSION_FACT: &str = "system.certificate_version";

/// Extension of custom fact files inside the configured directory.
pub const CUSTOM_FACTS_EXT: &str = "facts";

/// Collaborator returning a flat mapping of all detectable
/// hardware/software facts. Errors propagate; nothing here recovers a
/// failed probe.
pub trait HardwareProbe: Send + Sync {
    fn collect(&self) -> Result<FactSet>;
}

/// Hook invoked with the fully assembled fact mapping, allowed to add or
/// overwrite any key.
pub trait FactsPlugin: Send + Sync {
    fn post_facts_collection(&self, facts: &mut FactSet);
}

/// Computes the current fact set and decides whether it drifted from the
/// last value pushed to the service.
///
/// Facts that fluctuate without operational significance (the graylist)
/// never trigger a resync by themselves; without the list, an
/// instantaneous CPU clock reading would cause continuous fact churn.
pub struct FactStore {
    probe: Box<dyn HardwareProbe>,
    plugins: Vec<Box<dyn FactsPlugin>>,
    custom_dir: PathBuf,
    cache: CacheFile,
    graylist: BTreeSet<String>,
    current: Option<FactSet>,
}

impl FactStore {
    /// Create a store over the probe collaborator, the custom facts
    /// directory, and the cache file location. The graylist starts with
    /// the stock volatile keys.
    pub fn new(
        probe: Box<dyn HardwareProbe>,
        custom_dir: impl Into<PathBuf>,
        cache_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            probe,
            plugins: Vec::new(),
            custom_dir: custom_dir.into(),
            cache: CacheFile::new(cache_path),
            graylist: [String::from("cpu.cpu_mhz")].into_iter().collect(),
            current: None,
        }
    }

    /// Register a plugin hook. Hooks run last, in registration order.
    pub fn add_plugin(&mut self, plugin: Box<dyn FactsPlugin>) {
        self.plugins.push(plugin);
    }

    /// The keys excluded from value-change detection.
    pub fn graylist(&self) -> &BTreeSet<String> {
        &self.graylist
    }

    /// Reader for the last-pushed cache.
    pub fn cache(&self) -> &CacheFile {
        &self.cache
    }

    /// The current fact set, recomputed when empty or when `refresh` is
    /// requested, memoized otherwise.
    ///
    /// Assembly order: hardware probe, then the preferred certificate
    /// version fact (overwriting any probe value under the same key), then
    /// custom fact files, then plugin hooks.
    ///
    /// # Errors
    ///
    /// Returns an error if the probe fails or a custom facts file is
    /// readable but malformed.
    pub fn facts(&mut self, refresh: bool) -> Result<&FactSet> {
        if refresh || self.current.is_none() {
            self.current = Some(self.collect()?);
        }
        Ok(self.current.get_or_insert_with(FactSet::new))
    }

    /// Whether the current fact set differs meaningfully from the last
    /// one pushed to the service. A missing or unreadable cache means
    /// there is nothing to diff against, so the answer is `false`.
    pub fn has_changed(&mut self) -> Result<bool> {
        Ok(!self.changed_facts()?.is_empty())
    }

    /// The keys that changed relative to the last pushed set, with removed
    /// keys reported under their old value.
    pub fn changed_facts(&mut self) -> Result<FactSet> {
        let cached = self.cache.read();
        let graylist = self.graylist.clone();
        let current = self.facts(false)?;
        Ok(diff_facts(current, cached.as_ref(), &graylist))
    }

    fn collect(&self) -> Result<FactSet> {
        let mut facts = self.probe.collect()?;

        facts.insert(
            CERT_VERSION_FACT.to_string(),
            Value::String(CERT_VERSION.to_string()),
        );

        facts.extend(self.load_custom_facts()?);

        for plugin in &self.plugins {
            plugin.post_facts_collection(&mut facts);
        }

        Ok(facts)
    }

    /// Load `*.facts` documents from the custom directory, merged in
    /// sorted filename order so later files overwrite earlier ones on key
    /// collision regardless of readdir order. Unreadable files are
    /// skipped; malformed JSON in a readable file propagates.
    fn load_custom_facts(&self) -> Result<FactSet> {
        let mut merged = FactSet::new();
        if !self.custom_dir.is_dir() {
            return Ok(merged);
        }

        let mut paths: Vec<PathBuf> = fs::read_dir(&self.custom_dir)?
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == CUSTOM_FACTS_EXT))
            .collect();
        paths.sort();

        for path in paths {
            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    tracing::debug!(
                        "Skipping unreadable facts file {}: {}",
                        path.display(),
                        e
                    );
                    continue;
                }
            };

            let doc: FactSet =
                serde_json::from_str(&content).map_err(|e| Error::CustomFacts {
                    path: path.clone(),
                    message: e.to_string(),
                })?;
            merged.extend(doc);
        }

        Ok(merged)
    }
}
