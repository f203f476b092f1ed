//! Runtime settings for the sync daemon
//!
//! Settings are read from a single TOML file. Every key has a default, so
//! a missing file or an empty document yields a fully usable
//! configuration; a present but malformed file is an error.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Result;

fn default_cert_dir() -> PathBuf {
    PathBuf::from("/etc/pki/consumer")
}

fn default_custom_facts_dir() -> PathBuf {
    PathBuf::from("/etc/entsync/facts")
}

fn default_facts_cache_file() -> PathBuf {
    PathBuf::from("/var/lib/entsync/facts.json")
}

fn default_lock_file() -> PathBuf {
    PathBuf::from("/var/run/entsync/update.pid")
}

fn default_poll_interval_secs() -> u64 {
    1
}

/// Filesystem locations used by the pipeline and the fact store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsSection {
    /// Directory holding the consumer certificate and key.
    #[serde(default = "default_cert_dir")]
    pub cert_dir: PathBuf,

    /// Directory scanned for `*.facts` documents.
    #[serde(default = "default_custom_facts_dir")]
    pub custom_facts_dir: PathBuf,

    /// Last fact set pushed to the entitlement service.
    #[serde(default = "default_facts_cache_file")]
    pub facts_cache_file: PathBuf,

    /// Pipeline lock file.
    #[serde(default = "default_lock_file")]
    pub lock_file: PathBuf,
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            cert_dir: default_cert_dir(),
            custom_facts_dir: default_custom_facts_dir(),
            facts_cache_file: default_facts_cache_file(),
            lock_file: default_lock_file(),
        }
    }
}

/// Certificate-directory watcher tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchSection {
    /// Bounded wait between termination checks in the watcher loop.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

/// Parsed daemon settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Filesystem locations.
    #[serde(default)]
    pub paths: PathsSection,

    /// Watcher tuning.
    #[serde(default)]
    pub watch: WatchSection,
}

impl Settings {
    /// Parse settings from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML.
    pub fn parse(content: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(content)?;
        Ok(settings)
    }

    /// Load settings from a file, falling back to defaults when the file
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Watcher poll interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.watch.poll_interval_secs)
    }
}
