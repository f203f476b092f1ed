//! [`TestEnv`] fixture for entitlement-sync test scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary on-disk layout mirroring the paths the daemon uses:
/// a certificate directory, a custom-facts directory, and a facts cache
/// file, all rooted in one scratch directory.
///
/// # Example
///
/// ```rust,no_run
/// use entsync_test_utils::TestEnv;
///
/// let env = TestEnv::new();
/// env.write_cert(b"CERT");
/// env.write_custom_fact("10-site.facts", r#"{"site.owner": "ops"}"#);
/// assert!(env.cert_file_path().exists());
/// ```
pub struct TestEnv {
    temp_dir: TempDir,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    /// Create the scratch layout with an existing certificate directory
    /// and custom-facts directory.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("pki")).unwrap();
        fs::create_dir_all(temp_dir.path().join("facts.d")).unwrap();
        Self { temp_dir }
    }

    /// Root of the scratch directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// The watched certificate directory.
    pub fn cert_dir(&self) -> PathBuf {
        self.root().join("pki")
    }

    /// Full path of the consumer certificate file.
    pub fn cert_file_path(&self) -> PathBuf {
        self.cert_dir().join("cert.pem")
    }

    /// Full path of the consumer key file.
    pub fn key_file_path(&self) -> PathBuf {
        self.cert_dir().join("key.pem")
    }

    /// The custom-facts directory.
    pub fn custom_facts_dir(&self) -> PathBuf {
        self.root().join("facts.d")
    }

    /// Location of the facts cache file (not created by default).
    pub fn facts_cache_path(&self) -> PathBuf {
        self.root().join("facts.json")
    }

    /// Location for a pipeline lock file.
    pub fn lock_path(&self) -> PathBuf {
        self.root().join("update.pid")
    }

    /// Write the consumer certificate file.
    pub fn write_cert(&self, body: &[u8]) {
        fs::write(self.cert_file_path(), body).unwrap();
    }

    /// Write the consumer key file.
    pub fn write_key(&self, body: &[u8]) {
        fs::write(self.key_file_path(), body).unwrap();
    }

    /// Remove the consumer certificate file.
    pub fn remove_cert(&self) {
        fs::remove_file(self.cert_file_path()).unwrap();
    }

    /// Remove the consumer key file.
    pub fn remove_key(&self) {
        fs::remove_file(self.key_file_path()).unwrap();
    }

    /// Write a file into the custom-facts directory.
    pub fn write_custom_fact(&self, name: &str, body: &str) {
        fs::write(self.custom_facts_dir().join(name), body).unwrap();
    }

    /// Write the facts cache file from a JSON value.
    pub fn write_facts_cache(&self, facts: &serde_json::Value) {
        let body = serde_json::to_string(facts).unwrap();
        fs::write(self.facts_cache_path(), body).unwrap();
    }
}
