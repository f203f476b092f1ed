//! Consumer identity state shared between the sync pipeline and the
//! certificate-directory watcher.
//!
//! The registered system's credential pair (certificate + key) lives in a
//! single directory on disk. Both the update pipeline and the directory
//! watcher hold the same [`Identity`] handle; the watcher refreshes it
//! whenever the directory changes, and every other holder observes the new
//! state without re-acquiring the handle.
//!
//! Reloading replaces the whole [`IdentitySnapshot`] through an atomic
//! pointer swap, so readers never see a half-updated credential pair.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;

/// File name of the consumer certificate inside the certificate directory.
pub const CONSUMER_CERT_FILE: &str = "cert.pem";

/// File name of the consumer key inside the certificate directory.
pub const CONSUMER_KEY_FILE: &str = "key.pem";

/// Immutable view of the on-disk credential state at one point in time.
///
/// Snapshots are cheap to clone and never mutated after construction; take
/// one via [`Identity::snapshot`] when multiple fields must be read
/// consistently.
#[derive(Debug, Clone, Default)]
pub struct IdentitySnapshot {
    /// PEM bytes of the consumer certificate, if present on disk.
    pub consumer_cert: Option<Vec<u8>>,
    /// PEM bytes of the consumer key, if present on disk.
    pub consumer_key: Option<Vec<u8>>,
}

impl IdentitySnapshot {
    fn read(cert_dir: &Path) -> Self {
        Self {
            consumer_cert: read_credential(&cert_dir.join(CONSUMER_CERT_FILE)),
            consumer_key: read_credential(&cert_dir.join(CONSUMER_KEY_FILE)),
        }
    }

    /// Whether both halves of the credential pair are present.
    pub fn is_registered(&self) -> bool {
        self.consumer_cert.is_some() && self.consumer_key.is_some()
    }
}

fn read_credential(path: &Path) -> Option<Vec<u8>> {
    match fs::read(path) {
        Ok(bytes) => Some(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            tracing::debug!("Failed to read credential {}: {}", path.display(), e);
            None
        }
    }
}

/// Shared handle to the system's registered credential pair.
///
/// The handle is constructed once and passed by reference to every
/// component that needs identity state. [`Identity::reload`] re-reads the
/// credential files and swaps in a fully constructed snapshot; it never
/// fails visibly and is safe to call concurrently with any reader.
pub struct Identity {
    cert_dir: PathBuf,
    snapshot: ArcSwap<IdentitySnapshot>,
}

impl Identity {
    /// Create a handle over the given certificate directory, reading the
    /// initial credential state from disk. Missing files simply leave the
    /// corresponding snapshot field empty.
    pub fn new(cert_dir: impl Into<PathBuf>) -> Self {
        let cert_dir = cert_dir.into();
        let snapshot = ArcSwap::from_pointee(IdentitySnapshot::read(&cert_dir));
        Self { cert_dir, snapshot }
    }

    /// The watched certificate directory.
    pub fn cert_dir_path(&self) -> &Path {
        &self.cert_dir
    }

    /// Full path of the consumer certificate file.
    pub fn cert_file_path(&self) -> PathBuf {
        self.cert_dir.join(CONSUMER_CERT_FILE)
    }

    /// Full path of the consumer key file.
    pub fn key_file_path(&self) -> PathBuf {
        self.cert_dir.join(CONSUMER_KEY_FILE)
    }

    /// Current snapshot of the credential state. The returned `Arc` stays
    /// valid after later reloads; callers needing a consistent multi-field
    /// view should read through one snapshot rather than the handle.
    pub fn snapshot(&self) -> Arc<IdentitySnapshot> {
        self.snapshot.load_full()
    }

    /// Whether the system currently holds a complete credential pair.
    pub fn is_registered(&self) -> bool {
        self.snapshot.load().is_registered()
    }

    /// Re-read the credential files from disk and atomically replace the
    /// snapshot. Read failures are absorbed: the affected field comes back
    /// empty and the cause is logged at debug level.
    pub fn reload(&self) {
        self.snapshot
            .store(Arc::new(IdentitySnapshot::read(&self.cert_dir)));
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("cert_dir", &self.cert_dir)
            .field("registered", &self.is_registered())
            .finish()
    }
}
