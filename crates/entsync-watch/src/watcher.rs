//! Certificate-directory watcher
//!
//! Watches the identity's certificate directory for created and deleted
//! files and keeps the in-memory identity in step with the filesystem.
//! Every change in the directory triggers a reload, not just changes to
//! the two tracked files: an atomic rename-based replacement may never
//! touch the tracked name in its intermediate steps.
//!
//! The loop blocks for at most one poll interval per iteration and then
//! consults a host-supplied termination predicate, so shutdown is
//! observed within one interval of the host signaling it.

use std::path::Path;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};

use entsync_identity::Identity;

use crate::dir_watch::DirectoryWatch;
use crate::mask::EventMask;
use crate::{Error, Result};

/// Default bounded wait between termination checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// The watcher's view of the shared identity handle.
pub trait WatchedIdentity: Send + Sync {
    fn cert_dir_path(&self) -> &Path;
    fn cert_file_path(&self) -> std::path::PathBuf;
    fn key_file_path(&self) -> std::path::PathBuf;
    fn reload(&self);
}

impl WatchedIdentity for Identity {
    fn cert_dir_path(&self) -> &Path {
        Identity::cert_dir_path(self)
    }

    fn cert_file_path(&self) -> std::path::PathBuf {
        Identity::cert_file_path(self)
    }

    fn key_file_path(&self) -> std::path::PathBuf {
        Identity::key_file_path(self)
    }

    fn reload(&self) {
        Identity::reload(self)
    }
}

/// Watcher over the certificate directory plus generic watch dispatch.
pub struct CertWatcher {
    identity: Arc<dyn WatchedIdentity>,
    dir_watches: Vec<DirectoryWatch>,
    poll_interval: Duration,
    events: Receiver<notify::Result<Event>>,
    // Dropping the backend deregisters the watch, so it lives as long as
    // the watcher.
    _backend: RecommendedWatcher,
}

impl CertWatcher {
    /// Register a non-recursive watch on the identity's certificate
    /// directory with the default poll interval.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WatchRegistration`] when the watch cannot be set
    /// up; this is fatal to the watcher.
    pub fn new(
        identity: Arc<dyn WatchedIdentity>,
        dir_watches: Vec<DirectoryWatch>,
    ) -> Result<Self> {
        Self::with_poll_interval(identity, dir_watches, DEFAULT_POLL_INTERVAL)
    }

    /// Same as [`CertWatcher::new`] with an explicit poll interval.
    pub fn with_poll_interval(
        identity: Arc<dyn WatchedIdentity>,
        dir_watches: Vec<DirectoryWatch>,
        poll_interval: Duration,
    ) -> Result<Self> {
        let (tx, events) = mpsc::channel();
        let cert_dir = identity.cert_dir_path().to_path_buf();

        let mut backend = notify::recommended_watcher(tx).map_err(|source| {
            Error::WatchRegistration {
                path: cert_dir.clone(),
                source,
            }
        })?;
        backend
            .watch(&cert_dir, RecursiveMode::NonRecursive)
            .map_err(|source| Error::WatchRegistration {
                path: cert_dir.clone(),
                source,
            })?;

        tracing::debug!("Watching {} for certificate changes", cert_dir.display());

        Ok(Self {
            identity,
            dir_watches,
            poll_interval,
            events,
            _backend: backend,
        })
    }

    /// Drain and dispatch events until the termination predicate holds.
    ///
    /// The predicate is consulted after every receive wakeup, so
    /// termination is observed within one poll interval. The loop also
    /// ends if the watch backend goes away.
    pub fn run_loop<F>(&self, should_terminate: F)
    where
        F: Fn() -> bool,
    {
        loop {
            match self.events.recv_timeout(self.poll_interval) {
                Ok(Ok(event)) => self.dispatch(&event),
                Ok(Err(e)) => tracing::debug!("Dropping malformed watch event: {}", e),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    tracing::debug!("Watch backend closed, stopping loop");
                    break;
                }
            }

            if should_terminate() {
                tracing::debug!("Termination requested, stopping watch loop");
                break;
            }
        }
    }

    fn dispatch(&self, event: &Event) {
        let Some(mask) = EventMask::from_event_kind(&event.kind) else {
            return;
        };
        for path in &event.paths {
            self.handle_event(path, mask);
        }
    }

    /// Route one create/delete event: note changes to the tracked
    /// credential files, reload the identity unconditionally, then run the
    /// generic watch dispatch.
    pub fn handle_event(&self, path: &Path, mask: EventMask) {
        let cert_path = self.identity.cert_file_path();
        let key_path = self.identity.key_file_path();

        if mask.contains(EventMask::CREATE) {
            if path == cert_path {
                tracing::debug!("New consumer certificate {} was created", path.display());
            }
            if path == key_path {
                tracing::debug!("New consumer key {} was created", path.display());
            }
        }
        if mask.contains(EventMask::DELETE) {
            if path == cert_path {
                tracing::debug!(
                    "Existing consumer certificate {} was removed",
                    path.display()
                );
            }
            if path == key_path {
                tracing::debug!("Existing consumer key {} was removed", path.display());
            }
        }

        self.identity.reload();
        self.process_default(path, mask);
    }

    /// Evaluate every registered directory watch against the event; all
    /// matching entries fire, without short-circuiting.
    pub fn process_default(&self, path: &Path, mask: EventMask) {
        for watch in &self.dir_watches {
            if watch.match_path(path) && watch.match_mask(mask) {
                watch.notify();
            }
        }
    }
}
