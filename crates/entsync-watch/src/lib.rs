//! Certificate-directory watcher for entitlement-sync
//!
//! A long-running loop that keeps the in-memory [`entsync_identity::Identity`]
//! consistent with what the certificate directory actually contains:
//!
//! - [`CertWatcher`]: non-recursive create/delete watch on the certificate
//!   directory, with a bounded-wait loop for cooperative shutdown
//! - [`DirectoryWatch`]: generic (path, mask, callback) rules dispatched
//!   independently for every event
//! - [`EventMask`]: the create/delete interest set
//!
//! The watcher never raises out of its dispatch path; only the initial
//! watch registration can fail.

pub mod dir_watch;
pub mod error;
pub mod mask;
pub mod watcher;

pub use dir_watch::{DirectoryWatch, WatchCallback};
pub use error::{Error, Result};
pub use mask::EventMask;
pub use watcher::{CertWatcher, DEFAULT_POLL_INTERVAL, WatchedIdentity};
