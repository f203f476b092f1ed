//! Generic directory watch registrations
//!
//! A [`DirectoryWatch`] is a (path, event-mask, callback) rule. The
//! watcher evaluates every incoming event against every registered rule
//! independently; more than one rule may fire for a single event.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::mask::EventMask;

/// Callback invoked when a registered watch matches an event.
pub type WatchCallback = Box<dyn Fn() + Send + Sync>;

/// A registered (path, mask, callback) rule.
pub struct DirectoryWatch {
    path: PathBuf,
    mask: EventMask,
    callback: WatchCallback,
}

impl DirectoryWatch {
    pub fn new(path: impl Into<PathBuf>, mask: EventMask, callback: WatchCallback) -> Self {
        Self {
            path: path.into(),
            mask,
            callback,
        }
    }

    /// True when the event path is the watched path or lives under it.
    pub fn match_path(&self, path: &Path) -> bool {
        path.starts_with(&self.path)
    }

    /// True when the event mask intersects the registered interest.
    pub fn match_mask(&self, mask: EventMask) -> bool {
        self.mask.intersects(mask)
    }

    /// Fire the registered callback.
    pub fn notify(&self) {
        (self.callback)();
    }
}

impl fmt::Debug for DirectoryWatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryWatch")
            .field("path", &self.path)
            .field("mask", &self.mask)
            .finish_non_exhaustive()
    }
}
