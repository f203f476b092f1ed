//! Event classes the watcher reacts to

use notify::EventKind;

bitflags::bitflags! {
    /// Filesystem event classes of interest.
    ///
    /// Only creation and deletion are registered: modification-in-place
    /// of the credential files is not a supported update path, so write
    /// events are never dispatched.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct EventMask: u8 {
        const CREATE = 1 << 0;
        const DELETE = 1 << 1;
    }
}

impl EventMask {
    /// Map a raw notify event kind onto the watcher's mask. Returns `None`
    /// for kinds outside the registered interest (writes, metadata
    /// updates, access events).
    pub fn from_event_kind(kind: &EventKind) -> Option<Self> {
        match kind {
            EventKind::Create(_) => Some(Self::CREATE),
            EventKind::Remove(_) => Some(Self::DELETE),
            _ => None,
        }
    }
}
