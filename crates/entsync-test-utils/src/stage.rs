//! [`MockStage`] double for pipeline tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use entsync_core::{Error, Result, StageOutcome, SyncStage};

/// A scriptable [`SyncStage`] that journals its invocations.
///
/// Each `update()` call appends the stage name to the shared journal (when
/// one is attached) and bumps the call counter, then returns the scripted
/// outcome or error.
pub struct MockStage {
    name: &'static str,
    outcome: std::result::Result<StageOutcome, String>,
    calls: AtomicUsize,
    journal: Option<Arc<Mutex<Vec<&'static str>>>>,
}

impl MockStage {
    /// Stage that reports `updates` changes and no errors.
    pub fn ok(name: &'static str, updates: u64) -> Self {
        Self {
            name,
            outcome: Ok(StageOutcome::changes(updates)),
            calls: AtomicUsize::new(0),
            journal: None,
        }
    }

    /// Stage that reports changes plus raw reportable conditions.
    pub fn with_errors(name: &'static str, updates: u64, errors: &[&str]) -> Self {
        Self {
            name,
            outcome: Ok(StageOutcome::with_errors(
                updates,
                errors.iter().map(|e| e.to_string()).collect(),
            )),
            calls: AtomicUsize::new(0),
            journal: None,
        }
    }

    /// Stage whose update fails with a stage error.
    pub fn failing(name: &'static str, message: &str) -> Self {
        Self {
            name,
            outcome: Err(message.to_string()),
            calls: AtomicUsize::new(0),
            journal: None,
        }
    }

    /// Attach a shared journal recording invocation order across stages.
    pub fn journaled(mut self, journal: &Arc<Mutex<Vec<&'static str>>>) -> Self {
        self.journal = Some(Arc::clone(journal));
        self
    }

    /// Number of times `update()` ran.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SyncStage for MockStage {
    fn name(&self) -> &'static str {
        self.name
    }

    fn update(&self) -> Result<StageOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(journal) = &self.journal {
            journal
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(self.name);
        }
        match &self.outcome {
            Ok(outcome) => Ok(outcome.clone()),
            Err(message) => Err(Error::stage(self.name, message)),
        }
    }
}

// A counting handle kept by a test while the engine owns the boxed stage
// relies on the blanket `SyncStage for Arc<T>` impl in entsync-core.
