//! Facts stage for the update pipeline
//!
//! Adapts the [`FactStore`] to the pipeline's stage contract: when the
//! local fact set drifted from the last pushed value, the current set is
//! handed to the upload collaborator and one change is reported.
//! Writing the cache file after a successful push belongs to the upload
//! side, not here.

use std::sync::Mutex;

use entsync_core::{StageOutcome, SyncStage};

use crate::store::{FactSet, FactStore};

/// Collaborator that delivers a fact set to the entitlement service.
pub trait FactsUploader: Send + Sync {
    fn send_facts(&self, facts: &FactSet) -> entsync_core::Result<()>;
}

/// Pipeline stage pushing the fact set when it changed.
pub struct FactsStage {
    store: Mutex<FactStore>,
    uploader: Box<dyn FactsUploader>,
}

impl FactsStage {
    pub fn new(store: FactStore, uploader: Box<dyn FactsUploader>) -> Self {
        Self {
            store: Mutex::new(store),
            uploader,
        }
    }
}

impl SyncStage for FactsStage {
    fn name(&self) -> &'static str {
        "facts"
    }

    fn update(&self) -> entsync_core::Result<StageOutcome> {
        let mut store = self.store.lock().unwrap_or_else(|e| e.into_inner());

        let changed = store
            .has_changed()
            .map_err(|e| entsync_core::Error::stage(self.name(), e.to_string()))?;
        if !changed {
            tracing::debug!("Facts have not changed, skipping upload");
            return Ok(StageOutcome::none());
        }

        let facts = store
            .facts(false)
            .map_err(|e| entsync_core::Error::stage(self.name(), e.to_string()))?
            .clone();
        drop(store);

        self.uploader.send_facts(&facts)?;
        Ok(StageOutcome::changes(1))
    }
}
