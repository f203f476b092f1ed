//! Unified update contract for pipeline stages
//!
//! Each independently updatable local cache (identity certificate,
//! repository config, facts, software profile, installed products,
//! healing, entitlement certificates) implements [`SyncStage`]. Every
//! stage reports through the same [`StageOutcome`] shape; stages with
//! nothing to say beyond a change count return an empty error list.

use serde::{Deserialize, Serialize};

use crate::Result;

/// Result of one stage update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageOutcome {
    /// Number of local changes the stage applied.
    pub updates: u64,
    /// Non-fatal conditions the stage wants surfaced to the operator.
    /// These do not abort the pipeline.
    pub errors: Vec<String>,
}

impl StageOutcome {
    /// Outcome with no changes and no reportable conditions.
    pub fn none() -> Self {
        Self::default()
    }

    /// Outcome with a change count and no reportable conditions.
    pub fn changes(updates: u64) -> Self {
        Self {
            updates,
            errors: Vec::new(),
        }
    }

    /// Outcome carrying both a change count and reportable conditions.
    pub fn with_errors(updates: u64, errors: Vec<String>) -> Self {
        Self { updates, errors }
    }
}

/// One independently updatable local cache.
///
/// An implementation refreshes its cache against the remote entitlement
/// service and reports how many changes it applied. A returned error is
/// fatal to the current pipeline run; partial, reportable failures belong
/// in [`StageOutcome::errors`] instead.
pub trait SyncStage: Send + Sync {
    /// Short stable name used in logs and error context.
    fn name(&self) -> &'static str;

    /// Refresh this stage's local cache against the remote service.
    fn update(&self) -> Result<StageOutcome>;
}

impl<T: SyncStage + ?Sized> SyncStage for std::sync::Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn update(&self) -> Result<StageOutcome> {
        (**self).update()
    }
}
