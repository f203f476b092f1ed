//! SyncEngine implementation
//!
//! The SyncEngine runs the mutually-exclusive update pipeline: it takes
//! the pipeline lock, invokes the stage list selected by [`Mode`] in a
//! fixed order, always finishes with the entitlement-certificate stage,
//! and aggregates change counts and reportable stage conditions into a
//! [`SyncReport`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::lock::ActionLock;
use crate::mode::Mode;
use crate::stage::{StageOutcome, SyncStage};
use crate::Result;

/// Report from one pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncReport {
    /// Total number of changes applied across all stages.
    pub updates: u64,
    /// Cleaned, user-facing summaries of the conditions stages reported.
    pub errors: Vec<String>,
}

/// The stage handles driven by the engine.
///
/// Stage internals are external collaborators; the engine only relies on
/// the [`SyncStage`] contract. Ordering requirements live in
/// [`SyncEngine::update`], not here.
pub struct Stages {
    /// Refreshes the consumer identity certificate.
    pub identity_cert: Box<dyn SyncStage>,
    /// Regenerates repository configuration from current entitlements.
    pub repos: Box<dyn SyncStage>,
    /// Pushes the local fact set when it drifted.
    pub facts: Box<dyn SyncStage>,
    /// Uploads the software profile.
    pub profile: Box<dyn SyncStage>,
    /// Uploads the installed-product list.
    pub installed_products: Box<dyn SyncStage>,
    /// Performs entitlement auto-attach.
    pub healing: Box<dyn SyncStage>,
    /// Refreshes entitlement certificates; runs last in every mode.
    pub entitlement_certs: Box<dyn SyncStage>,
}

/// Engine for the ordered, mutually-exclusive update pipeline.
pub struct SyncEngine {
    lock: Arc<ActionLock>,
    stages: Stages,
}

impl SyncEngine {
    /// Create an engine over the shared pipeline lock and stage handles.
    pub fn new(lock: Arc<ActionLock>, stages: Stages) -> Self {
        Self { lock, stages }
    }

    /// The pipeline lock, shared with any other callers that must not
    /// overlap with an update run.
    pub fn lock(&self) -> &Arc<ActionLock> {
        &self.lock
    }

    /// Run one update pass.
    ///
    /// Acquires the pipeline lock for the whole run, executes the mode's
    /// stage list in order, then the entitlement-certificate stage. Later
    /// stages depend on state refreshed by earlier ones (repository
    /// generation needs a current identity certificate), so a stage error
    /// aborts the remaining pipeline; the lock is released on every exit
    /// path and the error propagates to the invoking scheduler.
    ///
    /// # Errors
    ///
    /// Returns the first stage error, or a lock acquisition failure.
    pub fn update(&self, mode: Mode) -> Result<SyncReport> {
        let _guard = self.lock.acquire()?;
        let mut report = SyncReport::default();

        for stage in self.stage_order(mode) {
            let outcome = stage.update()?;
            tracing::debug!(
                stage = stage.name(),
                updates = outcome.updates,
                "Stage update complete"
            );
            absorb_outcome(&mut report, stage.name(), outcome);
        }

        let cert_stage = self.stages.entitlement_certs.as_ref();
        let outcome = cert_stage.update()?;
        tracing::debug!(
            stage = cert_stage.name(),
            updates = outcome.updates,
            "Stage update complete"
        );
        absorb_outcome(&mut report, cert_stage.name(), outcome);

        tracing::info!(mode = %mode, updates = report.updates, "Update pipeline finished");
        Ok(report)
    }

    fn stage_order(&self, mode: Mode) -> Vec<&dyn SyncStage> {
        match mode {
            Mode::Heal => vec![self.stages.healing.as_ref()],
            Mode::Normal => vec![
                self.stages.identity_cert.as_ref(),
                self.stages.repos.as_ref(),
                self.stages.facts.as_ref(),
                self.stages.profile.as_ref(),
                self.stages.installed_products.as_ref(),
            ],
        }
    }
}

fn absorb_outcome(report: &mut SyncReport, stage: &str, outcome: StageOutcome) {
    report.updates += outcome.updates;
    for raw in outcome.errors {
        let message = clean_stage_error(&raw);
        if message.is_empty() {
            tracing::debug!(stage, "Dropping unreportable stage condition: {raw}");
            continue;
        }
        tracing::warn!(stage, "{message}");
        report.errors.push(message);
    }
}

/// Reduce a stage-reported condition to its user-facing summary: drop the
/// source-specific prefix before the first `-`, join the remaining
/// segments with spaces, and trim.
pub fn clean_stage_error(raw: &str) -> String {
    raw.split('-')
        .skip(1)
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}
