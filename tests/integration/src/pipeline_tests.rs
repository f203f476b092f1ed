//! End-to-end tests for the update pipeline

use std::sync::{Arc, Mutex};

use entsync_core::{ActionLock, Error, Mode, Stages, SyncEngine};
use entsync_test_utils::{MockStage, TestEnv};
use pretty_assertions::assert_eq;

/// All seven stage doubles, kept by handle so call counts stay observable
/// after the engine takes ownership of the boxed clones.
struct StageSet {
    identity_cert: Arc<MockStage>,
    repos: Arc<MockStage>,
    facts: Arc<MockStage>,
    profile: Arc<MockStage>,
    installed_products: Arc<MockStage>,
    healing: Arc<MockStage>,
    entitlement_certs: Arc<MockStage>,
}

impl StageSet {
    fn all_ok(journal: &Arc<Mutex<Vec<&'static str>>>) -> Self {
        Self {
            identity_cert: Arc::new(MockStage::ok("identity_cert", 1).journaled(journal)),
            repos: Arc::new(MockStage::ok("repos", 2).journaled(journal)),
            facts: Arc::new(MockStage::ok("facts", 0).journaled(journal)),
            profile: Arc::new(MockStage::ok("profile", 1).journaled(journal)),
            installed_products: Arc::new(
                MockStage::ok("installed_products", 1).journaled(journal),
            ),
            healing: Arc::new(MockStage::ok("healing", 4).journaled(journal)),
            entitlement_certs: Arc::new(MockStage::ok("entitlement_certs", 3).journaled(journal)),
        }
    }

    fn wire(&self) -> Stages {
        Stages {
            identity_cert: Box::new(Arc::clone(&self.identity_cert)),
            repos: Box::new(Arc::clone(&self.repos)),
            facts: Box::new(Arc::clone(&self.facts)),
            profile: Box::new(Arc::clone(&self.profile)),
            installed_products: Box::new(Arc::clone(&self.installed_products)),
            healing: Box::new(Arc::clone(&self.healing)),
            entitlement_certs: Box::new(Arc::clone(&self.entitlement_certs)),
        }
    }
}

fn engine_for(set: &StageSet, env: &TestEnv) -> SyncEngine {
    let lock = Arc::new(ActionLock::new(env.lock_path()));
    SyncEngine::new(lock, set.wire())
}

#[test]
fn normal_mode_runs_five_stages_plus_certs_in_order() {
    let env = TestEnv::new();
    let journal = Arc::new(Mutex::new(Vec::new()));
    let set = StageSet::all_ok(&journal);
    let engine = engine_for(&set, &env);

    let report = engine.update(Mode::Normal).unwrap();

    assert_eq!(report.updates, 1 + 2 + 0 + 1 + 1 + 3);
    assert!(report.errors.is_empty());
    assert_eq!(
        *journal.lock().unwrap(),
        vec![
            "identity_cert",
            "repos",
            "facts",
            "profile",
            "installed_products",
            "entitlement_certs",
        ]
    );
    assert_eq!(set.healing.calls(), 0);
}

#[test]
fn heal_mode_runs_only_healing_plus_certs() {
    let env = TestEnv::new();
    let journal = Arc::new(Mutex::new(Vec::new()));
    let set = StageSet::all_ok(&journal);
    let engine = engine_for(&set, &env);

    let report = engine.update(Mode::Heal).unwrap();

    assert_eq!(report.updates, 4 + 3);
    assert_eq!(
        *journal.lock().unwrap(),
        vec!["healing", "entitlement_certs"]
    );
    assert_eq!(set.identity_cert.calls(), 0);
    assert_eq!(set.repos.calls(), 0);
    assert_eq!(set.facts.calls(), 0);
    assert_eq!(set.profile.calls(), 0);
    assert_eq!(set.installed_products.calls(), 0);
}

#[test]
fn cert_stage_errors_reduce_to_cleaned_summaries() {
    let env = TestEnv::new();
    let journal = Arc::new(Mutex::new(Vec::new()));
    let mut set = StageSet::all_ok(&journal);
    set.entitlement_certs = Arc::new(
        MockStage::with_errors(
            "entitlement_certs",
            2,
            &[
                "Unit - certificate expired",
                "Network error - server said no",
            ],
        )
        .journaled(&journal),
    );
    let engine = engine_for(&set, &env);

    let report = engine.update(Mode::Normal).unwrap();

    assert_eq!(report.updates, 1 + 2 + 0 + 1 + 1 + 2);
    assert_eq!(
        report.errors,
        vec![
            "certificate expired".to_string(),
            "server said no".to_string(),
        ]
    );
}

#[test]
fn failing_stage_aborts_pipeline_and_skips_cert_stage() {
    let env = TestEnv::new();
    let journal = Arc::new(Mutex::new(Vec::new()));
    let mut set = StageSet::all_ok(&journal);
    set.repos = Arc::new(MockStage::failing("repos", "connection refused").journaled(&journal));
    let engine = engine_for(&set, &env);

    let err = engine.update(Mode::Normal).unwrap_err();
    assert!(matches!(err, Error::Stage { .. }));

    assert_eq!(*journal.lock().unwrap(), vec!["identity_cert", "repos"]);
    assert_eq!(set.facts.calls(), 0);
    assert_eq!(set.entitlement_certs.calls(), 0);
}

#[test]
fn lock_is_free_after_a_failed_run() {
    let env = TestEnv::new();
    let journal = Arc::new(Mutex::new(Vec::new()));
    let mut set = StageSet::all_ok(&journal);
    set.facts = Arc::new(MockStage::failing("facts", "probe exploded").journaled(&journal));
    let engine = engine_for(&set, &env);

    assert!(engine.update(Mode::Normal).is_err());
    assert_eq!(engine.lock().depth(), 0);

    // The next invocation acquires the lock again and completes.
    let report = engine.update(Mode::Heal).unwrap();
    assert_eq!(report.updates, 4 + 3);
}

#[test]
fn repeated_runs_reacquire_the_lock() {
    let env = TestEnv::new();
    let journal = Arc::new(Mutex::new(Vec::new()));
    let set = StageSet::all_ok(&journal);
    let engine = engine_for(&set, &env);

    engine.update(Mode::Normal).unwrap();
    engine.update(Mode::Normal).unwrap();

    assert_eq!(set.entitlement_certs.calls(), 2);
    assert_eq!(engine.lock().depth(), 0);
}
