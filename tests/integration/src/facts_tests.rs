//! Fact store scenarios against a real on-disk layout

use std::sync::{Arc, Mutex};

use entsync_core::{ActionLock, Mode, Stages, SyncEngine};
use entsync_facts::{
    CERT_VERSION, CERT_VERSION_FACT, FactSet, FactStore, FactsStage, FactsUploader, HardwareProbe,
};
use entsync_test_utils::{MockStage, TestEnv};
use pretty_assertions::assert_eq;
use serde_json::json;

struct FixedProbe(FactSet);

impl HardwareProbe for FixedProbe {
    fn collect(&self) -> entsync_facts::Result<FactSet> {
        Ok(self.0.clone())
    }
}

fn probe(pairs: &[(&str, serde_json::Value)]) -> Box<dyn HardwareProbe> {
    Box::new(FixedProbe(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect(),
    ))
}

fn store_in(env: &TestEnv, probe_facts: &[(&str, serde_json::Value)]) -> FactStore {
    FactStore::new(
        probe(probe_facts),
        env.custom_facts_dir(),
        env.facts_cache_path(),
    )
}

#[test]
fn custom_fact_files_merge_with_later_names_winning() {
    let env = TestEnv::new();
    // Enumeration order is the sorted file names, not creation order.
    env.write_custom_fact("20-override.facts", r#"{"site.owner": "ops"}"#);
    env.write_custom_fact("10-defaults.facts", r#"{"site.owner": "dev", "site.dc": "ams"}"#);

    let mut store = store_in(&env, &[]);
    let facts = store.facts(false).unwrap();

    assert_eq!(facts.get("site.owner"), Some(&json!("ops")));
    assert_eq!(facts.get("site.dc"), Some(&json!("ams")));
    assert_eq!(facts.get(CERT_VERSION_FACT), Some(&json!(CERT_VERSION)));
}

#[test]
fn change_detection_across_collection_layers() {
    let env = TestEnv::new();
    env.write_custom_fact("10-site.facts", r#"{"site.owner": "ops"}"#);

    // Cache matches everything the store will assemble, except the owner.
    env.write_facts_cache(&json!({
        "cpu.core_count": 8,
        "site.owner": "dev",
        (CERT_VERSION_FACT): CERT_VERSION,
    }));

    let mut store = store_in(&env, &[("cpu.core_count", json!(8))]);
    assert!(store.has_changed().unwrap());

    let changed = store.changed_facts().unwrap();
    assert_eq!(changed.len(), 1);
    assert_eq!(changed.get("site.owner"), Some(&json!("ops")));
}

#[test]
fn graylisted_churn_does_not_trigger_resync() {
    let env = TestEnv::new();
    env.write_facts_cache(&json!({
        "cpu.core_count": 8,
        "cpu.cpu_mhz": 2400,
        (CERT_VERSION_FACT): CERT_VERSION,
    }));

    let mut store = store_in(
        &env,
        &[("cpu.core_count", json!(8)), ("cpu.cpu_mhz", json!(3105))],
    );
    assert!(!store.has_changed().unwrap());
}

struct RecordingUploader {
    pushes: Arc<Mutex<Vec<FactSet>>>,
}

impl FactsUploader for RecordingUploader {
    fn send_facts(&self, facts: &FactSet) -> entsync_core::Result<()> {
        self.pushes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(facts.clone());
        Ok(())
    }
}

#[test]
fn engine_drives_the_real_facts_stage() {
    let env = TestEnv::new();
    env.write_facts_cache(&json!({
        "cpu.core_count": 4,
        (CERT_VERSION_FACT): CERT_VERSION,
    }));

    let store = store_in(&env, &[("cpu.core_count", json!(8))]);
    let pushes = Arc::new(Mutex::new(Vec::new()));
    let facts_stage = FactsStage::new(
        store,
        Box::new(RecordingUploader {
            pushes: Arc::clone(&pushes),
        }),
    );

    let stages = Stages {
        identity_cert: Box::new(MockStage::ok("identity_cert", 0)),
        repos: Box::new(MockStage::ok("repos", 0)),
        facts: Box::new(facts_stage),
        profile: Box::new(MockStage::ok("profile", 0)),
        installed_products: Box::new(MockStage::ok("installed_products", 0)),
        healing: Box::new(MockStage::ok("healing", 0)),
        entitlement_certs: Box::new(MockStage::ok("entitlement_certs", 0)),
    };
    let engine = SyncEngine::new(Arc::new(ActionLock::new(env.lock_path())), stages);

    let report = engine.update(Mode::Normal).unwrap();
    assert_eq!(report.updates, 1);

    let pushed = pushes.lock().unwrap();
    assert_eq!(pushed.len(), 1);
    assert_eq!(pushed[0].get("cpu.core_count"), Some(&json!(8)));
}
