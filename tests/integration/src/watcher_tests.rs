//! Watcher scenarios against real filesystem events
//!
//! These tests drive the notify backend with actual file creation and
//! deletion, so they poll with generous deadlines instead of asserting
//! on immediate state.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use entsync_identity::Identity;
use entsync_test_utils::TestEnv;
use entsync_watch::{CertWatcher, DirectoryWatch, EventMask, WatchedIdentity};

const DEADLINE: Duration = Duration::from_secs(5);

struct RunningWatcher {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl RunningWatcher {
    fn spawn(watcher: CertWatcher) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let handle = thread::spawn(move || {
            watcher.run_loop(|| stop_flag.load(Ordering::SeqCst));
        });
        Self { stop, handle }
    }

    fn shutdown(self) {
        self.stop.store(true, Ordering::SeqCst);
        self.handle.join().unwrap();
    }
}

fn wait_until(deadline: Duration, predicate: impl Fn() -> bool) -> bool {
    let started = Instant::now();
    while started.elapsed() < deadline {
        if predicate() {
            return true;
        }
        thread::sleep(Duration::from_millis(25));
    }
    predicate()
}

fn short_poll_watcher(
    identity: Arc<Identity>,
    watches: Vec<DirectoryWatch>,
) -> CertWatcher {
    CertWatcher::with_poll_interval(
        identity as Arc<dyn WatchedIdentity>,
        watches,
        Duration::from_millis(50),
    )
    .unwrap()
}

#[test]
fn created_credentials_register_the_identity() {
    let env = TestEnv::new();
    let identity = Arc::new(Identity::new(env.cert_dir()));
    assert!(!identity.is_registered());

    let running = RunningWatcher::spawn(short_poll_watcher(Arc::clone(&identity), Vec::new()));

    env.write_cert(b"CERT");
    env.write_key(b"KEY");

    let registered = wait_until(DEADLINE, || identity.is_registered());
    running.shutdown();
    assert!(registered, "identity never observed the created credentials");
}

#[test]
fn deleted_key_unregisters_the_identity() {
    let env = TestEnv::new();
    env.write_cert(b"CERT");
    env.write_key(b"KEY");

    let identity = Arc::new(Identity::new(env.cert_dir()));
    assert!(identity.is_registered());

    let running = RunningWatcher::spawn(short_poll_watcher(Arc::clone(&identity), Vec::new()));

    env.remove_key();

    let unregistered = wait_until(DEADLINE, || !identity.is_registered());
    running.shutdown();
    assert!(unregistered, "identity never observed the deleted key");
}

#[test]
fn registered_directory_watches_fire_on_events() {
    let env = TestEnv::new();
    let identity = Arc::new(Identity::new(env.cert_dir()));

    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    let watch = DirectoryWatch::new(
        env.cert_dir(),
        EventMask::CREATE | EventMask::DELETE,
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    );

    let running = RunningWatcher::spawn(short_poll_watcher(Arc::clone(&identity), vec![watch]));

    env.write_cert(b"CERT");

    let observed = wait_until(DEADLINE, || fired.load(Ordering::SeqCst) >= 1);
    running.shutdown();
    assert!(observed, "directory watch callback never fired");
}

#[test]
fn watcher_stops_within_one_interval_when_idle() {
    let env = TestEnv::new();
    let identity = Arc::new(Identity::new(env.cert_dir()));
    let running = RunningWatcher::spawn(short_poll_watcher(identity, Vec::new()));

    let started = Instant::now();
    running.shutdown();
    assert!(started.elapsed() < Duration::from_secs(2));
}
