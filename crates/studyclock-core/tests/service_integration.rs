//! End-to-end tests for the timer service: driver wiring, persistence and
//! session submission.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use studyclock_core::error::SubmitError;
use studyclock_core::session::{SessionSink, StudySession};
use studyclock_core::storage::{Snapshot, SnapshotStore};
use studyclock_core::timer::{PhaseLimits, TimerEngine, TimerService};
use studyclock_core::{Event, NullNotifier};

#[derive(Default)]
struct RecordingSink {
    submitted: Mutex<Vec<u64>>,
    fail: AtomicBool,
}

impl RecordingSink {
    fn failing() -> Self {
        let sink = Self::default();
        sink.fail.store(true, Ordering::SeqCst);
        sink
    }

    fn durations(&self) -> Vec<u64> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionSink for RecordingSink {
    async fn submit(&self, session: &StudySession) -> Result<(), SubmitError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(SubmitError::Rejected {
                status: 500,
                message: "Server error".into(),
            });
        }
        self.submitted.lock().unwrap().push(session.duration_secs);
        Ok(())
    }
}

fn fresh_store(dir: &tempfile::TempDir) -> Arc<SnapshotStore> {
    Arc::new(SnapshotStore::open_at(&dir.path().join("clock.db")).unwrap())
}

/// Store pre-seeded with a paused engine holding `elapsed` seconds.
fn seeded_store(dir: &tempfile::TempDir, elapsed: u64) -> Arc<SnapshotStore> {
    let store = fresh_store(dir);
    let mut engine = TimerEngine::new(PhaseLimits::default());
    engine.start();
    for _ in 0..elapsed {
        engine.tick();
    }
    engine.pause();
    store.save(&Snapshot::capture(&engine)).unwrap();
    store
}

fn service(store: Arc<SnapshotStore>, sink: Arc<RecordingSink>) -> TimerService {
    TimerService::new(
        store,
        Arc::new(NullNotifier),
        sink,
        PhaseLimits::default(),
    )
}

#[tokio::test]
async fn save_submits_and_resets() {
    let dir = tempfile::tempdir().unwrap();
    let store = seeded_store(&dir, 45);
    let sink = Arc::new(RecordingSink::default());
    let mut svc = service(Arc::clone(&store), Arc::clone(&sink));

    let event = svc.save().await.unwrap().expect("a session was pending");
    match event {
        Event::SessionSaved { duration_secs, .. } => assert_eq!(duration_secs, 45),
        other => panic!("unexpected event: {other:?}"),
    }
    assert_eq!(sink.durations(), vec![45]);
    assert_eq!(svc.state().elapsed_secs(), 0);
    assert!(!svc.state().is_running());

    // The cleared run is what got persisted.
    let persisted = store.load().unwrap().unwrap();
    assert_eq!(persisted.engine.elapsed_secs(), 0);
}

#[tokio::test]
async fn failed_save_preserves_the_run_for_retry() {
    let dir = tempfile::tempdir().unwrap();
    let store = seeded_store(&dir, 45);
    let sink = Arc::new(RecordingSink::failing());
    let mut svc = service(Arc::clone(&store), Arc::clone(&sink));

    let err = svc.save().await.expect_err("submission should fail");
    assert!(matches!(err, SubmitError::Rejected { status: 500, .. }));
    assert_eq!(svc.state().elapsed_secs(), 45);
    assert!(!svc.state().is_running());
    assert!(sink.durations().is_empty());

    // Flip the backend healthy again: the retry drains the same run.
    sink.fail.store(false, Ordering::SeqCst);
    svc.save().await.unwrap().expect("retry should succeed");
    assert_eq!(sink.durations(), vec![45]);
    assert_eq!(svc.state().elapsed_secs(), 0);
}

#[tokio::test]
async fn save_with_nothing_accumulated_is_a_noop() {
    let dir = tempfile::tempdir().unwrap();
    let store = fresh_store(&dir);
    let sink = Arc::new(RecordingSink::default());
    let mut svc = service(store, Arc::clone(&sink));

    assert!(svc.save().await.unwrap().is_none());
    assert!(sink.durations().is_empty());
}

#[tokio::test]
async fn construction_restores_a_running_clock_with_offline_credit() {
    let dir = tempfile::tempdir().unwrap();
    let store = fresh_store(&dir);
    let mut engine = TimerEngine::new(PhaseLimits::default());
    engine.start();
    store
        .save(&Snapshot {
            engine,
            saved_at: Utc::now() - chrono::Duration::seconds(60),
        })
        .unwrap();

    let svc = service(store, Arc::new(RecordingSink::default()));
    let state = svc.state();
    assert!(state.is_running());
    assert!(state.elapsed_secs() >= 60);
}

#[tokio::test]
async fn commands_are_persisted_as_they_happen() {
    let dir = tempfile::tempdir().unwrap();
    let store = fresh_store(&dir);
    let mut svc = service(Arc::clone(&store), Arc::new(RecordingSink::default()));

    svc.start();
    assert!(store.load().unwrap().unwrap().engine.is_running());

    svc.toggle_mode();
    let persisted = store.load().unwrap().unwrap();
    assert!(!persisted.engine.is_running());
    assert_eq!(
        persisted.engine.mode(),
        studyclock_core::TimerMode::Pomodoro
    );

    svc.reset();
    assert!(!store.load().unwrap().unwrap().engine.is_running());
}

// Slow test: exercises the real 1 Hz driver end to end.
#[tokio::test]
async fn live_ticks_accumulate_and_stop_on_pause() {
    let dir = tempfile::tempdir().unwrap();
    let store = fresh_store(&dir);
    let mut svc = service(Arc::clone(&store), Arc::new(RecordingSink::default()));

    assert!(svc.start().is_some());
    assert!(svc.start().is_none(), "second start is a no-op");

    tokio::time::sleep(Duration::from_millis(2400)).await;
    let elapsed = svc.state().elapsed_secs();
    assert!((1..=3).contains(&elapsed), "elapsed was {elapsed}");

    // Each tick persists the snapshot.
    let persisted = store.load().unwrap().unwrap();
    assert!(persisted.engine.elapsed_secs() >= 1);

    svc.pause();
    let frozen = svc.state().elapsed_secs();
    tokio::time::sleep(Duration::from_millis(1600)).await;
    assert_eq!(svc.state().elapsed_secs(), frozen, "no tick after pause");
}
