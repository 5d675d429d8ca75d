//! Timer service: engine + driver + side-effect surfaces.
//!
//! The service wires the pure engine to its collaborators: the snapshot
//! store, the notification surface and the session backend. Engine mutation
//! and the post-mutation side effects (persist, notify) are kept strictly
//! separated -- a failing side channel never touches the clock.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::SubmitError;
use crate::events::Event;
use crate::notify::{self, Notifier};
use crate::session::SessionSink;
use crate::storage::{Snapshot, SnapshotStore};

use super::driver::TickDriver;
use super::engine::{PhaseLimits, TimerEngine};

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// One authoritative clock per process, explicitly constructed and handed
/// to whatever rendering layer needs it.
pub struct TimerService {
    engine: Arc<Mutex<TimerEngine>>,
    store: Arc<SnapshotStore>,
    notifier: Arc<dyn Notifier>,
    sink: Arc<dyn SessionSink>,
    driver: TickDriver,
}

impl TimerService {
    /// Restore the engine from the store (or start fresh) and wire the
    /// collaborators. A clock that was running when persisted resumes
    /// counting immediately, offline seconds credited.
    ///
    /// Must be called within a tokio runtime: the driver spawns onto it.
    pub fn new(
        store: Arc<SnapshotStore>,
        notifier: Arc<dyn Notifier>,
        sink: Arc<dyn SessionSink>,
        limits: PhaseLimits,
    ) -> Self {
        let engine = Arc::new(Mutex::new(store.restore(limits)));
        let mut service = Self {
            engine,
            store,
            notifier,
            sink,
            driver: TickDriver::new(),
        };
        let resume = lock(&service.engine).is_running();
        if resume {
            service.attach_driver();
        }
        service
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Idempotent: a second call while running changes nothing and never
    /// registers a second driver.
    pub fn start(&mut self) -> Option<Event> {
        let event = lock(&self.engine).start();
        self.attach_driver();
        if event.is_some() {
            self.persist();
        }
        event
    }

    /// Stops the driver before returning; a tick already queued behind the
    /// engine lock sees `running = false` and is discarded.
    pub fn pause(&mut self) -> Option<Event> {
        let event = lock(&self.engine).pause();
        self.driver.stop();
        if event.is_some() {
            self.persist();
        }
        event
    }

    pub fn reset(&mut self) -> Event {
        let event = lock(&self.engine).reset();
        self.driver.stop();
        self.persist();
        event
    }

    pub fn toggle_mode(&mut self) -> Event {
        let event = lock(&self.engine).toggle_mode();
        self.driver.stop();
        self.persist();
        event
    }

    /// Submit the accumulated run to the backend, then clear it.
    ///
    /// `Ok(None)` when there is nothing to save. On submission failure the
    /// clock is left untouched so the caller can retry.
    pub async fn save(&mut self) -> Result<Option<Event>, SubmitError> {
        let Some(session) = lock(&self.engine).pending_session() else {
            return Ok(None);
        };
        self.sink.submit(&session).await?;
        let event = lock(&self.engine).complete_save();
        self.driver.stop();
        self.persist();
        Ok(Some(event))
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Event {
        lock(&self.engine).snapshot()
    }

    /// Read-only copy of the engine state for rendering.
    pub fn state(&self) -> TimerEngine {
        lock(&self.engine).clone()
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn attach_driver(&mut self) {
        let engine = Arc::clone(&self.engine);
        let store = Arc::clone(&self.store);
        let notifier = Arc::clone(&self.notifier);
        self.driver.start(TICK_PERIOD, move || {
            let (event, snapshot, limits) = {
                let mut engine = lock(&engine);
                let event = engine.tick();
                (event, Snapshot::capture(&engine), engine.limits())
            };
            if let Some(Event::PhaseCompleted {
                completed,
                completed_pomodoros,
                ..
            }) = event
            {
                debug!(?completed, total = completed_pomodoros, "pomodoro phase completed");
                let (title, body) =
                    notify::phase_change_message(completed, completed_pomodoros, limits);
                notify::dispatch(notifier.as_ref(), &title, &body);
            }
            if let Err(err) = store.save(&snapshot) {
                warn!(error = %err, "failed to persist timer snapshot");
            }
        });
    }

    fn persist(&self) {
        let snapshot = Snapshot::capture(&lock(&self.engine));
        if let Err(err) = self.store.save(&snapshot) {
            warn!(error = %err, "failed to persist timer snapshot");
        }
    }
}

/// A poisoned lock only means a tick callback panicked mid-update; every
/// engine mutation is a plain field assignment, so the state is still
/// usable. Recover it rather than propagating the panic.
fn lock(engine: &Mutex<TimerEngine>) -> MutexGuard<'_, TimerEngine> {
    engine.lock().unwrap_or_else(PoisonError::into_inner)
}
