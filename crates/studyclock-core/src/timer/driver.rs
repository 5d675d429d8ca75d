//! Single-task tick driver.
//!
//! `start()`/`stop()` acquire and release one cancellable repeating task, so
//! at most one tick source exists at any moment. The callback runs on the
//! tokio runtime that spawned the task.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Owns at most one repeating tick task.
#[derive(Debug, Default)]
pub struct TickDriver {
    handle: Option<JoinHandle<()>>,
}

impl TickDriver {
    pub fn new() -> Self {
        Self { handle: None }
    }

    /// Whether a tick task is currently active.
    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Spawn the repeating task. No-op if one is already active.
    ///
    /// Missed intervals are skipped rather than burst-delivered: the clock
    /// accepts whatever cadence the runtime manages to provide.
    pub fn start<F>(&mut self, period: Duration, mut on_tick: F)
    where
        F: FnMut() + Send + 'static,
    {
        if self.is_active() {
            return;
        }
        self.handle = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first interval tick completes immediately; skip it so the
            // callback first fires one full period from now.
            interval.tick().await;
            loop {
                interval.tick().await;
                on_tick();
            }
        }));
    }

    /// Cancel the task. A callback already past the engine lock finishes;
    /// anything later is discarded by the engine's running guard.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for TickDriver {
    fn drop(&mut self) {
        self.stop();
    }
}
