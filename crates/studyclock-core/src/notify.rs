//! Phase-change notification surface.
//!
//! Notifications are strictly best-effort: the clock never depends on them,
//! and a failing notification daemon is logged and ignored.

use std::error::Error;

use tracing::warn;

use crate::timer::{PhaseLimits, PomodoroPhase};

/// Consumed on every Pomodoro phase transition.
pub trait Notifier: Send + Sync {
    /// Deliver a notification. Callers ignore failures beyond logging.
    fn notify(&self, title: &str, body: &str) -> Result<(), Box<dyn Error>>;
}

/// Desktop notifications via the OS notification daemon.
#[derive(Debug, Default)]
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, body: &str) -> Result<(), Box<dyn Error>> {
        notify_rust::Notification::new()
            .appname("studyclock")
            .summary(title)
            .body(body)
            .show()?;
        Ok(())
    }
}

/// No-op notifier for headless environments and tests.
#[derive(Debug, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _title: &str, _body: &str) -> Result<(), Box<dyn Error>> {
        Ok(())
    }
}

/// Fire a notification, logging and swallowing any failure.
pub(crate) fn dispatch(notifier: &dyn Notifier, title: &str, body: &str) {
    if let Err(err) = notifier.notify(title, body) {
        warn!(error = %err, "notification dispatch failed");
    }
}

/// Notification copy for a completed Pomodoro phase.
pub fn phase_change_message(
    completed: PomodoroPhase,
    completed_pomodoros: u64,
    limits: PhaseLimits,
) -> (String, String) {
    match completed {
        PomodoroPhase::Work => (
            "Pomodoro completed!".to_string(),
            format!(
                "Take a {} minute break. You've completed {} pomodoro{}.",
                limits.break_secs / 60,
                completed_pomodoros,
                if completed_pomodoros == 1 { "" } else { "s" },
            ),
        ),
        PomodoroPhase::Break => (
            "Break over!".to_string(),
            "Time to get back to work.".to_string(),
        ),
    }
}
