use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{PomodoroPhase, TimerMode};

/// Every state change in the engine produces an Event.
/// The CLI prints them; the rendering layer re-renders on them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        mode: TimerMode,
        phase: PomodoroPhase,
        at: DateTime<Utc>,
    },
    TimerPaused {
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    ModeChanged {
        mode: TimerMode,
        at: DateTime<Utc>,
    },
    /// A Pomodoro phase ran to its limit and the clock rolled into the
    /// next one without pausing.
    PhaseCompleted {
        completed: PomodoroPhase,
        next: PomodoroPhase,
        completed_pomodoros: u64,
        at: DateTime<Utc>,
    },
    /// The accumulated run was accepted by the backend and cleared.
    SessionSaved {
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        mode: TimerMode,
        phase: PomodoroPhase,
        running: bool,
        elapsed_secs: u64,
        /// Current phase limit in seconds; absent in Normal mode.
        limit_secs: Option<u64>,
        remaining_secs: Option<u64>,
        completed_pomodoros: u64,
        at: DateTime<Utc>,
    },
}
