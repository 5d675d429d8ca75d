//! Timer engine implementation.
//!
//! The engine is a tick-based state machine. It owns no clock of its own --
//! a driver (or a test) calls `tick()` once per wall-clock second while the
//! clock is running.
//!
//! ## Modes
//!
//! ```text
//! Normal:   counts up freely until reset or saved.
//! Pomodoro: Work (25m) -> Break (5m) -> Work -> ... cycles indefinitely.
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(PhaseLimits::default());
//! engine.start();
//! // Once per second:
//! engine.tick(); // Returns Some(Event) when a Pomodoro phase rolls over
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::events::Event;
use crate::session::StudySession;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    Normal,
    Pomodoro,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PomodoroPhase {
    Work,
    Break,
}

/// Phase lengths in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseLimits {
    pub work_secs: u64,
    pub break_secs: u64,
}

impl Default for PhaseLimits {
    fn default() -> Self {
        Self {
            work_secs: 25 * 60,
            break_secs: 5 * 60,
        }
    }
}

impl PhaseLimits {
    pub fn for_phase(&self, phase: PomodoroPhase) -> u64 {
        match phase {
            PomodoroPhase::Work => self.work_secs,
            PomodoroPhase::Break => self.break_secs,
        }
    }
}

/// Core timer state machine.
///
/// Single writer: all mutation goes through the command methods below.
/// `tick()` is invoked by the driver task, never by the rendering layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerEngine {
    elapsed_secs: u64,
    running: bool,
    mode: TimerMode,
    /// Inert while in Normal mode: Normal-mode ticks and resets never
    /// touch it.
    phase: PomodoroPhase,
    completed_pomodoros: u64,
    #[serde(default)]
    limits: PhaseLimits,
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new(PhaseLimits::default())
    }
}

impl TimerEngine {
    pub fn new(limits: PhaseLimits) -> Self {
        Self {
            elapsed_secs: 0,
            running: false,
            mode: TimerMode::Normal,
            phase: PomodoroPhase::Work,
            completed_pomodoros: 0,
            limits,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn phase(&self) -> PomodoroPhase {
        self.phase
    }

    pub fn completed_pomodoros(&self) -> u64 {
        self.completed_pomodoros
    }

    pub fn limits(&self) -> PhaseLimits {
        self.limits
    }

    /// Limit of the current phase; `None` in Normal mode.
    pub fn limit_secs(&self) -> Option<u64> {
        match self.mode {
            TimerMode::Normal => None,
            TimerMode::Pomodoro => Some(self.limits.for_phase(self.phase)),
        }
    }

    /// Seconds left in the current phase; `None` in Normal mode.
    pub fn remaining_secs(&self) -> Option<u64> {
        self.limit_secs()
            .map(|limit| limit.saturating_sub(self.elapsed_secs))
    }

    /// 0.0 .. 1.0 progress within the current phase; `None` in Normal mode.
    pub fn phase_progress(&self) -> Option<f64> {
        self.limit_secs().map(|limit| {
            if limit == 0 {
                0.0
            } else {
                (self.elapsed_secs as f64 / limit as f64).min(1.0)
            }
        })
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            mode: self.mode,
            phase: self.phase,
            running: self.running,
            elapsed_secs: self.elapsed_secs,
            limit_secs: self.limit_secs(),
            remaining_secs: self.remaining_secs(),
            completed_pomodoros: self.completed_pomodoros,
            at: Utc::now(),
        }
    }

    /// The session a save would submit, if any.
    ///
    /// `None` when nothing has been accumulated: saving an empty run is a
    /// no-op, not an error.
    pub fn pending_session(&self) -> Option<StudySession> {
        if self.elapsed_secs == 0 {
            return None;
        }
        Some(StudySession {
            duration_secs: self.elapsed_secs,
            completed_at: Utc::now(),
        })
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        if self.running {
            return None; // Already running.
        }
        self.running = true;
        Some(Event::TimerStarted {
            mode: self.mode,
            phase: self.phase,
            at: Utc::now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if !self.running {
            return None; // Already paused.
        }
        self.running = false;
        Some(Event::TimerPaused {
            elapsed_secs: self.elapsed_secs,
            at: Utc::now(),
        })
    }

    /// Stop the clock and clear the current run.
    ///
    /// The completed-pomodoro counter survives a reset.
    pub fn reset(&mut self) -> Event {
        self.running = false;
        self.elapsed_secs = 0;
        if self.mode == TimerMode::Pomodoro {
            self.phase = PomodoroPhase::Work;
        }
        Event::TimerReset { at: Utc::now() }
    }

    /// Flip between Normal and Pomodoro mode.
    ///
    /// A mode change invalidates the current run: the clock pauses, the
    /// elapsed time is dropped and the phase returns to Work. The
    /// completed-pomodoro counter persists across toggles.
    pub fn toggle_mode(&mut self) -> Event {
        self.mode = match self.mode {
            TimerMode::Normal => TimerMode::Pomodoro,
            TimerMode::Pomodoro => TimerMode::Normal,
        };
        self.running = false;
        self.elapsed_secs = 0;
        self.phase = PomodoroPhase::Work;
        Event::ModeChanged {
            mode: self.mode,
            at: Utc::now(),
        }
    }

    /// Advance the clock by one second.
    ///
    /// Returns `Some(Event::PhaseCompleted)` when a Pomodoro phase rolls
    /// over. A tick that was already queued when the clock was paused is a
    /// no-op: `running` is checked first.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.running {
            return None;
        }
        self.elapsed_secs += 1;
        if self.mode != TimerMode::Pomodoro {
            return None;
        }
        let limit = self.limits.for_phase(self.phase);
        if self.elapsed_secs < limit {
            return None;
        }
        let completed = self.phase;
        match self.phase {
            PomodoroPhase::Work => {
                self.completed_pomodoros += 1;
                self.phase = PomodoroPhase::Break;
            }
            PomodoroPhase::Break => {
                self.phase = PomodoroPhase::Work;
            }
        }
        // Overshoot past the limit is discarded, never carried over.
        self.elapsed_secs = 0;
        Some(Event::PhaseCompleted {
            completed,
            next: self.phase,
            completed_pomodoros: self.completed_pomodoros,
            at: Utc::now(),
        })
    }

    /// Clear the run after the backend accepted the session.
    ///
    /// Callers submit first and only invoke this on success; a failed
    /// submission leaves the state untouched so the save can be retried.
    pub fn complete_save(&mut self) -> Event {
        let duration_secs = self.elapsed_secs;
        self.reset();
        Event::SessionSaved {
            duration_secs,
            at: Utc::now(),
        }
    }

    /// Credit wall-clock seconds that passed while the engine was persisted.
    ///
    /// Only a clock that was running when snapshotted accumulates offline
    /// time. Overshoot past a Pomodoro limit folds into a normal transition
    /// on the next live tick.
    pub fn credit_offline(&mut self, secs: u64) {
        if self.running {
            self.elapsed_secs = self.elapsed_secs.saturating_add(secs);
        }
    }

    /// Replace the phase limits (configuration reload). An elapsed value at
    /// or past the new limit folds into a transition on the next tick.
    pub fn set_limits(&mut self, limits: PhaseLimits) {
        self.limits = limits;
    }
}
