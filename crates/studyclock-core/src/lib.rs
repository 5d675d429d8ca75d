//! # Studyclock Core Library
//!
//! Core logic for the Studyclock study timer: a persistent count-up clock
//! with a free-running Normal mode and a fixed-cycle Pomodoro mode.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a tick-based state machine; a single [`TickDriver`]
//!   task invokes `tick()` once per second while the clock runs
//! - **Storage**: SQLite kv snapshot of the engine plus TOML-based
//!   configuration
//! - **Session sink**: completed runs are handed to the study-sessions
//!   backend and never kept locally
//! - **Notifications**: best-effort phase-change alerts
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: core timer state machine
//! - [`TimerService`]: engine + driver + side-effect surfaces, one per
//!   process
//! - [`SnapshotStore`]: durable engine snapshots
//! - [`SessionSink`]: backend submission seam
//!
//! The CLI binary is a thin layer over this crate.

pub mod error;
pub mod events;
pub mod notify;
pub mod session;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, StorageError, SubmitError};
pub use events::Event;
pub use notify::{DesktopNotifier, Notifier, NullNotifier};
pub use session::{HttpSessionSink, SessionSink, StudySession, UnconfiguredSink};
pub use storage::{Config, Snapshot, SnapshotStore};
pub use timer::{PhaseLimits, PomodoroPhase, TickDriver, TimerEngine, TimerMode, TimerService};
