mod driver;
mod engine;
mod service;

pub use driver::TickDriver;
pub use engine::{PhaseLimits, PomodoroPhase, TimerEngine, TimerMode};
pub use service::TimerService;
