use std::sync::Arc;
use std::time::Duration;

use clap::Subcommand;
use studyclock_core::storage::{Config, Snapshot, SnapshotStore};
use studyclock_core::timer::{PhaseLimits, TimerEngine, TimerMode, TimerService};
use studyclock_core::{
    DesktopNotifier, Event, HttpSessionSink, Notifier, NullNotifier, SessionSink, UnconfiguredSink,
};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start (or resume) the clock
    Start,
    /// Pause the clock
    Pause,
    /// Stop the clock and clear the current run
    Reset,
    /// Switch between normal and pomodoro mode
    Mode,
    /// Print the current timer state as JSON
    Status,
    /// Submit the current run to the backend and clear it
    Save,
    /// Drive the clock live and render it once per second (Ctrl-C to quit)
    Watch {
        /// Also start the clock before watching
        #[arg(long)]
        start: bool,
    },
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

pub fn run(action: TimerAction) -> CliResult {
    let config = Config::load_or_default();
    let store = SnapshotStore::open()?;

    match action {
        TimerAction::Start => {
            let mut engine = store.restore(config.timer.limits());
            let event = engine.start();
            persist(&store, &engine)?;
            print_outcome(event, &engine)
        }
        TimerAction::Pause => {
            let mut engine = store.restore(config.timer.limits());
            let event = engine.pause();
            persist(&store, &engine)?;
            print_outcome(event, &engine)
        }
        TimerAction::Reset => {
            let mut engine = store.restore(config.timer.limits());
            let event = engine.reset();
            persist(&store, &engine)?;
            print_event(&event)
        }
        TimerAction::Mode => {
            let mut engine = store.restore(config.timer.limits());
            let event = engine.toggle_mode();
            persist(&store, &engine)?;
            print_event(&event)
        }
        TimerAction::Status => {
            let engine = store.restore(config.timer.limits());
            print_event(&engine.snapshot())
        }
        TimerAction::Save => save(&config, &store),
        TimerAction::Watch { start } => watch(&config, store, start),
    }
}

fn save(config: &Config, store: &SnapshotStore) -> CliResult {
    let mut engine = store.restore(config.timer.limits());
    let Some(session) = engine.pending_session() else {
        // Nothing accumulated: not an error, just nothing to submit.
        return print_event(&engine.snapshot());
    };

    let sink = session_sink(config)?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(sink.submit(&session))?;

    let event = engine.complete_save();
    persist(store, &engine)?;
    print_event(&event)
}

fn watch(config: &Config, store: SnapshotStore, start: bool) -> CliResult {
    let notifier: Arc<dyn Notifier> = if config.notifications.enabled {
        Arc::new(DesktopNotifier)
    } else {
        Arc::new(NullNotifier)
    };
    let sink = session_sink(config)?;
    let limits = config.timer.limits();

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(watch_loop(store, notifier, sink, limits, start))
}

async fn watch_loop(
    store: SnapshotStore,
    notifier: Arc<dyn Notifier>,
    sink: Arc<dyn SessionSink>,
    limits: PhaseLimits,
    start: bool,
) -> CliResult {
    let mut service = TimerService::new(Arc::new(store), notifier, sink, limits);
    if start {
        service.start();
    }
    loop {
        tokio::time::sleep(Duration::from_secs(1)).await;
        render(&service.state());
    }
}

fn session_sink(config: &Config) -> Result<Arc<dyn SessionSink>, Box<dyn std::error::Error>> {
    match &config.backend.base_url {
        Some(base_url) => Ok(Arc::new(HttpSessionSink::new(
            base_url,
            config.backend.auth_token.clone(),
        )?)),
        None => Ok(Arc::new(UnconfiguredSink)),
    }
}

fn persist(store: &SnapshotStore, engine: &TimerEngine) -> CliResult {
    store.save(&Snapshot::capture(engine))?;
    Ok(())
}

fn print_event(event: &Event) -> CliResult {
    println!("{}", serde_json::to_string_pretty(event)?);
    Ok(())
}

/// Print the command's event, or the unchanged state for a no-op.
fn print_outcome(event: Option<Event>, engine: &TimerEngine) -> CliResult {
    match event {
        Some(event) => print_event(&event),
        None => print_event(&engine.snapshot()),
    }
}

fn render(engine: &TimerEngine) {
    let clock = format_hms(engine.elapsed_secs());
    let state = if engine.is_running() {
        "running"
    } else {
        "paused"
    };
    match engine.mode() {
        TimerMode::Normal => println!("{clock}  [{state}] normal"),
        TimerMode::Pomodoro => {
            let remaining = engine
                .remaining_secs()
                .map(format_hms)
                .unwrap_or_default();
            println!(
                "{clock}  [{state}] pomodoro {:?} ({remaining} left, {} done)",
                engine.phase(),
                engine.completed_pomodoros(),
            );
        }
    }
}

/// hh:mm:ss, matching the tracker's clock face.
fn format_hms(total: u64) -> String {
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;
    format!("{h:02}:{m:02}:{s:02}")
}
