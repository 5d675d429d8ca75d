mod config;
mod snapshot;

pub use config::{BackendConfig, Config, NotificationsConfig, TimerConfig};
pub use snapshot::{Snapshot, SnapshotStore};

use std::path::PathBuf;

/// Returns `~/.config/studyclock[-dev]/` based on STUDYCLOCK_ENV.
///
/// Set STUDYCLOCK_ENV=dev to use a separate development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("STUDYCLOCK_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("studyclock-dev")
    } else {
        base_dir.join("studyclock")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
