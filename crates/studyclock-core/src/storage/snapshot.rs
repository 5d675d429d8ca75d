//! Durable timer snapshots.
//!
//! The engine is serialized whole after every mutation and restored at
//! construction, so the clock survives process restarts and navigation
//! between frontends. Storage is a single-writer kv table at
//! `~/.config/studyclock/studyclock.db`.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::StorageError;
use crate::timer::{PhaseLimits, TimerEngine};

use super::data_dir;

const SNAPSHOT_KEY: &str = "timer_state";

/// A persisted engine plus the wall-clock moment it was written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub engine: TimerEngine,
    pub saved_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn capture(engine: &TimerEngine) -> Self {
        Self {
            engine: engine.clone(),
            saved_at: Utc::now(),
        }
    }

    /// Rebuild the engine, crediting the wall time that passed while a
    /// running clock sat persisted. Overshoot past a Pomodoro limit folds
    /// into a normal transition on the first live tick.
    pub fn restore(self) -> TimerEngine {
        let mut engine = self.engine;
        let offline = Utc::now()
            .signed_duration_since(self.saved_at)
            .num_seconds()
            .max(0) as u64;
        engine.credit_offline(offline);
        engine
    }
}

/// Single-writer store for the timer snapshot.
pub struct SnapshotStore {
    conn: Mutex<Connection>,
}

impl SnapshotStore {
    /// Open the store at `~/.config/studyclock/studyclock.db`, creating
    /// the file and schema if needed.
    pub fn open() -> Result<Self, StorageError> {
        let path = data_dir()?.join("studyclock.db");
        Self::open_at(&path)
    }

    /// Open the store at an explicit path (tests use a temp dir).
    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    /// In-memory store (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(StorageError::from)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), StorageError> {
        self.conn().execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Load the persisted snapshot.
    ///
    /// An unreadable value degrades to `None` so a corrupt store never
    /// blocks construction.
    pub fn load(&self) -> Result<Option<Snapshot>, StorageError> {
        let json: Option<String> = self
            .conn()
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![SNAPSHOT_KEY],
                |row| row.get(0),
            )
            .optional()?;
        let Some(json) = json else {
            return Ok(None);
        };
        match serde_json::from_str(&json) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(err) => {
                warn!(error = %err, "discarding unreadable timer snapshot");
                Ok(None)
            }
        }
    }

    /// Persist the snapshot, replacing any previous one.
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), StorageError> {
        let json = serde_json::to_string(snapshot)?;
        self.conn().execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![SNAPSHOT_KEY, json],
        )?;
        Ok(())
    }

    /// Restore an engine from the store, falling back to a fresh one when
    /// nothing usable is persisted. The configured phase limits always win
    /// over the persisted ones.
    pub fn restore(&self, limits: PhaseLimits) -> TimerEngine {
        match self.load() {
            Ok(Some(snapshot)) => {
                let mut engine = snapshot.restore();
                engine.set_limits(limits);
                engine
            }
            Ok(None) => TimerEngine::new(limits),
            Err(err) => {
                warn!(error = %err, "snapshot load failed, starting fresh");
                TimerEngine::new(limits)
            }
        }
    }

    /// Drop the persisted snapshot (explicit application reset).
    pub fn clear(&self) -> Result<(), StorageError> {
        self.conn()
            .execute("DELETE FROM kv WHERE key = ?1", params![SNAPSHOT_KEY])?;
        Ok(())
    }
}
