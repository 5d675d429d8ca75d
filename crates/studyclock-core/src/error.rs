//! Error types for studyclock-core.
//!
//! Side-channel failures (snapshot writes, notifications) are logged and
//! swallowed at their call sites; the types here cover the paths that do
//! surface to callers.

use std::path::PathBuf;

use thiserror::Error;

/// Umbrella error type for studyclock-core.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Submission error: {0}")]
    Submit(#[from] SubmitError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Snapshot-store errors.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to open snapshot store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Snapshot store is locked")]
    Locked,

    #[error("Failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _msg) => {
                if code.code == rusqlite::ErrorCode::DatabaseLocked {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot resolve data directory: {0}")]
    DataDir(#[from] std::io::Error),

    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Session-submission errors. The one failure class that changes engine
/// behavior: a failed save leaves the clock untouched for retry.
#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("No backend configured: set backend.base_url in the config")]
    NotConfigured,

    #[error("Invalid backend URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Backend rejected session (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },
}

/// Result type alias for CoreError.
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
