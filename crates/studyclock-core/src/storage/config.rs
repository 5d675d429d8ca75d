//! TOML-based application configuration.
//!
//! Stores the phase lengths, the notification toggle and the backend
//! submission endpoint. Serialized to/from TOML at
//! `~/.config/studyclock/config.toml`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::timer::PhaseLimits;

use super::data_dir;

/// Phase lengths, in minutes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_work_minutes")]
    pub work_minutes: u32,
    #[serde(default = "default_break_minutes")]
    pub break_minutes: u32,
}

/// Notification configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Backend the CLI submits finished sessions to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL, e.g. `https://api.example.com`. Unset means sessions
    /// cannot be saved remotely.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Bearer token sent with each submission (optional).
    #[serde(default)]
    pub auth_token: Option<String>,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub backend: BackendConfig,
}

fn default_work_minutes() -> u32 {
    25
}
fn default_break_minutes() -> u32 {
    5
}
fn default_true() -> bool {
    true
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            work_minutes: default_work_minutes(),
            break_minutes: default_break_minutes(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timer: TimerConfig::default(),
            notifications: NotificationsConfig::default(),
            backend: BackendConfig::default(),
        }
    }
}

impl TimerConfig {
    /// Phase limits in seconds for the engine.
    pub fn limits(&self) -> PhaseLimits {
        PhaseLimits {
            work_secs: u64::from(self.work_minutes) * 60,
            break_secs: u64::from(self.break_minutes) * 60,
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing the defaults on first run.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|err| ConfigError::LoadFailed {
                path,
                message: err.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|err| ConfigError::SaveFailed {
            path: path.clone(),
            message: err.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|err| ConfigError::SaveFailed {
            path,
            message: err.to_string(),
        })?;
        Ok(())
    }

    /// Load from disk, returning defaults on any error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Get a value as a display string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "timer.work_minutes" => Some(self.timer.work_minutes.to_string()),
            "timer.break_minutes" => Some(self.timer.break_minutes.to_string()),
            "notifications.enabled" => Some(self.notifications.enabled.to_string()),
            "backend.base_url" => self.backend.base_url.clone(),
            "backend.auth_token" => self.backend.auth_token.clone(),
            _ => None,
        }
    }

    /// Apply a value by key without persisting. Unknown keys and
    /// unparsable values are rejected.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "timer.work_minutes" => self.timer.work_minutes = parse_minutes(key, value)?,
            "timer.break_minutes" => self.timer.break_minutes = parse_minutes(key, value)?,
            "notifications.enabled" => {
                self.notifications.enabled =
                    value.parse().map_err(|_| ConfigError::InvalidValue {
                        key: key.to_string(),
                        message: format!("cannot parse '{value}' as bool"),
                    })?
            }
            "backend.base_url" => self.backend.base_url = non_empty(value),
            "backend.auth_token" => self.backend.auth_token = non_empty(value),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    /// Apply a value by key and persist.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }
}

fn parse_minutes(key: &str, value: &str) -> Result<u32, ConfigError> {
    let minutes: u32 = value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("cannot parse '{value}' as minutes"),
    })?;
    if minutes == 0 {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "must be at least 1".to_string(),
        });
    }
    Ok(minutes)
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrips_through_toml() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn defaults_match_the_classic_pomodoro_cycle() {
        let cfg = Config::default();
        assert_eq!(cfg.timer.work_minutes, 25);
        assert_eq!(cfg.timer.break_minutes, 5);
        assert!(cfg.notifications.enabled);
        assert!(cfg.backend.base_url.is_none());
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let cfg: Config = toml::from_str("[timer]\nwork_minutes = 50\n").unwrap();
        assert_eq!(cfg.timer.work_minutes, 50);
        assert_eq!(cfg.timer.break_minutes, 5);
        assert!(cfg.notifications.enabled);
    }

    #[test]
    fn limits_convert_minutes_to_seconds() {
        let limits = TimerConfig::default().limits();
        assert_eq!(limits.work_secs, 25 * 60);
        assert_eq!(limits.break_secs, 5 * 60);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("timer.work_minutes").as_deref(), Some("25"));
        assert_eq!(cfg.get("notifications.enabled").as_deref(), Some("true"));
        assert!(cfg.get("backend.base_url").is_none());
        assert!(cfg.get("timer.missing_key").is_none());
    }

    #[test]
    fn apply_updates_known_keys() {
        let mut cfg = Config::default();
        cfg.apply("timer.work_minutes", "50").unwrap();
        cfg.apply("notifications.enabled", "false").unwrap();
        cfg.apply("backend.base_url", "https://api.example.com")
            .unwrap();
        assert_eq!(cfg.timer.work_minutes, 50);
        assert!(!cfg.notifications.enabled);
        assert_eq!(
            cfg.backend.base_url.as_deref(),
            Some("https://api.example.com")
        );
    }

    #[test]
    fn apply_rejects_unknown_keys() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.apply("timer.nonexistent", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn apply_rejects_zero_minutes() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.apply("timer.work_minutes", "0"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn apply_rejects_non_numeric_minutes() {
        let mut cfg = Config::default();
        assert!(cfg.apply("timer.break_minutes", "soon").is_err());
    }

    #[test]
    fn empty_string_unsets_backend_keys() {
        let mut cfg = Config::default();
        cfg.apply("backend.base_url", "https://api.example.com")
            .unwrap();
        cfg.apply("backend.base_url", "").unwrap();
        assert!(cfg.backend.base_url.is_none());
    }
}
