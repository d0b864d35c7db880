//! Configuration for shakelock.

use crate::core::shake::{ConfigError, ShakeDetectorConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration, persisted as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Shake detector tuning
    pub detector: ShakeDetectorConfig,

    /// Whether shake-to-lock is armed
    pub shake_enabled: bool,

    /// Path for the key-value store (activity counters, lock counter)
    pub data_path: PathBuf,

    /// IANA timezone used when displaying lock times
    pub timezone: String,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("shakelock");

        Self {
            detector: ShakeDetectorConfig::default(),
            shake_enabled: true,
            data_path: data_dir,
            timezone: "UTC".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, falling back to defaults if absent.
    pub fn load_from(path: &std::path::Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(path).map_err(|e| SettingsError::IoError(e.to_string()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| SettingsError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), SettingsError> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), SettingsError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SettingsError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| SettingsError::SerializeError(e.to_string()))?;

        std::fs::write(path, content).map_err(|e| SettingsError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("shakelock")
            .join("config.json")
    }

    /// Path of the JSON key-value store inside the data directory.
    pub fn store_path(&self) -> PathBuf {
        self.data_path.join("store.json")
    }

    /// Ensure all required directories exist.
    pub fn ensure_directories(&self) -> Result<(), SettingsError> {
        std::fs::create_dir_all(&self.data_path)
            .map_err(|e| SettingsError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Check the detector settings and the timezone name.
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.detector.validate().map_err(SettingsError::Invalid)?;
        self.tz()?;
        Ok(())
    }

    /// Parsed display timezone.
    pub fn tz(&self) -> Result<chrono_tz::Tz, SettingsError> {
        self.timezone
            .parse::<chrono_tz::Tz>()
            .map_err(|_| SettingsError::UnknownTimezone(self.timezone.clone()))
    }
}

/// Configuration file errors.
#[derive(Debug)]
pub enum SettingsError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
    Invalid(ConfigError),
    UnknownTimezone(String),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::IoError(e) => write!(f, "IO error: {e}"),
            SettingsError::ParseError(e) => write!(f, "Parse error: {e}"),
            SettingsError::SerializeError(e) => write!(f, "Serialize error: {e}"),
            SettingsError::Invalid(e) => write!(f, "Invalid detector config: {e}"),
            SettingsError::UnknownTimezone(tz) => write!(f, "Unknown timezone: {tz}"),
        }
    }
}

impl std::error::Error for SettingsError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("shakelock-config-{}", uuid::Uuid::new_v4()))
            .join("config.json")
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.detector.reversal_threshold, 5);
        assert_eq!(config.detector.window_ms, 500);
        assert_eq!(config.detector.min_movement_px, 50.0);
        assert_eq!(config.detector.cooldown_ms, 1000);
        assert!(config.shake_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_round_trip_through_file() {
        let path = temp_config_path();
        let mut config = Config::default();
        config.shake_enabled = false;
        config.detector.cooldown_ms = 250;
        config.timezone = "Asia/Tokyo".to_string();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert!(!loaded.shake_enabled);
        assert_eq!(loaded.detector.cooldown_ms, 250);
        assert_eq!(loaded.tz().unwrap(), chrono_tz::Asia::Tokyo);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let path = temp_config_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{"detector": {"reversal_threshold": 3}}"#).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.detector.reversal_threshold, 3);
        assert_eq!(loaded.detector.window_ms, 500);
        assert!(loaded.shake_enabled);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_invalid_detector_rejected() {
        let path = temp_config_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{"detector": {"window_ms": 0}}"#).unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(SettingsError::Invalid(ConfigError::Window(0)))
        ));

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_unknown_timezone() {
        let config = Config {
            timezone: "Mars/Olympus".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SettingsError::UnknownTimezone(_))
        ));
    }
}
