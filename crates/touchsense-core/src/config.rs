//! Classifier timing configuration.

use crate::error::{ConfigError, ConfigResult};
use crate::{DEFAULT_DOUBLE_TAP_MS, DEFAULT_HAPTIC_PULSE_MS, DEFAULT_LONG_TOUCH_MS};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Timing thresholds for one classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Time a contact must stay still before it becomes a long touch (ms).
    pub long_touch_ms: u64,
    /// Window after a tap in which a new contact counts as a double tap (ms).
    pub double_tap_ms: u64,
    /// Length of the haptic pulse for handlers registered with `vibrate` (ms).
    pub haptic_pulse_ms: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            long_touch_ms: DEFAULT_LONG_TOUCH_MS,
            double_tap_ms: DEFAULT_DOUBLE_TAP_MS,
            haptic_pulse_ms: DEFAULT_HAPTIC_PULSE_MS,
        }
    }
}

impl ClassifierConfig {
    pub fn long_touch(&self) -> Duration {
        Duration::from_millis(self.long_touch_ms)
    }

    pub fn double_tap_window(&self) -> Duration {
        Duration::from_millis(self.double_tap_ms)
    }

    pub fn haptic_pulse(&self) -> Duration {
        Duration::from_millis(self.haptic_pulse_ms)
    }

    /// Zero thresholds would make every contact a long touch, or disable
    /// double taps entirely.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.long_touch_ms == 0 {
            return Err(ConfigError::Invalid("long_touch_ms must be > 0".into()));
        }
        if self.double_tap_ms == 0 {
            return Err(ConfigError::Invalid("double_tap_ms must be > 0".into()));
        }
        Ok(())
    }

    /// Load and validate a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let config: Self = load_yaml(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, falling back to defaults when the file is missing
    /// or invalid.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            debug!(?path, "no classifier config found, using defaults");
            return Self::default();
        }

        match Self::load(path) {
            Ok(config) => {
                info!(?path, ?config, "loaded classifier config");
                config
            }
            Err(e) => {
                warn!(?path, "failed to load classifier config: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Write this config as YAML, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_yaml::to_string(self)?)?;
        info!(?path, "saved classifier config");
        Ok(())
    }
}

/// Per-user config directory for touchsense.
pub fn config_dir() -> PathBuf {
    let base = dirs_next::config_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("touchsense")
}

/// Default location of the classifier config file.
pub fn default_config_path() -> PathBuf {
    config_dir().join("classifier.yaml")
}

pub fn load_yaml<T: DeserializeOwned>(path: impl AsRef<Path>) -> ConfigResult<T> {
    let content = fs::read_to_string(path)?;
    parse_yaml(&content)
}

pub fn parse_yaml<T: DeserializeOwned>(content: &str) -> ConfigResult<T> {
    Ok(serde_yaml::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_contract() {
        let config = ClassifierConfig::default();
        assert_eq!(config.long_touch_ms, 800);
        assert_eq!(config.double_tap_ms, 300);
        assert_eq!(config.haptic_pulse_ms, 30);
        assert_eq!(config.long_touch(), Duration::from_millis(800));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: ClassifierConfig = parse_yaml("long_touch_ms: 500\n").unwrap();
        assert_eq!(config.long_touch_ms, 500);
        assert_eq!(config.double_tap_ms, 300);
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let config = ClassifierConfig {
            double_tap_ms: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing/classifier.yaml");
        assert_eq!(
            ClassifierConfig::load_or_default(path),
            ClassifierConfig::default()
        );
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/classifier.yaml");
        let config = ClassifierConfig {
            long_touch_ms: 650,
            double_tap_ms: 250,
            haptic_pulse_ms: 20,
        };
        config.save(&path).unwrap();
        assert_eq!(ClassifierConfig::load(&path).unwrap(), config);
    }
}
