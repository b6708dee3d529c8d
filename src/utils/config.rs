//! Queue configuration

use super::error::SyncQueueError;
use crate::sync::percentages::MAX_PRECISION;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Queue settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueSettings {
    /// Name used in log lines
    pub name: String,

    /// Decimal places kept in published percentages
    pub precision: u32,

    /// Log every published snapshot at debug level
    pub log_snapshots: bool,

    /// Default tracing filter for the binary (overridden by RUST_LOG)
    pub log_level: String,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            name: "sync".to_string(),
            precision: 2,
            log_snapshots: true,
            log_level: "info".to_string(),
        }
    }
}

impl QueueSettings {
    /// Default location of the settings file
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sync-queue")
            .join("settings.json")
    }

    /// Load settings from a JSON file. Missing keys fall back to defaults.
    pub fn load(path: &Path) -> Result<Self, SyncQueueError> {
        let content = std::fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&content)?;
        settings.validate()
    }

    /// Load from `path` if it exists, otherwise return defaults
    pub fn load_or_default(path: &Path) -> Result<Self, SyncQueueError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("No settings at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Write settings as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), SyncQueueError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reject unusable values
    pub fn validate(self) -> Result<Self, SyncQueueError> {
        if self.name.trim().is_empty() {
            return Err(SyncQueueError::Config("name must not be empty".to_string()));
        }
        if self.precision > MAX_PRECISION {
            return Err(SyncQueueError::Config(format!(
                "precision {} exceeds maximum of {}",
                self.precision, MAX_PRECISION
            )));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = QueueSettings::default();
        assert_eq!(config.precision, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "name": "anki" }"#).unwrap();

        let config = QueueSettings::load(&path).unwrap();
        assert_eq!(config.name, "anki");
        assert_eq!(config.precision, 2);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let config = QueueSettings {
            precision: 0,
            log_snapshots: false,
            ..Default::default()
        };

        config.save(&path).unwrap();
        assert_eq!(QueueSettings::load(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_precision_rejected() {
        let config = QueueSettings {
            precision: 12,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(SyncQueueError::Config(_))));
    }

    #[test]
    fn test_empty_name_rejected() {
        let config = QueueSettings {
            name: "  ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let dir = tempdir().unwrap();
        let config = QueueSettings::load_or_default(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, QueueSettings::default());
    }

    #[test]
    fn test_malformed_file_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            QueueSettings::load(&path),
            Err(SyncQueueError::SerializationError(_))
        ));
    }
}
