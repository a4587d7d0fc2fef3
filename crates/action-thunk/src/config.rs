//! Thunk configuration structures

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ThunkError;

/// Top-level configuration, usually read from `thunk.toml`.
///
/// ```toml
/// suppress_failures = true
///
/// [sink]
/// events_log = ".thunk/events.jsonl"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThunkConfig {
    /// Report failures in FAILED without returning them to the caller.
    #[serde(default)]
    pub suppress_failures: bool,

    /// Where notifications are mirrored, if anywhere.
    #[serde(default)]
    pub sink: SinkConfig,
}

/// Notification sink configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SinkConfig {
    /// JSONL file that receives every dispatched notification.
    pub events_log: Option<PathBuf>,
}

impl ThunkConfig {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ThunkError> {
        let content = std::fs::read_to_string(path).map_err(|source| ThunkError::IoError {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ThunkError::ConfigError {
            path: path.display().to_string(),
            source,
        })
    }

    /// Try to load config, returning default if the file is missing or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                if path.exists() {
                    tracing::warn!("ignoring config: {}", e);
                }
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn defaults_propagate_failures() {
        let config = ThunkConfig::default();
        assert!(!config.suppress_failures);
        assert!(config.sink.events_log.is_none());
    }

    #[test]
    fn load_full_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("thunk.toml");
        fs::write(
            &path,
            "suppress_failures = true\n\n[sink]\nevents_log = \"logs/events.jsonl\"\n",
        )
        .unwrap();

        let config = ThunkConfig::load(&path).unwrap();
        assert!(config.suppress_failures);
        assert_eq!(
            config.sink.events_log,
            Some(PathBuf::from("logs/events.jsonl"))
        );
    }

    #[test]
    fn empty_file_is_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("thunk.toml");
        fs::write(&path, "").unwrap();
        assert_eq!(ThunkConfig::load(&path).unwrap(), ThunkConfig::default());
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("thunk.toml");
        fs::write(&path, "suppress_failures = \"yes please\"").unwrap();

        assert!(matches!(
            ThunkConfig::load(&path),
            Err(ThunkError::ConfigError { .. })
        ));
        assert_eq!(ThunkConfig::load_or_default(&path), ThunkConfig::default());
    }

    #[test]
    fn missing_file_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let config = ThunkConfig::load_or_default(&dir.path().join("nope.toml"));
        assert_eq!(config, ThunkConfig::default());
    }
}
