//! Editor settings loaded from a RON file.
//!
//! ```ron
//! (
//!     autosave_enabled: true,
//!     autosave_interval_ms: 30000,
//!     drop_debounce_ms: 200,
//!     history_limit: 100,
//! )
//! ```
//!
//! Every field is optional; a missing one takes its value from
//! [`constants`](crate::constants).

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_AUTOSAVE_ENABLED, DEFAULT_AUTOSAVE_INTERVAL, DEFAULT_DROP_DEBOUNCE,
    DEFAULT_HISTORY_LIMIT, MIN_AUTOSAVE_INTERVAL,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub autosave_enabled: bool,
    pub autosave_interval_ms: u64,
    pub drop_debounce_ms: u64,
    pub history_limit: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            autosave_enabled: DEFAULT_AUTOSAVE_ENABLED,
            autosave_interval_ms: DEFAULT_AUTOSAVE_INTERVAL.as_millis() as u64,
            drop_debounce_ms: DEFAULT_DROP_DEBOUNCE.as_millis() as u64,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl EditorConfig {
    /// Parse from RON text.
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the editor cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.autosave_interval() < MIN_AUTOSAVE_INTERVAL {
            return Err(ConfigError::Invalid {
                field: "autosave_interval_ms",
                message: format!(
                    "must be at least {} ms, got {}",
                    MIN_AUTOSAVE_INTERVAL.as_millis(),
                    self.autosave_interval_ms
                ),
            });
        }
        Ok(())
    }

    /// Read and parse a RON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ron(&text)
    }

    pub fn autosave_interval(&self) -> Duration {
        Duration::from_millis(self.autosave_interval_ms)
    }

    pub fn drop_debounce(&self) -> Duration {
        Duration::from_millis(self.drop_debounce_ms)
    }
}

/// Errors that can occur when loading editor config.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("invalid {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_take_defaults() {
        let config = EditorConfig::from_ron("(history_limit: 20)").unwrap();
        assert_eq!(config.history_limit, 20);
        assert!(config.autosave_enabled);
        assert_eq!(config.autosave_interval(), DEFAULT_AUTOSAVE_INTERVAL);
        assert_eq!(config.drop_debounce(), Duration::from_millis(200));
    }

    #[test]
    fn test_empty_struct_is_default() {
        assert_eq!(EditorConfig::from_ron("()").unwrap(), EditorConfig::default());
    }

    #[test]
    fn test_parse_error_is_reported() {
        let err = EditorConfig::from_ron("(history_limit: \"many\")").unwrap_err();
        assert!(matches!(err, ConfigError::Ron(_)));
    }

    #[test]
    fn test_zero_autosave_interval_is_rejected() {
        let err = EditorConfig::from_ron("(autosave_interval_ms: 0)").unwrap_err();
        match err {
            ConfigError::Invalid { field, .. } => assert_eq!(field, "autosave_interval_ms"),
            other => panic!("expected invalid field, got {other:?}"),
        }
        assert!(EditorConfig::from_ron("(autosave_interval_ms: 1000)").is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("editor.ron");
        std::fs::write(&path, "(autosave_enabled: false, autosave_interval_ms: 5000)").unwrap();

        let config = EditorConfig::load(&path).unwrap();
        assert!(!config.autosave_enabled);
        assert_eq!(config.autosave_interval(), Duration::from_secs(5));

        let missing = EditorConfig::load(dir.path().join("nope.ron")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io(_)));
    }
}
