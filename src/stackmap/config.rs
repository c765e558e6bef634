use crate::error::{Result, StackError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_DEBOUNCE_MS: u64 = 400;

/// Configuration for stackmap, stored in `<data dir>/config.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogConfig {
    /// Delay before a coalesced text-edit write reaches storage
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Populate an empty catalog with sample apps and functions
    #[serde(default = "default_true")]
    pub seed_on_first_run: bool,

    /// Indent exported documents
    #[serde(default = "default_true")]
    pub pretty_export: bool,
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

fn default_true() -> bool {
    true
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            seed_on_first_run: true,
            pretty_export: true,
        }
    }
}

impl CatalogConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(StackError::Io)?;
        serde_json::from_str(&content)
            .map_err(|e| StackError::Config(format!("{}: {}", config_path.display(), e)))
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(StackError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(StackError::Serialization)?;
        fs::write(config_path, content).map_err(StackError::Io)?;
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CatalogConfig::default();
        assert_eq!(config.debounce_ms, 400);
        assert!(config.seed_on_first_run);
        assert_eq!(config.debounce(), Duration::from_millis(400));
    }

    #[test]
    fn test_load_missing_config() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = CatalogConfig::load(temp_dir.path()).unwrap();
        assert_eq!(config, CatalogConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().join("nested");

        let config = CatalogConfig {
            debounce_ms: 50,
            seed_on_first_run: false,
            pretty_export: false,
        };
        config.save(&dir).unwrap();

        let loaded = CatalogConfig::load(&dir).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join(CONFIG_FILENAME), r#"{"debounceMs": 10}"#).unwrap();
        let loaded = CatalogConfig::load(temp_dir.path()).unwrap();
        assert_eq!(loaded.debounce_ms, 10);
        assert!(loaded.seed_on_first_run);
        assert!(loaded.pretty_export);
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join(CONFIG_FILENAME), "{").unwrap();
        let err = CatalogConfig::load(temp_dir.path()).unwrap_err();
        assert!(matches!(err, StackError::Config(_)));
    }
}
