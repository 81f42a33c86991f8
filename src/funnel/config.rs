use crate::error::{FunnelError, Result};
use crate::page::DEFAULT_PAGE_SIZE;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = "config.json";

/// Configuration for funnel, stored in the data directory as config.json
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FunnelConfig {
    /// Records per page in list views
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Owner assigned to new records when none is given
    #[serde(default)]
    pub default_owner: String,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for FunnelConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            default_owner: String::new(),
        }
    }
}

impl FunnelConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(FunnelError::Io)?;
        let config: FunnelConfig =
            serde_json::from_str(&content).map_err(FunnelError::Serialization)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(FunnelError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(FunnelError::Serialization)?;
        fs::write(config_path, content).map_err(FunnelError::Io)?;
        Ok(())
    }

    /// Set the page size, rejecting zero.
    pub fn set_page_size(&mut self, size: usize) -> Result<()> {
        if size == 0 {
            return Err(FunnelError::Api("Page size must be at least 1".into()));
        }
        self.page_size = size;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = FunnelConfig::default();
        assert_eq!(config.page_size, 10);
        assert_eq!(config.default_owner, "");
    }

    #[test]
    fn test_set_page_size_rejects_zero() {
        let mut config = FunnelConfig::default();
        assert!(config.set_page_size(0).is_err());
        config.set_page_size(25).unwrap();
        assert_eq!(config.page_size, 25);
    }

    #[test]
    fn test_load_missing_config() {
        let temp = TempDir::new().unwrap();
        let config = FunnelConfig::load(temp.path().join("nope")).unwrap();
        assert_eq!(config, FunnelConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();

        let mut config = FunnelConfig::default();
        config.set_page_size(20).unwrap();
        config.default_owner = "dana".into();
        config.save(temp.path()).unwrap();

        let loaded = FunnelConfig::load(temp.path()).unwrap();
        assert_eq!(loaded.page_size, 20);
        assert_eq!(loaded.default_owner, "dana");
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("config.json"), r#"{"page_size": 5}"#).unwrap();

        let loaded = FunnelConfig::load(temp.path()).unwrap();
        assert_eq!(loaded.page_size, 5);
        assert_eq!(loaded.default_owner, "");
    }
}
