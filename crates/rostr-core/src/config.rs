//! Configuration for rostr
//!
//! Stored in the platform config directory as rostr/config.toml. Everything
//! here is optional; a missing file means defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// rostr configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Data directory override; defaults to the platform data dir
    pub data_dir: Option<PathBuf>,

    /// Display settings
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Use colors in output
    pub colors: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { colors: true }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn load(path: &Path) -> crate::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Other(format!("Invalid config: {}", e)))?;
        Ok(config)
    }

    /// Save config to a TOML file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::Other(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Default config file location (platform config dir)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("rostr").join("config.toml"))
    }

    /// Resolve the data directory.
    ///
    /// Precedence: explicit override (CLI flag), configured `data_dir`, then
    /// the platform data directory.
    pub fn resolve_data_dir(&self, override_dir: Option<PathBuf>) -> crate::Result<PathBuf> {
        if let Some(dir) = override_dir {
            return Ok(dir);
        }
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        dirs::data_dir()
            .map(|d| d.join("rostr"))
            .ok_or_else(|| crate::Error::Other("Could not determine data directory".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let config = Config::load(Path::new("/nonexistent/rostr-config.toml")).unwrap();
        assert!(config.data_dir.is_none());
        assert!(config.display.colors);
    }

    #[test]
    fn override_wins_over_configured_dir() {
        let config = Config {
            data_dir: Some(PathBuf::from("/configured")),
            ..Default::default()
        };
        let resolved = config
            .resolve_data_dir(Some(PathBuf::from("/flag")))
            .unwrap();
        assert_eq!(resolved, PathBuf::from("/flag"));

        let resolved = config.resolve_data_dir(None).unwrap();
        assert_eq!(resolved, PathBuf::from("/configured"));
    }

    #[test]
    fn round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = Config {
            data_dir: Some(PathBuf::from("/tmp/rostr-data")),
            display: DisplayConfig { colors: false },
        };
        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.data_dir, config.data_dir);
        assert!(!loaded.display.colors);
    }
}
