//! cftools configuration
//!
//! Configuration file: ~/.config/cftools/config.yaml
//!
//! ```yaml
//! cache_dir: /srv/cfcache
//! strict: false
//! color: auto
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::paths::Paths;

/// When to decorate output with ANSI colors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Color only when stdout is a terminal and NO_COLOR is unset
    #[default]
    Auto,
    Always,
    Never,
}

/// Global cftools configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Snapshot directory override
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    /// Refuse to answer queries when a snapshot file is unparseable
    #[serde(default)]
    pub strict: bool,

    #[serde(default)]
    pub color: ColorMode,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let paths = Paths::new();
        Self::load_from(&paths.config_file())
    }

    /// Load configuration from a specific path, defaulting when absent
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_is_default() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.yaml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.color, ColorMode::Auto);
    }

    #[test]
    fn test_partial_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "strict: true\ncolor: never\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert!(config.strict);
        assert_eq!(config.color, ColorMode::Never);
        assert!(config.cache_dir.is_none());
    }

    #[test]
    fn test_full_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "cache_dir: /srv/cfcache\nstrict: true\ncolor: always\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(
            config,
            Config {
                cache_dir: Some(PathBuf::from("/srv/cfcache")),
                strict: true,
                color: ColorMode::Always,
            }
        );
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "color: [not, a, mode]\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
