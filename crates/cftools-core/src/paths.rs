//! Standard paths used by cftools

use std::ffi::OsString;
use std::path::PathBuf;

/// Environment variable that overrides the snapshot cache directory
pub const CACHE_DIR_ENV: &str = "CFTOOLS_CACHE_DIR";

/// Standard cftools paths
pub struct Paths {
    /// Snapshot cache directory (~/.cfcache)
    pub cache: PathBuf,
    /// Config directory (~/.config/cftools)
    pub config: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

impl Paths {
    pub fn new() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"));

        let cache = home.join(".cfcache");

        let config = dirs::config_dir()
            .unwrap_or_else(|| home.join(".config"))
            .join("cftools");

        Self { cache, config }
    }

    /// Path of the global config file
    pub fn config_file(&self) -> PathBuf {
        self.config.join("config.yaml")
    }

    /// Resolve the snapshot directory.
    ///
    /// Precedence: explicit override, then `CFTOOLS_CACHE_DIR`, then the
    /// configured directory, then `~/.cfcache`.
    pub fn snapshot_dir(&self, explicit: Option<PathBuf>, configured: Option<&PathBuf>) -> PathBuf {
        self.pick_snapshot_dir(explicit, std::env::var_os(CACHE_DIR_ENV), configured)
    }

    /// Apply the precedence to an already-read environment value; an empty
    /// value counts as unset
    fn pick_snapshot_dir(
        &self,
        explicit: Option<PathBuf>,
        env: Option<OsString>,
        configured: Option<&PathBuf>,
    ) -> PathBuf {
        if let Some(dir) = explicit {
            return dir;
        }
        if let Some(dir) = env.filter(|v| !v.is_empty()) {
            return PathBuf::from(dir);
        }
        configured.cloned().unwrap_or_else(|| self.cache.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cache_dir_name() {
        let paths = Paths::new();
        assert!(paths.cache.ends_with(".cfcache"));
        assert!(paths.config_file().ends_with("cftools/config.yaml"));
    }

    #[test]
    fn test_explicit_dir_wins() {
        let paths = Paths::new();
        let configured = PathBuf::from("/from/config");
        let dir = paths.snapshot_dir(Some(PathBuf::from("/from/flag")), Some(&configured));
        assert_eq!(dir, PathBuf::from("/from/flag"));

        let dir = paths.pick_snapshot_dir(
            Some(PathBuf::from("/from/flag")),
            Some(OsString::from("/from/env")),
            Some(&configured),
        );
        assert_eq!(dir, PathBuf::from("/from/flag"));
    }

    #[test]
    fn test_env_dir_beats_config() {
        let paths = Paths::new();
        let configured = PathBuf::from("/from/config");
        let dir = paths.pick_snapshot_dir(None, Some(OsString::from("/from/env")), Some(&configured));
        assert_eq!(dir, PathBuf::from("/from/env"));
    }

    #[test]
    fn test_empty_env_is_ignored() {
        let paths = Paths::new();
        let configured = PathBuf::from("/from/config");
        let dir = paths.pick_snapshot_dir(None, Some(OsString::new()), Some(&configured));
        assert_eq!(dir, configured);
    }

    #[test]
    fn test_config_before_default() {
        let paths = Paths::new();
        let configured = PathBuf::from("/from/config");
        assert_eq!(paths.pick_snapshot_dir(None, None, Some(&configured)), configured);
        assert_eq!(paths.pick_snapshot_dir(None, None, None), paths.cache);
    }
}
