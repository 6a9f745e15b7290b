//! Path management for Tally
//!
//! ## Path Resolution Order
//!
//! 1. `TALLY_DATA_DIR` environment variable (if set)
//! 2. The platform config directory: `$XDG_CONFIG_HOME/tally` or
//!    `~/.config/tally` on Linux, `~/Library/Application Support/tally` on
//!    macOS, `%APPDATA%\tally\config` on Windows

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::error::TallyError;

/// Environment variable that overrides the base directory
pub const DATA_DIR_ENV: &str = "TALLY_DATA_DIR";

/// Manages all paths used by Tally
#[derive(Debug, Clone)]
pub struct TallyPaths {
    /// Base directory for all Tally data
    base_dir: PathBuf,
}

impl TallyPaths {
    /// Resolve the base directory from the environment
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, TallyError> {
        let base_dir = match std::env::var_os(DATA_DIR_ENV) {
            Some(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Create TallyPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Get the data directory (<base>/data/)
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the directory CSV exports are written to by default
    pub fn exports_dir(&self) -> PathBuf {
        self.base_dir.join("exports")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the snapshot store
    pub fn store_file(&self) -> PathBuf {
        self.data_dir().join("store.json")
    }

    /// Ensure the base and data directories exist
    pub fn ensure_directories(&self) -> Result<(), TallyError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| TallyError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| TallyError::Io(format!("Failed to create data directory: {}", e)))?;

        Ok(())
    }

    /// Ensure the exports directory exists and return it
    pub fn ensure_exports_dir(&self) -> Result<PathBuf, TallyError> {
        let dir = self.exports_dir();
        std::fs::create_dir_all(&dir)
            .map_err(|e| TallyError::Io(format!("Failed to create exports directory: {}", e)))?;
        Ok(dir)
    }
}

fn resolve_default_path() -> Result<PathBuf, TallyError> {
    ProjectDirs::from("", "", "tally")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| TallyError::Config("Could not determine a home directory".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = TallyPaths::with_base_dir(temp_dir.path());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.data_dir(), temp_dir.path().join("data"));
        assert_eq!(paths.exports_dir(), temp_dir.path().join("exports"));
    }

    #[test]
    fn test_env_var_override() {
        let temp_dir = TempDir::new().unwrap();

        env::set_var(DATA_DIR_ENV, temp_dir.path());
        let paths = TallyPaths::new().unwrap();
        env::remove_var(DATA_DIR_ENV);

        assert_eq!(paths.base_dir(), temp_dir.path());
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = TallyPaths::with_base_dir(temp_dir.path().join("tally"));

        paths.ensure_directories().unwrap();
        assert!(paths.data_dir().exists());
        assert!(!paths.exports_dir().exists());

        let exports = paths.ensure_exports_dir().unwrap();
        assert!(exports.is_dir());
    }

    #[test]
    fn test_file_paths() {
        let temp_dir = TempDir::new().unwrap();
        let paths = TallyPaths::with_base_dir(temp_dir.path());

        assert_eq!(paths.settings_file(), temp_dir.path().join("config.json"));
        assert_eq!(
            paths.store_file(),
            temp_dir.path().join("data").join("store.json")
        );
    }
}
