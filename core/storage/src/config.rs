//! Configuration directory resolution.
//!
//! The directory is looked up in this order:
//! 1. `$XDG_CONFIG_HOME/pwtoy`
//! 2. `$HOME/.config/pwtoy`
//! 3. the platform configuration directory reported by `dirs`, plus `pwtoy`
//!
//! Empty environment variables count as unset.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

use pwtoy_common::{Error, Result};

/// Directory name under the configuration base.
pub const APP_DIRNAME: &str = "pwtoy";

/// Master record file name inside the configuration directory.
pub const RECORD_FILENAME: &str = "master.argon2";

/// Resolved configuration directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDir {
    path: PathBuf,
}

impl ConfigDir {
    /// Resolve from the process environment.
    ///
    /// # Errors
    /// - `Config` if no candidate location is available
    pub fn resolve() -> Result<Self> {
        Self::resolve_with(|key| std::env::var_os(key), dirs::config_dir)
    }

    /// Resolve using the given environment lookup and platform fallback.
    pub fn resolve_with<E, F>(env: E, platform: F) -> Result<Self>
    where
        E: Fn(&str) -> Option<OsString>,
        F: FnOnce() -> Option<PathBuf>,
    {
        let lookup = |key: &str| env(key).filter(|value| !value.is_empty());

        let base = if let Some(xdg) = lookup("XDG_CONFIG_HOME") {
            PathBuf::from(xdg)
        } else if let Some(home) = lookup("HOME") {
            PathBuf::from(home).join(".config")
        } else if let Some(platform) = platform() {
            platform
        } else {
            return Err(Error::Config(
                "cannot locate a configuration directory: set XDG_CONFIG_HOME or HOME"
                    .to_string(),
            ));
        };

        let path = base.join(APP_DIRNAME);
        debug!("Configuration directory: {}", path.display());
        Ok(Self { path })
    }

    /// Use an explicit directory.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create the directory and any missing parents.
    pub fn ensure_exists(&self) -> Result<()> {
        if !self.path.is_dir() {
            debug!("Creating configuration directory {}", self.path.display());
            std::fs::create_dir_all(&self.path)?;
        }
        Ok(())
    }

    /// Get the directory path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the master record file.
    pub fn record_path(&self) -> PathBuf {
        self.path.join(RECORD_FILENAME)
    }
}
