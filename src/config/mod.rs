//! Sync configuration file management.
//!
//! The configuration lives as JSON at `~/.quillsyncrc`, written by the init
//! wizard and loaded once per invocation. There is no process-wide loaded
//! config: callers pass the [`Config`] value into every engine call.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::library::Collection;

/// Config file name under the user's home directory.
pub const CONFIG_FILE_NAME: &str = ".quillsyncrc";

/// Exclusion tags written by the wizard when the user keeps the default.
pub const DEFAULT_EXCLUDE_TAGS: [&str; 3] = ["hide", "wip", "secret"];

/// The sync configuration.
///
/// All four fields must be present and non-empty for the engine to run; a
/// partially populated config is a fatal configuration error, never a
/// per-note one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the note library.
    pub library: PathBuf,
    /// Path to the blog root.
    pub blog: PathBuf,
    /// The collection notes are synced from; `uuid` is the identifier used
    /// on disk, `name` is display-only.
    pub collection: Collection,
    /// A note carrying any of these tags is never synchronized. This is an
    /// exclusion list: presence of a listed tag forces `Skip`.
    pub exclude_tags: BTreeSet<String>,
}

impl Config {
    /// Check the invariant that every field is populated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first empty field.
    pub fn validate(&self) -> Result<()> {
        if self.library.as_os_str().is_empty() {
            return Err(Error::Config("library path is empty".to_string()));
        }
        if self.blog.as_os_str().is_empty() {
            return Err(Error::Config("blog path is empty".to_string()));
        }
        if self.collection.uuid.is_empty() {
            return Err(Error::Config("collection uuid is empty".to_string()));
        }
        if self.exclude_tags.is_empty() {
            return Err(Error::Config("exclude_tags is empty".to_string()));
        }
        Ok(())
    }
}

/// Resolve the config file path under the user's home directory.
///
/// # Errors
///
/// Returns [`Error::Config`] when no home directory can be determined.
pub fn config_file_path() -> Result<PathBuf> {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(CONFIG_FILE_NAME))
        .ok_or_else(|| Error::Config("home directory is not available".to_string()))
}

/// Load and validate the configuration from the default location.
///
/// # Errors
///
/// [`Error::ConfigMissing`] when no config file exists yet, or
/// [`Error::Config`] when it is unreadable, unparseable, or incomplete.
pub fn load() -> Result<Config> {
    load_from(&config_file_path()?)
}

/// Load the configuration without failing the process on problems.
///
/// Used by the wizard to prefill defaults from a previous run; a broken or
/// absent config simply yields `None`.
#[must_use]
pub fn try_load() -> Option<Config> {
    config_file_path().ok().and_then(|path| {
        let bytes = std::fs::read(path).ok()?;
        serde_json::from_slice(&bytes).ok()
    })
}

/// Load and validate the configuration from an explicit path.
///
/// # Errors
///
/// See [`load`].
pub fn load_from(path: &Path) -> Result<Config> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::ConfigMissing {
                path: path.to_path_buf(),
            });
        }
        Err(e) => return Err(e.into()),
    };
    let config: Config = serde_json::from_slice(&bytes).map_err(|e| {
        Error::Config(format!("config file is broken [{}]: {e}", path.display()))
    })?;
    config.validate()?;
    Ok(config)
}

/// Write the configuration to the default location as pretty JSON.
///
/// # Errors
///
/// Returns an error if the home directory is unavailable or the write fails.
pub fn store(config: &Config) -> Result<()> {
    store_at(&config_file_path()?, config)
}

/// Write the configuration to an explicit path.
///
/// # Errors
///
/// See [`store`].
pub fn store_at(path: &Path, config: &Config) -> Result<()> {
    let mut json = serde_json::to_string_pretty(config)?;
    json.push('\n');
    std::fs::write(path, json)?;
    Ok(())
}

/// Expand a leading `~` to the user's home directory.
///
/// Inputs without a tilde prefix pass through unchanged; if no home
/// directory can be determined the literal path is returned.
#[must_use]
pub fn expand_tilde(input: &str) -> PathBuf {
    let home = directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
    match (input, home) {
        ("~", Some(home)) => home,
        (other, Some(home)) if other.starts_with("~/") => home.join(&other[2..]),
        (other, _) => PathBuf::from(other),
    }
}
