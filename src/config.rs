//! # Configuration Module
//!
//! cmus starts its status program with nothing but the track tags, so there
//! is no room for command-line options in normal use. Settings therefore come
//! from a JSON file, with command-line flags on top for manual runs.
//!
//! ## Locations
//!
//! - Config file: `<config dir>/segue/config.json`
//!   - Linux: `~/.config/segue/config.json`
//!   - macOS: `~/Library/Application Support/segue/config.json`
//! - cmus files: `$CMUS_HOME` or `~/.cmus`, holding `cache` and `lib.pl`
//!
//! A missing config file means defaults. Every field is optional.
//!
//! ## Example
//!
//! ```json
//! {
//!   "add_to": "playlist",
//!   "lastfm_api_key": "0123456789abcdef",
//!   "selection": { "epsilon": 0.1, "jumpout_epsilon": 0.0 }
//! }
//! ```

use crate::cache::WordSize;
use crate::player::AddTo;
use crate::selection::SelectionConfig;
use anyhow::{Context, Result};
use log::debug;
use path_absolutize::Absolutize;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Returns the path of the default config file.
///
/// # Errors
///
/// Returns an error if the platform config directory cannot be determined.
pub fn get_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().ok_or_else(|| {
        anyhow::anyhow!(
            "Could not determine system config directory. Please ensure your platform supports standard config directories."
        )
    })?;
    Ok(config_dir.join("segue").join("config.json"))
}

/// Returns `~/.cmus`.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn get_cmus_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory for ~/.cmus"))?;
    Ok(home.join(".cmus"))
}

/// Resolves `path` against the working directory.
///
/// # Errors
///
/// Returns an error if the working directory cannot be read.
pub fn absolute(path: &Path) -> Result<PathBuf> {
    Ok(path
        .absolutize()
        .with_context(|| format!("Failed to make {} absolute", path.display()))?
        .into_owned())
}

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// cmus configuration directory. `None` means `~/.cmus`.
    pub cmus_dir: Option<PathBuf>,
    /// Overrides `<cmus_dir>/cache`.
    pub cache_path: Option<PathBuf>,
    /// Overrides `<cmus_dir>/lib.pl`.
    pub library_path: Option<PathBuf>,
    /// Program used to control cmus.
    pub remote_command: String,
    /// Only consider tracks that were in the library when cmus started.
    pub only_library_tracks: bool,
    pub add_to: AddTo,
    /// Fork into the background before the similarity lookup.
    pub detach: bool,
    /// Word width of the cmus build that wrote the cache.
    pub word_size: WordSize,
    pub selection: SelectionConfig,
    pub lastfm_api_key: Option<String>,
    pub lastfm_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cmus_dir: None,
            cache_path: None,
            library_path: None,
            remote_command: "cmus-remote".to_string(),
            only_library_tracks: true,
            add_to: AddTo::Queue,
            detach: true,
            word_size: WordSize::Auto,
            selection: SelectionConfig::default(),
            lastfm_api_key: None,
            lastfm_timeout_secs: 10,
        }
    }
}

impl Config {
    /// Loads `path`, or the default config file when `path` is `None`.
    ///
    /// # Lookup
    ///
    /// - `Some(path)`: the file must exist (it came from `--config` or
    ///   `SEGUE_CONFIG`)
    /// - `None`: [`get_config_path`] is used, and a missing file means
    ///   [`Config::default`]
    ///
    /// Fields left out of the file keep their defaults.
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - The validated configuration
    /// * `Err(anyhow::Error)` - If the file is unusable
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - An explicitly named file does not exist or cannot be read
    /// - The file is not valid JSON for [`Config`]
    /// - The selection values are outside `0..=1`
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use segue::config::Config;
    ///
    /// let config = Config::load(None)?;
    /// println!("Adding to the {}", config.add_to);
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (get_config_path()?, false),
        };

        if !required && !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_json(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parses and validates a JSON config.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed JSON or invalid selection values.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns an error if the selection values are out of range.
    pub fn validate(&self) -> Result<()> {
        self.selection.validate().context("Invalid selection settings")
    }

    /// # Errors
    ///
    /// Returns an error if no cmus directory is configured and the home
    /// directory is unknown.
    pub fn cmus_dir(&self) -> Result<PathBuf> {
        match &self.cmus_dir {
            Some(dir) => absolute(dir),
            None => get_cmus_dir(),
        }
    }

    /// # Errors
    ///
    /// See [`Config::cmus_dir`].
    pub fn cache_path(&self) -> Result<PathBuf> {
        match &self.cache_path {
            Some(path) => absolute(path),
            None => Ok(self.cmus_dir()?.join("cache")),
        }
    }

    /// # Errors
    ///
    /// See [`Config::cmus_dir`].
    pub fn library_path(&self) -> Result<PathBuf> {
        match &self.library_path {
            Some(path) => absolute(path),
            None => Ok(self.cmus_dir()?.join("lib.pl")),
        }
    }

    #[must_use]
    pub fn lastfm_timeout(&self) -> Duration {
        Duration::from_secs(self.lastfm_timeout_secs)
    }
}
