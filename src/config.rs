//! Configuration loading for AppLogger.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::store::codec::{COLUMN_COUNT, HEADER};

pub type Result<T> = std::result::Result<T, Error>;

/// Get the AppLogger home directory (~/.applogger).
pub fn get_home_dir() -> Result<PathBuf> {
    let home = directories::UserDirs::new()
        .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

    Ok(home.home_dir().join(".applogger"))
}

/// Get the settings file path.
pub fn get_settings_path() -> Result<PathBuf> {
    Ok(get_home_dir()?.join("settings.json"))
}

/// Load settings from ~/.applogger/settings.json, falling back to defaults
/// when the file does not exist.
pub fn load_settings() -> Result<Settings> {
    let path = get_settings_path()?;

    if !path.exists() {
        tracing::debug!("No settings at {}, using defaults", path.display());
        return Ok(Settings::default());
    }

    load_settings_from(&path)
}

/// Load settings from an explicit path.
pub fn load_settings_from(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path)?;
    let settings: Settings = serde_json::from_str(&content)?;

    validate_settings(&settings)?;

    tracing::debug!("Loaded settings from {}", path.display());
    Ok(settings)
}

fn validate_settings(settings: &Settings) -> Result<()> {
    if settings.data_file.trim().is_empty() {
        return Err(Error::Config("data_file must not be empty".to_string()));
    }
    if settings.server.port == 0 {
        return Err(Error::Config("server.port must be non-zero".to_string()));
    }
    Ok(())
}

/// HTTP server configuration.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Store behaviour switches.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct StoreSettings {
    /// Reject create() when the id already exists.
    #[serde(default)]
    pub enforce_unique_ids: bool,
    /// Hold a `<file>.lock` lock file for each read-modify-write cycle.
    #[serde(default)]
    pub lock_writes: bool,
}

/// AppLogger settings.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Settings {
    /// Directory holding the data file. Defaults to ~/.applogger/data.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    #[serde(default = "default_data_file")]
    pub data_file: String,

    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub store: StoreSettings,
}

fn default_data_file() -> String {
    "applications.csv".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: None,
            data_file: default_data_file(),
            server: ServerSettings::default(),
            store: StoreSettings::default(),
        }
    }
}

impl Settings {
    /// Full path of the CSV data file.
    pub fn data_path(&self) -> Result<PathBuf> {
        let dir = match &self.data_dir {
            Some(dir) => dir.clone(),
            None => get_home_dir()?.join("data"),
        };
        Ok(dir.join(&self.data_file))
    }

    /// Build the store configuration, optionally overriding the data path.
    pub fn store_config(&self, data_path: Option<PathBuf>) -> Result<StoreConfig> {
        let path = match data_path {
            Some(path) => path,
            None => self.data_path()?,
        };
        Ok(StoreConfig {
            enforce_unique_ids: self.store.enforce_unique_ids,
            lock_writes: self.store.lock_writes,
            ..StoreConfig::new(path)
        })
    }
}

/// Everything a [`crate::store::Store`] needs to know about its backing file.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub header: String,
    pub columns: usize,
    pub enforce_unique_ids: bool,
    pub lock_writes: bool,
}

impl StoreConfig {
    /// Config for the standard 12-column applications file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            header: HEADER.to_string(),
            columns: COLUMN_COUNT,
            enforce_unique_ids: false,
            lock_writes: false,
        }
    }
}
