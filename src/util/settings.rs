use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeError;

use crate::domain::{CatalogError, TariffCatalog, TariffEntry};
use crate::infra::census::{DEFAULT_EXPORTS_URL, DEFAULT_IMPORTS_URL};

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "TradeTariffMonitor";
const APP_NAME: &str = "TradeTariffMonitor";
const SETTINGS_FILE: &str = "settings.json";

/// User configuration. Every field has a default, so a partial file is fine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub exports_url: String,
    pub imports_url: String,
    pub cache_ttl_secs: u64,
    pub request_timeout_secs: u64,
    /// Report year. Defaults to last calendar year when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    /// Replaces the built-in tariff table when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tariffs: Option<Vec<TariffEntry>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            exports_url: DEFAULT_EXPORTS_URL.to_string(),
            imports_url: DEFAULT_IMPORTS_URL.to_string(),
            cache_ttl_secs: 60 * 60,
            request_timeout_secs: 30,
            year: None,
            tariffs: None,
        }
    }
}

impl Settings {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Values that parse but cannot work at runtime.
    pub fn validate(&self) -> Result<(), String> {
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be at least 1".to_string());
        }
        Ok(())
    }

    pub fn catalog(&self) -> Result<TariffCatalog, CatalogError> {
        match &self.tariffs {
            Some(entries) => TariffCatalog::new(entries.clone()),
            None => Ok(TariffCatalog::builtin()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("config directory unavailable")]
    StorageUnavailable,
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("invalid settings in {path}: {source}")]
    Parse { path: PathBuf, source: SerdeError },
    #[error("invalid settings in {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] SerdeError),
}

/// Default settings location in the platform config directory.
pub fn settings_file() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
}

/// Load settings from `explicit`, or from the default location.
///
/// An explicit path must exist. A missing default file yields defaults.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings, SettingsError> {
    match explicit {
        Some(path) => read_settings(path),
        None => match settings_file() {
            Some(path) if path.exists() => read_settings(&path),
            _ => Ok(Settings::default()),
        },
    }
}

pub fn read_settings(path: &Path) -> Result<Settings, SettingsError> {
    let data = fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let settings: Settings = serde_json::from_str(&data).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    settings.validate().map_err(|reason| SettingsError::Invalid {
        path: path.to_path_buf(),
        reason,
    })?;
    Ok(settings)
}

pub fn save_settings(path: &Path, settings: &Settings) -> Result<(), SettingsError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;
    Ok(())
}

/// Write default settings to the platform config directory and return the path.
pub fn init_default_settings() -> Result<PathBuf, SettingsError> {
    let path = settings_file().ok_or(SettingsError::StorageUnavailable)?;
    save_settings(&path, &Settings::default())?;
    Ok(path)
}
