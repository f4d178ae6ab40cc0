//! Application configuration.
//!
//! A small JSON file in the user config directory. Only paths that override
//! the defaults are stored; a missing or unreadable file silently falls back
//! to defaults so a broken config never prevents startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::files::FileHandler;
use crate::state::store::Store;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Override for the catalog database file.
    #[serde(default)]
    pub db_path: Option<PathBuf>,
    /// Override for the managed document storage directory.
    #[serde(default)]
    pub upload_dir: Option<PathBuf>,
}

impl Config {
    /// Default config file location: `<config_dir>/docudesk/config.json`.
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        path.push("docudesk");
        path.push("config.json");
        path
    }

    /// Load from the default location, falling back to defaults on any error.
    pub fn load() -> Self {
        Self::load_or_init(&Self::default_path())
    }

    /// Load from `path`; on a first run the defaults are written back so the
    /// file exists for the user to edit.
    pub fn load_or_init(path: &Path) -> Self {
        let config = Self::load_from(path);
        if !path.exists() {
            if let Err(err) = config.save_to(path) {
                log::warn!("⚠️ Could not write default config {}: {}", path.display(), err);
            }
        }
        config
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(config) => config,
                Err(err) => {
                    log::warn!("⚠️ Ignoring malformed config {}: {}", path.display(), err);
                    Config::default()
                }
            },
            Err(_) => Config::default(),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(self).expect("config serializes");
        std::fs::write(path, raw)?;
        Ok(())
    }

    /// Effective database path, honoring the override.
    pub fn db_path(&self) -> PathBuf {
        self.db_path.clone().unwrap_or_else(Store::default_db_path)
    }

    /// Effective upload directory, honoring the override.
    pub fn upload_dir(&self) -> PathBuf {
        self.upload_dir
            .clone()
            .unwrap_or_else(FileHandler::default_upload_dir)
    }
}
