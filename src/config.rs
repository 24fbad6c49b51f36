//! Application settings.
//!
//! Loaded once at startup and handed by reference to whatever needs it.
//! Stored as pretty-printed JSON in `{config_dir}/VergiNoDogrula/appsettings.json`.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

const APP_DIR: &str = "VergiNoDogrula";
const SETTINGS_FILE: &str = "appsettings.json";
const DATABASE_FILE: &str = "taxpayers.db";
const DEFAULT_BACKUP_INTERVAL_MINUTES: u32 = 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub backup_folder: PathBuf,
    pub auto_backup_enabled: bool,
    pub auto_backup_interval_minutes: u32,
    pub last_backup_time: Option<DateTime<Utc>>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_path: default_database_path(),
            backup_folder: default_backup_folder(),
            auto_backup_enabled: false,
            auto_backup_interval_minutes: DEFAULT_BACKUP_INTERVAL_MINUTES,
            last_backup_time: None,
        }
    }
}

impl AppConfig {
    /// `{config_dir}/VergiNoDogrula/appsettings.json`
    pub fn default_path() -> PathBuf {
        base_dir(dirs::config_dir()).join(SETTINGS_FILE)
    }

    /// Read settings from `path`.
    ///
    /// A missing or blank file gives the defaults. So does a malformed one,
    /// after a warning: losing a settings file must not stop the program.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(AppConfig::default());
        }

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {:?}", path))?;
        if text.trim().is_empty() {
            return Ok(AppConfig::default());
        }

        match serde_json::from_str::<AppConfig>(&text) {
            Ok(config) => Ok(config.normalized()),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ignoring malformed settings file");
                Ok(AppConfig::default())
            }
        }
    }

    /// Write settings to `path`, creating its directory.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create settings directory {:?}", parent))?;
        }

        let json = serde_json::to_string_pretty(self).context("failed to serialize settings")?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write settings file {:?}", path))?;

        Ok(())
    }

    /// Backup interval as a duration; 0 means the default.
    pub fn auto_backup_interval(&self) -> chrono::Duration {
        let minutes = match self.auto_backup_interval_minutes {
            0 => DEFAULT_BACKUP_INTERVAL_MINUTES,
            minutes => minutes,
        };
        chrono::Duration::minutes(i64::from(minutes))
    }

    // Zero interval and empty paths fall back to the defaults
    fn normalized(mut self) -> Self {
        if self.auto_backup_interval_minutes == 0 {
            self.auto_backup_interval_minutes = DEFAULT_BACKUP_INTERVAL_MINUTES;
        }
        if self.database_path.as_os_str().is_empty() {
            self.database_path = default_database_path();
        }
        if self.backup_folder.as_os_str().is_empty() {
            self.backup_folder = default_backup_folder();
        }
        self
    }
}

/// `{data_dir}/VergiNoDogrula/taxpayers.db`
fn default_database_path() -> PathBuf {
    base_dir(dirs::data_local_dir()).join(DATABASE_FILE)
}

/// `{document_dir}/VergiNoDogrula/BackUp`
fn default_backup_folder() -> PathBuf {
    base_dir(dirs::document_dir()).join("BackUp")
}

fn base_dir(preferred: Option<PathBuf>) -> PathBuf {
    preferred
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}
