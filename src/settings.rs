use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::cleaner::{UnknownTypePolicy, DEFAULT_CATEGORY};
use crate::error::{CleanError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub charts_dir: PathBuf,
    pub log_dir: PathBuf,
    pub default_category: String,
    pub unknown_type_policy: UnknownTypePolicy,
    /// Count months with no expenses as zero when averaging.
    pub fill_empty_months: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("data/raw/transactions_raw.csv"),
            output_path: PathBuf::from("data/processed/transactions_clean.csv"),
            charts_dir: PathBuf::from("reports/charts"),
            log_dir: PathBuf::from("logs"),
            default_category: DEFAULT_CATEGORY.to_string(),
            unknown_type_policy: UnknownTypePolicy::default(),
            fill_empty_months: false,
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("finclean")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn parse_settings(content: &str) -> Result<Settings> {
    serde_json::from_str(content).map_err(|e| CleanError::Settings(e.to_string()))
}

/// Load from `explicit` when given (it must exist), else the user config file when
/// present, else defaults.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => {
            let p = settings_path();
            if !p.exists() {
                return Ok(Settings::default());
            }
            p
        }
    };
    let content = std::fs::read_to_string(&path)
        .map_err(|e| CleanError::Settings(format!("{}: {e}", path.display())))?;
    parse_settings(&content)
}

pub fn to_json(settings: &Settings) -> Result<String> {
    serde_json::to_string_pretty(settings).map_err(|e| CleanError::Settings(e.to_string()))
}
