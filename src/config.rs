//! # Configuration Module
//!
//! Locates the data files Moodmatch reads at startup. Both live in the
//! platform-standard data directory unless overridden on the command line
//! (or through `MOODMATCH_CATALOG` / `MOODMATCH_MODEL`):
//!
//! - Linux: `~/.local/share/moodmatch/`
//! - macOS: `~/Library/Application Support/moodmatch/`
//! - Windows: `%APPDATA%\moodmatch\`
//!
//! | File | Contents |
//! |---|---|
//! | `catalog.db` | SQLite catalog written by `moodmatch import` |
//! | `mood_model.json` | trained mood classifier and its labels |

use crate::ranker::DEFAULT_TOP_N;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const CATALOG_FILE: &str = "catalog.db";
pub const MODEL_FILE: &str = "mood_model.json";

/// Returns the platform-appropriate data directory for Moodmatch,
/// creating it if it doesn't exist.
///
/// # Errors
///
/// This function will return an error if:
/// - The system data directory cannot be determined
/// - The moodmatch subdirectory cannot be created due to permissions
pub fn get_data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
        .ok_or_else(|| anyhow::anyhow!(
            "Could not determine system data directory. Please ensure your platform supports standard data directories."
        ))?;

    let app_dir = data_dir.join("moodmatch");
    fs::create_dir_all(&app_dir)
        .with_context(|| format!(
            "Failed to create Moodmatch data directory at {}. Please check file permissions.",
            app_dir.display()
        ))?;

    Ok(app_dir)
}

/// Default location of the SQLite catalog
pub fn get_catalog_path() -> Result<PathBuf> {
    Ok(get_data_dir()?.join(CATALOG_FILE))
}

/// Default location of the mood model
pub fn get_model_path() -> Result<PathBuf> {
    Ok(get_data_dir()?.join(MODEL_FILE))
}

/// Configuration for runtime behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Catalog file: `.csv` or a SQLite database
    pub catalog_path: PathBuf,
    /// Mood model JSON
    pub model_path: PathBuf,
    /// Recommendations per request
    pub top_n: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            catalog_path: get_catalog_path().unwrap_or_else(|_| PathBuf::from(CATALOG_FILE)),
            model_path: get_model_path().unwrap_or_else(|_| PathBuf::from(MODEL_FILE)),
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl RuntimeConfig {
    /// Create a new runtime configuration from the data directory
    pub fn new() -> Result<Self> {
        Ok(Self {
            catalog_path: get_catalog_path()?,
            model_path: get_model_path()?,
            top_n: DEFAULT_TOP_N,
        })
    }

    /// Create configuration with explicit file paths
    pub fn with_paths(catalog_path: PathBuf, model_path: PathBuf) -> Self {
        Self {
            catalog_path,
            model_path,
            top_n: DEFAULT_TOP_N,
        }
    }

    /// Apply command-line overrides; `None` keeps the current value.
    #[must_use]
    pub fn overridden(mut self, catalog: Option<PathBuf>, model: Option<PathBuf>) -> Self {
        if let Some(path) = catalog {
            self.catalog_path = path;
        }
        if let Some(path) = model {
            self.model_path = path;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_dir_exists_after_call() {
        let dir = get_data_dir().expect("Should get data directory");
        assert!(dir.exists());
        assert!(dir.is_dir());
        assert_eq!(dir.file_name().unwrap(), "moodmatch");
    }

    #[test]
    fn test_default_paths_share_data_dir() {
        let catalog = get_catalog_path().unwrap();
        let model = get_model_path().unwrap();
        assert_eq!(catalog.parent(), model.parent());
        assert!(catalog.ends_with(CATALOG_FILE));
        assert!(model.ends_with(MODEL_FILE));
    }

    #[test]
    fn test_overrides_replace_only_given_paths() {
        let config = RuntimeConfig::with_paths(PathBuf::from("a.db"), PathBuf::from("m.json"))
            .overridden(Some(PathBuf::from("b.csv")), None);
        assert_eq!(config.catalog_path, PathBuf::from("b.csv"));
        assert_eq!(config.model_path, PathBuf::from("m.json"));
        assert_eq!(config.top_n, DEFAULT_TOP_N);
    }

    #[test]
    fn test_config_serializes_to_json() {
        let config = RuntimeConfig::with_paths(PathBuf::from("a.db"), PathBuf::from("m.json"));
        let json = serde_json::to_string(&config).unwrap();
        let back: RuntimeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
