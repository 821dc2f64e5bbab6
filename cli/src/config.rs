use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use report::AnalysisModule;
use serde::{Deserialize, Serialize};

const APP_DIR: &str = "enclaro";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// How many past analyses to keep
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// History file location (defaults to the platform data directory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_file: Option<PathBuf>,

    /// Module used by `report` when none is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_module: Option<AnalysisModule>,

    /// Colored diagnostics
    #[serde(default = "default_color")]
    pub color: bool,
}

fn default_history_limit() -> usize {
    report::history::DEFAULT_LIMIT
}

fn default_color() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Config {
            history_limit: default_history_limit(),
            history_file: None,
            default_module: None,
            color: default_color(),
        }
    }
}

impl Config {
    /// The config file path in the platform config directory
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().context("could not find config directory")?;
        Ok(dir.join(APP_DIR).join("config.toml"))
    }

    /// Load config from `path` (or the default location). Problems fall back
    /// to defaults: a broken config file never blocks rendering.
    pub fn load(path: Option<&Path>) -> Config {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Ok(p) => p,
                Err(e) => {
                    tracing::warn!("{:#}", e);
                    return Config::default();
                }
            },
        };

        if !path.exists() {
            tracing::debug!("no config at {}, using defaults", path.display());
            return Config::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to parse config {}: {}", path.display(), e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config {}: {}", path.display(), e);
                Config::default()
            }
        }
    }

    /// Where history is stored
    pub fn history_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.history_file {
            return Ok(path.clone());
        }
        let dir = dirs::data_dir().context("could not find data directory")?;
        Ok(dir.join(APP_DIR).join("history.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: Config = toml::from_str("default_module = \"routine\"").unwrap();
        assert_eq!(config.default_module, Some(AnalysisModule::Routine));
        assert_eq!(config.history_limit, 20);
        assert!(config.color);
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "history_limit = 5\nhistory_file = \"/tmp/h.toml\"\ncolor = false\n")
            .unwrap();

        let config = Config::load(Some(&path));
        assert_eq!(config.history_limit, 5);
        assert!(!config.color);
        assert_eq!(config.history_path().unwrap(), PathBuf::from("/tmp/h.toml"));
    }

    #[test]
    fn broken_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "history_limit = \"many\"").unwrap();
        assert_eq!(Config::load(Some(&path)), Config::default());
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            Config::load(Some(&dir.path().join("absent.toml"))),
            Config::default()
        );
    }

    #[test]
    fn serializes_without_unset_options() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        assert!(!text.contains("history_file"));
        assert!(text.contains("history_limit = 20"));
    }
}
