use std::path::PathBuf;

use anyhow::{Context, Result};
use report::History;

use crate::config::Config;

/// State shared by the commands that remember things between runs.
/// Rendering alone never needs it.
pub struct AppState {
    pub config: Config,
    pub history: History,
    history_path: PathBuf,
}

impl AppState {
    pub fn load(config: Config) -> Result<Self> {
        let history_path = config.history_path()?;
        let history = History::load(&history_path, config.history_limit)
            .with_context(|| format!("loading history from {}", history_path.display()))?;
        Ok(AppState {
            config,
            history,
            history_path,
        })
    }

    pub fn save_history(&self) -> Result<()> {
        self.history
            .save(&self.history_path)
            .with_context(|| format!("saving history to {}", self.history_path.display()))
    }
}
