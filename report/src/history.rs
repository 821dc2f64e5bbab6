use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ReportError;
use crate::module::AnalysisModule;

pub const DEFAULT_LIMIT: usize = 20;

const PREVIEW_CHARS: usize = 60;

/// A saved analysis: what was asked and what came back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Creation time in milliseconds, bumped when two entries collide.
    pub id: i64,
    pub module: AnalysisModule,
    pub input: String,
    pub result: String,
    pub created_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// The first characters of the input, for listings.
    pub fn preview(&self) -> String {
        let mut chars = self.input.chars();
        let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
        if chars.next().is_some() {
            format!("{}...", head)
        } else {
            head
        }
    }
}

/// Saved analyses, newest first, capped at `limit` entries. The cap is never
/// below one, so the entry just pushed is always kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct History {
    #[serde(default)]
    entries: Vec<HistoryEntry>,
    #[serde(skip, default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

impl Default for History {
    fn default() -> Self {
        History::new(DEFAULT_LIMIT)
    }
}

impl History {
    pub fn new(limit: usize) -> Self {
        History {
            entries: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Load from a TOML file. A missing file is an empty history.
    pub fn load(path: &Path, limit: usize) -> Result<History, ReportError> {
        if !path.exists() {
            debug!(path = %path.display(), "no history file yet");
            return Ok(History::new(limit));
        }
        let content = std::fs::read_to_string(path).map_err(|source| ReportError::HistoryRead {
            path: path.to_path_buf(),
            source,
        })?;
        let mut history: History =
            toml::from_str(&content).map_err(|source| ReportError::HistoryDecode {
                path: path.to_path_buf(),
                source,
            })?;
        history.limit = limit.max(1);
        history.entries.truncate(history.limit);
        debug!(path = %path.display(), entries = history.entries.len(), "loaded history");
        Ok(history)
    }

    /// Write to a TOML file, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), ReportError> {
        let content = toml::to_string_pretty(self)?;
        let write_err = |source| ReportError::HistoryWrite {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        std::fs::write(path, content).map_err(write_err)?;
        debug!(path = %path.display(), entries = self.entries.len(), "saved history");
        Ok(())
    }

    /// Record a new analysis at the front, dropping the oldest past the limit.
    pub fn push(&mut self, module: AnalysisModule, input: &str, result: &str) -> &HistoryEntry {
        self.push_at(module, input, result, Utc::now())
    }

    fn push_at(
        &mut self,
        module: AnalysisModule,
        input: &str,
        result: &str,
        created_at: DateTime<Utc>,
    ) -> &HistoryEntry {
        let mut id = created_at.timestamp_millis();
        if let Some(newest) = self.entries.first() {
            id = id.max(newest.id + 1);
        }
        self.entries.insert(
            0,
            HistoryEntry {
                id,
                module,
                input: input.to_string(),
                result: result.to_string(),
                created_at,
            },
        );
        self.entries.truncate(self.limit);
        &self.entries[0]
    }

    pub fn get(&self, id: i64) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    #[test]
    fn newest_first_and_capped() {
        let mut history = History::new(2);
        history.push_at(AnalysisModule::Message, "a", "ra", at(1_000));
        history.push_at(AnalysisModule::Audio, "b", "rb", at(2_000));
        history.push_at(AnalysisModule::Glossary, "c", "rc", at(3_000));
        let inputs: Vec<_> = history.entries().iter().map(|e| e.input.as_str()).collect();
        assert_eq!(inputs, vec!["c", "b"]);
    }

    #[test]
    fn ids_stay_unique_within_one_millisecond() {
        let mut history = History::new(5);
        let first = history.push_at(AnalysisModule::Message, "a", "r", at(5)).id;
        let second = history.push_at(AnalysisModule::Message, "b", "r", at(5)).id;
        assert_eq!(first, 5);
        assert_eq!(second, 6);
        assert_eq!(history.get(5).unwrap().input, "a");
    }

    #[test]
    fn zero_limit_still_keeps_newest() {
        let mut history = History::new(0);
        assert_eq!(history.limit(), 1);
        history.push(AnalysisModule::Message, "a", "r");
        let id = history.push(AnalysisModule::Message, "b", "r").id;
        assert_eq!(history.len(), 1);
        assert_eq!(history.get(id).unwrap().input, "b");
    }

    #[test]
    fn preview_truncates_long_input() {
        let mut history = History::default();
        let long = "x".repeat(61);
        let entry = history.push(AnalysisModule::Message, &long, "r");
        assert_eq!(entry.preview(), format!("{}...", "x".repeat(60)));

        let entry = history.push(AnalysisModule::Message, "short", "r");
        assert_eq!(entry.preview(), "short");
    }

    #[test]
    fn clear_empties() {
        let mut history = History::default();
        history.push(AnalysisModule::Routine, "a", "r");
        history.clear();
        assert!(history.is_empty());
    }
}
