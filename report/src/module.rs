use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ReportError;

/// The kind of analysis a result was produced by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisModule {
    Message,
    Audio,
    Glossary,
    Response,
    Routine,
    Decoder,
    Roleplay,
    RoleplayFeedback,
    Translator,
}

impl AnalysisModule {
    pub const ALL: [AnalysisModule; 9] = [
        AnalysisModule::Message,
        AnalysisModule::Audio,
        AnalysisModule::Glossary,
        AnalysisModule::Response,
        AnalysisModule::Routine,
        AnalysisModule::Decoder,
        AnalysisModule::Roleplay,
        AnalysisModule::RoleplayFeedback,
        AnalysisModule::Translator,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisModule::Message => "message",
            AnalysisModule::Audio => "audio",
            AnalysisModule::Glossary => "glossary",
            AnalysisModule::Response => "response",
            AnalysisModule::Routine => "routine",
            AnalysisModule::Decoder => "decoder",
            AnalysisModule::Roleplay => "roleplay",
            AnalysisModule::RoleplayFeedback => "roleplay_feedback",
            AnalysisModule::Translator => "translator",
        }
    }

    /// Routines come back as schedules, so their sections may hold a table.
    pub fn uses_tables(&self) -> bool {
        matches!(self, AnalysisModule::Routine)
    }

    /// Suggested replies are meant to be copied out.
    pub fn offers_copy(&self) -> bool {
        matches!(self, AnalysisModule::Response)
    }
}

impl fmt::Display for AnalysisModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for AnalysisModule {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnalysisModule::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| ReportError::UnknownModule(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for module in AnalysisModule::ALL {
            assert_eq!(module.as_str().parse::<AnalysisModule>().unwrap(), module);
        }
    }

    #[test]
    fn unknown_name_is_an_error() {
        let err = "weather".parse::<AnalysisModule>().unwrap_err();
        assert_eq!(err.to_string(), "unknown analysis module: weather");
    }

    #[test]
    fn only_routine_uses_tables() {
        let with_tables: Vec<_> = AnalysisModule::ALL
            .into_iter()
            .filter(AnalysisModule::uses_tables)
            .collect();
        assert_eq!(with_tables, vec![AnalysisModule::Routine]);
    }
}
