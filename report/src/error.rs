use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("unknown analysis module: {0}")]
    UnknownModule(String),

    #[error("cannot read history file {}: {source}", path.display())]
    HistoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write history file {}: {source}", path.display())]
    HistoryWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("history file {} is not valid: {source}", path.display())]
    HistoryDecode {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("cannot encode history: {0}")]
    HistoryEncode(#[from] toml::ser::Error),

    #[error("no history entry with id {0}")]
    NoSuchEntry(i64),
}
