//! Analysis reports: numbered sections of a result, rendered per module,
//! and the local history of past analyses.

pub mod error;
pub mod history;
pub mod module;
pub mod report;
pub mod section;

pub use error::ReportError;
pub use history::{History, HistoryEntry};
pub use module::AnalysisModule;
pub use report::{RenderedSection, Report, write_html, write_text};
pub use section::{Section, split_sections};
