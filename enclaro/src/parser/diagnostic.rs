use std::fmt;
use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label, Severity};

/// Ways the input degraded to a less structured rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum WarningKind {
    UnclosedFence,
    UnmatchedEmphasis,
    UnmatchedBacktick,
    ColumnMismatch { header: usize, row: usize },
    EmptyTable,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningKind::UnclosedFence => write!(f, "unclosed code fence"),
            WarningKind::UnmatchedEmphasis => write!(f, "unmatched `*` left as literal text"),
            WarningKind::UnmatchedBacktick => {
                write!(f, "unmatched backtick left as literal text")
            }
            WarningKind::ColumnMismatch { header, row } => {
                write!(f, "table row has {} cells, header has {}", row, header)
            }
            WarningKind::EmptyTable => write!(f, "table has no body rows"),
        }
    }
}

/// A rendering warning with source location information.
///
/// Rendering never fails; warnings only explain why some markup came out
/// literally or irregularly.
#[derive(Debug, Clone, PartialEq)]
pub struct Warning {
    pub kind: WarningKind,
    pub span: Range<usize>,
    pub file_id: usize,
    pub notes: Vec<String>,
}

impl Warning {
    pub fn new(kind: WarningKind, span: Range<usize>, file_id: usize) -> Self {
        Warning {
            kind,
            span,
            file_id,
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Convert to a codespan-reporting Diagnostic for display.
    pub fn to_diagnostic(&self) -> Diagnostic<usize> {
        Diagnostic::new(Severity::Warning)
            .with_message(self.kind.to_string())
            .with_labels(vec![Label::primary(self.file_id, self.span.clone())])
            .with_notes(self.notes.clone())
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}
