pub mod diagnostic;
mod inline;
mod structural;
mod table;

pub use diagnostic::{Warning, WarningKind};

use crate::block::Document;

/// The result of scanning: the blocks, plus any degradations noticed on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    pub document: Document,
    pub warnings: Vec<Warning>,
}

/// Parser entry point.
pub struct Parser<'a> {
    source: &'a str,
    file_id: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, file_id: usize) -> Self {
        Parser { source, file_id }
    }

    /// Scan line by line: fences, headings, list items and plain lines.
    pub fn parse(&self) -> Parsed {
        let mut warnings = Vec::new();
        let blocks = structural::scan(self.source, 0, self.file_id, &mut warnings);
        Parsed {
            document: Document { blocks },
            warnings,
        }
    }

    /// Like [`Parser::parse`], but first looks for a pipe table. Text before
    /// and after the table is scanned with the plain rules.
    pub fn parse_tables(&self) -> Parsed {
        let mut warnings = Vec::new();
        let blocks = table::scan(self.source, self.file_id, &mut warnings);
        Parsed {
            document: Document { blocks },
            warnings,
        }
    }
}
