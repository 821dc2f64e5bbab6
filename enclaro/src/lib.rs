//! Renderer for the markdown subset used in analysis results.
//!
//! Text is scanned into a flat [`Document`] of [`Block`]s, then written out
//! as markup ([`html`]) or plain text ([`plain`]). Scanning never fails;
//! anything it cannot make sense of comes out literally, and the
//! [`parser::Warning`]s in [`Parsed`] say where.

pub mod block;
pub mod html;
pub mod parser;
pub mod plain;

pub use block::{Block, Document, Inline};
pub use parser::{Parsed, Parser, Warning, WarningKind};

/// Render text to markup with line breaks preserved.
pub fn render(source: &str) -> String {
    html::to_html(&Parser::new(source, 0).parse().document)
}

/// Render text to markup, turning the first pipe table found into a table.
pub fn render_tables(source: &str) -> String {
    html::to_html(&Parser::new(source, 0).parse_tables().document)
}
