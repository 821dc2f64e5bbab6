//! Plain text output, with all formatting stripped. Used for copy-to-clipboard text.

use crate::block::{Block, Document, Inline};

/// One line per source line; table cells are tab separated.
pub fn to_plain_text(document: &Document) -> String {
    let mut out = String::new();
    let mut prev: Option<&Block> = None;
    for block in &document.blocks {
        if prev.is_some_and(|prev| Block::newline_between(prev, block)) {
            out.push('\n');
        }
        out.push_str(&block_text(block));
        prev = Some(block);
    }
    out
}

fn block_text(block: &Block) -> String {
    match block {
        Block::CodeBlock { content, .. } => content.clone(),
        Block::Heading { content, .. } | Block::ListItem(content) | Block::PlainLine(content) => {
            inline_text(content)
        }
        Block::Table { headers, rows } => {
            let mut lines = vec![row_text(headers)];
            lines.extend(rows.iter().map(|row| row_text(row)));
            lines.join("\n")
        }
    }
}

fn row_text(cells: &[Document]) -> String {
    cells
        .iter()
        .map(|cell| to_plain_text(cell).replace('\n', " "))
        .collect::<Vec<_>>()
        .join("\t")
}

fn inline_text(inlines: &[Inline]) -> String {
    inlines.iter().map(Inline::plain_text).collect()
}
