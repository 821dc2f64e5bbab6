pub mod inline;

use std::fmt;

pub use inline::Inline;

/// A rendered analysis result: a flat sequence of blocks in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn empty() -> Self {
        Document { blocks: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// One renderable unit of output.
///
/// Consecutive `ListItem`s form an implicit unordered list. Every other
/// boundary between blocks is a line break in the source, unless
/// [`Block::newline_between`] says a code block shared the line.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Fenced code, verbatim. `language` is the info word on the opening fence.
    /// The `*_mid_line` flags are set when text shares the fence's line, so no
    /// line break separates the code from that text.
    CodeBlock {
        language: Option<String>,
        content: String,
        opens_mid_line: bool,
        closes_mid_line: bool,
    },
    Heading {
        level: u8,
        content: Vec<Inline>,
    },
    ListItem(Vec<Inline>),
    PlainLine(Vec<Inline>),
    /// Every cell went through the line renderer, so cells are documents.
    Table {
        headers: Vec<Document>,
        rows: Vec<Vec<Document>>,
    },
}

impl Block {
    /// Whether the source had a newline between `prev` and `next`.
    pub fn newline_between(prev: &Block, next: &Block) -> bool {
        !matches!(
            prev,
            Block::CodeBlock {
                closes_mid_line: true,
                ..
            }
        ) && !matches!(
            next,
            Block::CodeBlock {
                opens_mid_line: true,
                ..
            }
        )
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut prev: Option<&Block> = None;
        for block in &self.blocks {
            if prev.is_some_and(|prev| Block::newline_between(prev, block)) {
                writeln!(f)?;
            }
            write!(f, "{}", block)?;
            prev = Some(block);
        }
        Ok(())
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Block::CodeBlock {
                language, content, ..
            } => {
                write!(f, "```")?;
                if let Some(lang) = language {
                    write!(f, "{}", lang)?;
                }
                writeln!(f)?;
                writeln!(f, "{}", content)?;
                write!(f, "```")
            }
            Block::Heading { level, content } => {
                for _ in 0..*level {
                    write!(f, "#")?;
                }
                write!(f, " ")?;
                write_inlines(f, content)
            }
            Block::ListItem(content) => {
                write!(f, "- ")?;
                write_inlines(f, content)
            }
            Block::PlainLine(content) => write_inlines(f, content),
            Block::Table { headers, rows } => {
                write_row(f, headers)?;
                writeln!(f)?;
                write!(f, "|")?;
                for _ in headers {
                    write!(f, "---|")?;
                }
                for row in rows {
                    writeln!(f)?;
                    write_row(f, row)?;
                }
                Ok(())
            }
        }
    }
}

fn write_inlines(f: &mut fmt::Formatter<'_>, inlines: &[Inline]) -> fmt::Result {
    for inline in inlines {
        write!(f, "{}", inline)?;
    }
    Ok(())
}

fn write_row(f: &mut fmt::Formatter<'_>, cells: &[Document]) -> fmt::Result {
    write!(f, "|")?;
    for cell in cells {
        write!(f, " {} |", cell)?;
    }
    Ok(())
}
