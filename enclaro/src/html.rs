//! HTML output.
//!
//! Text is written as is, without escaping: the markup is meant for a
//! display surface that already trusts the analysis backend.

use crate::block::{Block, Document, Inline};

/// Render a document to markup. Line boundaries become `<br>`, except
/// between items of one list and on either side of a table. A code block
/// that shares a line with text is joined to it without a break.
///
/// Newlines inside a code block are not turned into `<br>`: they are written
/// as is inside `<pre><code>`. Callers that strip the `<pre>` wrapper have to
/// translate them themselves.
pub fn to_html(document: &Document) -> String {
    let mut out = String::new();
    write_blocks(&mut out, &document.blocks);
    out
}

fn write_blocks(out: &mut String, blocks: &[Block]) {
    let mut prev: Option<&Block> = None;
    let mut in_list = false;

    for block in blocks {
        let is_item = matches!(block, Block::ListItem(_));
        if in_list && !is_item {
            out.push_str("</ul>");
            in_list = false;
        }
        if prev.is_some_and(|prev| breaks_between(prev, block)) {
            out.push_str("<br>");
        }
        if is_item && !in_list {
            out.push_str("<ul>");
            in_list = true;
        }
        write_block(out, block);
        prev = Some(block);
    }

    if in_list {
        out.push_str("</ul>");
    }
}

fn breaks_between(prev: &Block, next: &Block) -> bool {
    Block::newline_between(prev, next)
        && !matches!(
        (prev, next),
        (Block::Table { .. }, _) | (_, Block::Table { .. }) | (Block::ListItem(_), Block::ListItem(_))
    )
}

fn write_block(out: &mut String, block: &Block) {
    match block {
        Block::CodeBlock {
            language, content, ..
        } => {
            match language {
                Some(lang) => {
                    out.push_str("<pre><code class=\"language-");
                    out.push_str(lang);
                    out.push_str("\">");
                }
                None => out.push_str("<pre><code>"),
            }
            out.push_str(content);
            out.push_str("</code></pre>");
        }
        Block::Heading { level, content } => {
            out.push_str(&format!("<h{}>", level));
            write_inlines(out, content);
            out.push_str(&format!("</h{}>", level));
        }
        Block::ListItem(content) => {
            out.push_str("<li>");
            write_inlines(out, content);
            out.push_str("</li>");
        }
        Block::PlainLine(content) => write_inlines(out, content),
        Block::Table { headers, rows } => {
            out.push_str("<table><thead><tr>");
            for header in headers {
                write_cell(out, "th", header);
            }
            out.push_str("</tr></thead><tbody>");
            for row in rows {
                out.push_str("<tr>");
                for cell in row {
                    write_cell(out, "td", cell);
                }
                out.push_str("</tr>");
            }
            out.push_str("</tbody></table>");
        }
    }
}

fn write_cell(out: &mut String, tag: &str, cell: &Document) {
    out.push_str(&format!("<{}>", tag));
    write_blocks(out, &cell.blocks);
    out.push_str(&format!("</{}>", tag));
}

fn write_inlines(out: &mut String, inlines: &[Inline]) {
    for inline in inlines {
        let (tag, children) = match inline {
            Inline::Text(s) => {
                out.push_str(s);
                continue;
            }
            Inline::Strong(children) => ("strong", children),
            Inline::Emphasis(children) => ("em", children),
            Inline::Code(children) => ("code", children),
        };
        out.push_str(&format!("<{}>", tag));
        write_inlines(out, children);
        out.push_str(&format!("</{}>", tag));
    }
}
