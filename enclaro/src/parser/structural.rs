use std::ops::Range;

use crate::block::{Block, Inline};
use crate::parser::diagnostic::{Warning, WarningKind};
use crate::parser::inline;

const FENCE: &str = "```";

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Scan `source` into blocks. `base` is the byte offset of `source` within the
/// file being rendered, so warning spans point into the full text.
pub(crate) fn scan(
    source: &str,
    base: usize,
    file_id: usize,
    warnings: &mut Vec<Warning>,
) -> Vec<Block> {
    if source.is_empty() {
        return Vec::new();
    }

    let mut state = ScanState {
        file_id,
        blocks: Vec::new(),
        warnings,
    };

    let (segments, unclosed) = split_fences(source, base);
    if let Some(open) = unclosed {
        state.warnings.push(
            Warning::new(WarningKind::UnclosedFence, open..open + FENCE.len(), file_id)
                .with_note("the rest of the text is rendered as ordinary lines"),
        );
    }

    for (k, segment) in segments.iter().enumerate() {
        match segment {
            Segment::Fence { body } => {
                // A fence always sits between two text segments.
                let before = segments[k - 1].text();
                let after = segments[k + 1].text();
                let opens_mid_line = !before.ends_with('\n') && (k > 1 || !before.is_empty());
                let closes_mid_line = !after.is_empty() && !after.starts_with('\n');
                state
                    .blocks
                    .push(code_block(body, opens_mid_line, closes_mid_line));
            }
            Segment::Text { text, start } => {
                let after_fence = k > 0 && segments[k - 1].is_fence();
                let before_fence = segments.get(k + 1).is_some_and(Segment::is_fence);
                let mut lines = lines_with_offsets(text, *start);
                if before_fence && lines.last().is_some_and(|l| l.text.is_empty()) {
                    lines.pop();
                }
                if after_fence && lines.first().is_some_and(|l| l.text.is_empty()) {
                    lines.remove(0);
                }
                for line in lines {
                    state.push_line(line);
                }
            }
        }
    }

    state.blocks
}

/// One line of input with its absolute byte offset.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Line<'a> {
    pub text: &'a str,
    pub start: usize,
}

impl Line<'_> {
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }

    pub fn span(&self) -> Range<usize> {
        self.start..self.end()
    }
}

/// Split on `\n` only; a trailing newline yields a final empty line.
pub(crate) fn lines_with_offsets(text: &str, base: usize) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut start = 0;
    for part in text.split('\n') {
        lines.push(Line {
            text: part,
            start: base + start,
        });
        start += part.len() + 1;
    }
    lines
}

// ---------------------------------------------------------------------------
// Code fences
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum Segment<'a> {
    Text { text: &'a str, start: usize },
    Fence { body: &'a str },
}

impl<'a> Segment<'a> {
    fn is_fence(&self) -> bool {
        matches!(self, Segment::Fence { .. })
    }

    fn text(&self) -> &'a str {
        match self {
            Segment::Text { text, .. } => text,
            Segment::Fence { .. } => "",
        }
    }
}

/// Cut the source at fence pairs. The earliest closing fence wins; an opening
/// fence with no partner stays in the text and its offset is returned.
fn split_fences(source: &str, base: usize) -> (Vec<Segment<'_>>, Option<usize>) {
    let mut segments = Vec::new();
    let mut unclosed = None;
    let mut pos = 0;

    while let Some(open) = source[pos..].find(FENCE).map(|o| pos + o) {
        let body_start = open + FENCE.len();
        let Some(close) = source[body_start..].find(FENCE).map(|c| body_start + c) else {
            unclosed = Some(base + open);
            break;
        };
        segments.push(Segment::Text {
            text: &source[pos..open],
            start: base + pos,
        });
        segments.push(Segment::Fence {
            body: &source[body_start..close],
        });
        pos = close + FENCE.len();
    }

    segments.push(Segment::Text {
        text: &source[pos..],
        start: base + pos,
    });
    (segments, unclosed)
}

/// Build a code block from the text between two fences.
///
/// When the fence opens with a single word on its own line, that word is the
/// language and the body starts on the next line.
fn code_block(body: &str, opens_mid_line: bool, closes_mid_line: bool) -> Block {
    let (language, content) = match body.split_once('\n') {
        Some((first, rest)) if first.trim().is_empty() => (None, rest),
        Some((first, rest)) if !first.trim().contains(char::is_whitespace) => {
            (Some(first.trim().to_string()), rest)
        }
        _ => (None, body),
    };
    let content = content.strip_suffix('\n').unwrap_or(content);
    Block::CodeBlock {
        language,
        content: content.to_string(),
        opens_mid_line,
        closes_mid_line,
    }
}

// ---------------------------------------------------------------------------
// Line classification
// ---------------------------------------------------------------------------

struct ScanState<'w> {
    file_id: usize,
    blocks: Vec<Block>,
    warnings: &'w mut Vec<Warning>,
}

impl ScanState<'_> {
    fn push_line(&mut self, line: Line<'_>) {
        let block = if let Some((level, text)) = heading(line.text) {
            Block::Heading {
                level,
                content: self.inlines(text, line),
            }
        } else if let Some(item) = list_item(line.text) {
            Block::ListItem(self.inlines(item, line))
        } else {
            Block::PlainLine(self.inlines(line.text, line))
        };
        self.blocks.push(block);
    }

    fn inlines(&mut self, text: &str, line: Line<'_>) -> Vec<Inline> {
        let inlines = inline::resolve(text);
        if inlines.iter().any(|i| i.any_text(&|s| s.contains('*'))) {
            self.warnings
                .push(Warning::new(WarningKind::UnmatchedEmphasis, line.span(), self.file_id));
        }
        if inlines.iter().any(|i| i.any_text(&|s| s.contains('`'))) {
            self.warnings
                .push(Warning::new(WarningKind::UnmatchedBacktick, line.span(), self.file_id));
        }
        inlines
    }
}

/// `#` through `######` at column 0, followed by a space.
fn heading(line: &str) -> Option<(u8, &str)> {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    if !(1..=6).contains(&hashes) {
        return None;
    }
    line[hashes..].strip_prefix(' ').map(|text| (hashes as u8, text))
}

/// A trimmed line starting with `- ` or `* `, marker stripped.
fn list_item(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
}
