use crate::block::{Block, Document};
use crate::parser::diagnostic::{Warning, WarningKind};
use crate::parser::structural::{self, Line, lines_with_offsets};

/// Scan `source` for one pipe table; everything around it goes through the
/// line scanner.
pub(crate) fn scan(source: &str, file_id: usize, warnings: &mut Vec<Warning>) -> Vec<Block> {
    let lead = source.len() - source.trim_start().len();
    let trimmed = source.trim();
    let trimmed_end = lead + trimmed.len();
    let lines = lines_with_offsets(trimmed, lead);

    let Some(start) = find_table_start(&lines) else {
        return structural::scan(source, 0, file_id, warnings);
    };

    let mut blocks = Vec::new();

    if start > 0 {
        let intro = &source[lines[0].start..lines[start - 1].end()];
        let intro_lead = intro.len() - intro.trim_start().len();
        let intro = intro.trim();
        if !intro.is_empty() {
            blocks.extend(structural::scan(
                intro,
                lines[0].start + intro_lead,
                file_id,
                warnings,
            ));
        }
    }

    let header_line = lines[start];
    let headers = cells(header_line, file_id, warnings);

    // The separator row at `start + 1` is never rendered.
    let mut rows = Vec::new();
    let mut rest = Vec::new();
    for line in &lines[start + 2..] {
        if !line.text.contains('|') {
            if line.text.trim().is_empty() {
                continue;
            }
            rest = structural::scan(
                &source[line.start..trimmed_end],
                line.start,
                file_id,
                warnings,
            );
            break;
        }
        let row = cells(*line, file_id, warnings);
        if row.len() != headers.len() {
            warnings.push(Warning::new(
                WarningKind::ColumnMismatch {
                    header: headers.len(),
                    row: row.len(),
                },
                line.span(),
                file_id,
            ));
        }
        rows.push(row);
    }

    if rows.is_empty() {
        warnings.push(Warning::new(
            WarningKind::EmptyTable,
            header_line.span(),
            file_id,
        ));
    }

    blocks.push(Block::Table { headers, rows });
    blocks.extend(rest);
    blocks
}

/// The first line holding a pipe whose successor holds both a pipe and a dash.
fn find_table_start(lines: &[Line<'_>]) -> Option<usize> {
    lines.windows(2).position(|pair| {
        pair[0].text.contains('|') && pair[1].text.contains('|') && pair[1].text.contains('-')
    })
}

/// Split a row on pipes, dropping blank segments. Each cell is scanned on its own.
fn cells(line: Line<'_>, file_id: usize, warnings: &mut Vec<Warning>) -> Vec<Document> {
    let mut out = Vec::new();
    let mut offset = line.start;
    for segment in line.text.split('|') {
        let cell = segment.trim();
        if !cell.is_empty() {
            let cell_start = offset + (segment.len() - segment.trim_start().len());
            out.push(Document {
                blocks: structural::scan(cell, cell_start, file_id, warnings),
            });
        }
        offset += segment.len() + 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Inline;

    fn scan_all(source: &str) -> (Vec<Block>, Vec<Warning>) {
        let mut warnings = Vec::new();
        let blocks = scan(source, 0, &mut warnings);
        (blocks, warnings)
    }

    fn cell(s: &str) -> Document {
        Document {
            blocks: vec![Block::PlainLine(vec![Inline::Text(s.to_string())])],
        }
    }

    #[test]
    fn detects_first_pipe_and_dash_pair() {
        let lines = lines_with_offsets("x\n| a |\n|---|\n| 1 |", 0);
        assert_eq!(find_table_start(&lines), Some(1));
    }

    #[test]
    fn header_without_separator_is_not_a_table() {
        let lines = lines_with_offsets("a | b\nc | d", 0);
        assert_eq!(find_table_start(&lines), None);
    }

    #[test]
    fn leading_and_trailing_pipes_are_dropped() {
        let (blocks, warnings) = scan_all("| A | B |\n|---|---|\n| 1 | 2 |");
        assert!(warnings.is_empty());
        assert_eq!(
            blocks,
            vec![Block::Table {
                headers: vec![cell("A"), cell("B")],
                rows: vec![vec![cell("1"), cell("2")]],
            }]
        );
    }

    #[test]
    fn blank_line_inside_table_is_skipped() {
        let (blocks, _) = scan_all("A | B\n--|--\n1 | 2\n\n3 | 4\nafter");
        assert_eq!(blocks.len(), 2);
        let Block::Table { rows, .. } = &blocks[0] else {
            panic!("expected a table, got {:?}", blocks[0]);
        };
        assert_eq!(rows.len(), 2);
        assert_eq!(blocks[1], Block::PlainLine(vec![Inline::Text("after".into())]));
    }

    #[test]
    fn ragged_rows_are_kept_and_warned() {
        let (blocks, warnings) = scan_all("A | B | C\n--|--|--\n1 | 2");
        let Block::Table { rows, .. } = &blocks[0] else {
            panic!("expected a table");
        };
        assert_eq!(rows[0].len(), 2);
        assert_eq!(
            warnings[0].kind,
            WarningKind::ColumnMismatch { header: 3, row: 2 }
        );
        assert_eq!(warnings[0].span, 19..24);
    }

    #[test]
    fn table_without_rows_is_warned() {
        let (blocks, warnings) = scan_all("A | B\n--|--");
        assert_eq!(
            blocks,
            vec![Block::Table {
                headers: vec![cell("A"), cell("B")],
                rows: vec![],
            }]
        );
        assert_eq!(warnings[0].kind, WarningKind::EmptyTable);
    }

    #[test]
    fn cell_warning_points_at_cell() {
        let (_, warnings) = scan_all("A | B\n--|--\n1 | 2 * 3");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::UnmatchedEmphasis);
        assert_eq!(warnings[0].span, 16..21);
    }
}
