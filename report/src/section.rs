/// One numbered section of an analysis result, before rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// The first line, with any `N. ` numbering and leading `#`s removed.
    pub title: String,
    /// The remaining lines, trimmed.
    pub body: String,
    /// Byte offset of `body` within the raw result.
    pub body_offset: usize,
}

/// Split a raw result into sections. A section starts at every line whose
/// first two characters are a digit and a dot; blank sections are dropped.
pub fn split_sections(raw: &str) -> Vec<Section> {
    let mut starts = vec![0];
    let mut offset = 0;
    for line in raw.split('\n') {
        if offset > 0 && starts_numbered(line) {
            starts.push(offset);
        }
        offset += line.len() + 1;
    }

    let mut sections = Vec::new();
    for (i, &start) in starts.iter().enumerate() {
        // The newline before the next section belongs to neither.
        let end = starts.get(i + 1).map(|&next| next - 1).unwrap_or(raw.len());
        if let Some(section) = section_at(raw, start, end) {
            sections.push(section);
        }
    }
    sections
}

fn starts_numbered(line: &str) -> bool {
    let bytes = line.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_digit() && bytes[1] == b'.'
}

fn section_at(raw: &str, start: usize, end: usize) -> Option<Section> {
    let chunk = &raw[start..end];
    let lead = chunk.len() - chunk.trim_start().len();
    let trimmed = chunk.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (first, rest, rest_offset) = match trimmed.split_once('\n') {
        Some((first, rest)) => (first, rest, start + lead + first.len() + 1),
        None => (trimmed, "", start + lead + trimmed.len()),
    };

    let body_lead = rest.len() - rest.trim_start().len();
    Some(Section {
        title: clean_title(first),
        body: rest.trim().to_string(),
        body_offset: rest_offset + body_lead,
    })
}

fn clean_title(line: &str) -> String {
    let line = strip_marker(line, |b| b.is_ascii_digit(), Some(b'.'));
    let line = strip_marker(line, |b| b == b'#', None);
    line.trim().to_string()
}

/// Strip a leading run of `is_marker` bytes, an optional terminator, and the
/// whitespace after it. Nothing is stripped unless whitespace follows.
fn strip_marker(line: &str, is_marker: impl Fn(u8) -> bool, terminator: Option<u8>) -> &str {
    let run = line.bytes().take_while(|&b| is_marker(b)).count();
    if run == 0 {
        return line;
    }
    let mut rest = &line[run..];
    if let Some(t) = terminator {
        match rest.as_bytes().first() {
            Some(&b) if b == t => rest = &rest[1..],
            _ => return line,
        }
    }
    let after = rest.trim_start();
    if after.len() == rest.len() {
        return line;
    }
    after
}
