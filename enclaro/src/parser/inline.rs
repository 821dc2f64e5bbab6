use crate::block::Inline;

/// Resolve inline spans in one line of text.
///
/// Three passes run in a fixed order: bold, italic, code. Each pass sees the
/// spans produced by earlier passes as opaque atoms, and also runs inside
/// their children.
pub(crate) fn resolve(text: &str) -> Vec<Inline> {
    if text.is_empty() {
        return Vec::new();
    }
    let nodes = vec![Inline::Text(text.to_string())];
    let nodes = wrap_pass(nodes, "**", Inline::Strong);
    let nodes = wrap_pass(nodes, "*", Inline::Emphasis);
    wrap_pass(nodes, "`", Inline::Code)
}

enum Token {
    Char(char),
    Atom(Inline),
}

fn wrap_pass(nodes: Vec<Inline>, delim: &str, wrap: fn(Vec<Inline>) -> Inline) -> Vec<Inline> {
    let recurse = |children: Vec<Inline>| wrap_pass(children, delim, wrap);

    let mut tokens = Vec::new();
    for node in nodes {
        match node {
            Inline::Text(s) => tokens.extend(s.chars().map(Token::Char)),
            other => tokens.push(Token::Atom(other.map_children(&recurse))),
        }
    }

    let delim: Vec<char> = delim.chars().collect();
    let spans = find_spans(&tokens, &delim);

    let mut out = Vec::new();
    let mut tokens = tokens.into_iter();
    let mut pos = 0;
    for (open, close) in spans {
        out.extend(collect(tokens.by_ref().take(open - pos)));
        let inner: Vec<Token> = tokens
            .by_ref()
            .skip(delim.len())
            .take(close - open - delim.len())
            .collect();
        tokens.by_ref().take(delim.len()).for_each(drop);
        out.push(wrap(collect(inner.into_iter())));
        pos = close + delim.len();
    }
    out.extend(collect(tokens));
    out
}

/// Pair each opening delimiter with the earliest closing one after it.
/// A delimiter with no partner is skipped one character at a time.
fn find_spans(tokens: &[Token], delim: &[char]) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        if delim_at(tokens, i, delim) {
            let close = (i + delim.len()..tokens.len()).find(|&j| delim_at(tokens, j, delim));
            if let Some(j) = close {
                spans.push((i, j));
                i = j + delim.len();
                continue;
            }
        }
        i += 1;
    }

    spans
}

fn delim_at(tokens: &[Token], at: usize, delim: &[char]) -> bool {
    delim.iter().enumerate().all(|(k, d)| {
        matches!(tokens.get(at + k), Some(Token::Char(c)) if c == d)
    })
}

/// Merge runs of characters back into text nodes.
fn collect(tokens: impl Iterator<Item = Token>) -> Vec<Inline> {
    let mut out = Vec::new();
    let mut text = String::new();
    for token in tokens {
        match token {
            Token::Char(c) => text.push(c),
            Token::Atom(node) => {
                if !text.is_empty() {
                    out.push(Inline::Text(std::mem::take(&mut text)));
                }
                out.push(node);
            }
        }
    }
    if !text.is_empty() {
        out.push(Inline::Text(text));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> Inline {
        Inline::Text(s.to_string())
    }

    #[test]
    fn bold_resolves_before_italic() {
        assert_eq!(resolve("**x**"), vec![Inline::Strong(vec![t("x")])]);
    }

    #[test]
    fn italic_wraps_bold_atom() {
        assert_eq!(
            resolve("*a **b** c*"),
            vec![Inline::Emphasis(vec![
                t("a "),
                Inline::Strong(vec![t("b")]),
                t(" c"),
            ])]
        );
    }

    #[test]
    fn code_resolves_after_emphasis() {
        assert_eq!(
            resolve("`a*b*`"),
            vec![Inline::Code(vec![t("a"), Inline::Emphasis(vec![t("b")])])]
        );
    }

    #[test]
    fn earliest_closing_delimiter_wins() {
        assert_eq!(
            resolve("*a* and *b*"),
            vec![
                Inline::Emphasis(vec![t("a")]),
                t(" and "),
                Inline::Emphasis(vec![t("b")]),
            ]
        );
    }

    #[test]
    fn unmatched_marker_stays_literal() {
        assert_eq!(resolve("2 * 3 = 6"), vec![t("2 * 3 = 6")]);
        assert_eq!(resolve("*open"), vec![t("*open")]);
    }

    #[test]
    fn adjacent_markers_make_empty_span() {
        assert_eq!(resolve("a ** b"), vec![t("a "), Inline::Emphasis(vec![]), t(" b")]);
    }

    #[test]
    fn lone_double_star_becomes_empty_emphasis() {
        assert_eq!(resolve("**open"), vec![Inline::Emphasis(vec![]), t("open")]);
    }

    #[test]
    fn triple_star_leaves_stray_markers() {
        assert_eq!(
            resolve("***x***"),
            vec![Inline::Strong(vec![t("*x")]), t("*")]
        );
    }

    #[test]
    fn empty_line_has_no_spans() {
        assert!(resolve("").is_empty());
    }
}
