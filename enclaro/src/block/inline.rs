use std::fmt;

/// Inline spans inside a line, heading, list item or table cell.
///
/// Code spans hold inline children because they are resolved after
/// emphasis: `` `a*b*` `` keeps the emphasis inside the code.
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Text(String),
    Strong(Vec<Inline>),
    Emphasis(Vec<Inline>),
    Code(Vec<Inline>),
}

impl Inline {
    /// Concatenated text with all span markers removed.
    pub fn plain_text(&self) -> String {
        match self {
            Inline::Text(s) => s.clone(),
            Inline::Strong(children) | Inline::Emphasis(children) | Inline::Code(children) => {
                children.iter().map(Inline::plain_text).collect()
            }
        }
    }

    /// Rebuild this span with `f` applied to its children. Text is returned as is.
    pub(crate) fn map_children(self, f: &impl Fn(Vec<Inline>) -> Vec<Inline>) -> Inline {
        match self {
            Inline::Text(s) => Inline::Text(s),
            Inline::Strong(children) => Inline::Strong(f(children)),
            Inline::Emphasis(children) => Inline::Emphasis(f(children)),
            Inline::Code(children) => Inline::Code(f(children)),
        }
    }

    /// Whether any text run, at any depth, satisfies `pred`.
    pub(crate) fn any_text(&self, pred: &impl Fn(&str) -> bool) -> bool {
        match self {
            Inline::Text(s) => pred(s),
            Inline::Strong(children) | Inline::Emphasis(children) | Inline::Code(children) => {
                children.iter().any(|c| c.any_text(pred))
            }
        }
    }
}

impl fmt::Display for Inline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (delim, children) = match self {
            Inline::Text(s) => return write!(f, "{}", s),
            Inline::Strong(children) => ("**", children),
            Inline::Emphasis(children) => ("*", children),
            Inline::Code(children) => ("`", children),
        };
        write!(f, "{}", delim)?;
        for child in children {
            write!(f, "{}", child)?;
        }
        write!(f, "{}", delim)
    }
}
