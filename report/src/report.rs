use std::io::{self, Write};

use enclaro::{Document, Parser, Warning, html, plain};
use tracing::debug;

use crate::module::AnalysisModule;
use crate::section::split_sections;

/// A section after rendering.
#[derive(Debug, Clone)]
pub struct RenderedSection {
    pub title: String,
    pub document: Document,
    /// Text offered for copying, for modules that produce replies.
    pub copy_text: Option<String>,
    /// Spans are relative to the raw result the report was built from.
    pub warnings: Vec<Warning>,
}

/// An analysis result split into titled, rendered sections.
#[derive(Debug, Clone)]
pub struct Report {
    pub module: AnalysisModule,
    pub sections: Vec<RenderedSection>,
}

impl Report {
    /// Build a report from a raw analysis result. `file_id` tags warnings
    /// for diagnostic output.
    pub fn build(raw: &str, module: AnalysisModule, file_id: usize) -> Report {
        let sections = split_sections(raw);
        debug!(module = %module, sections = sections.len(), "building report");

        let sections = sections
            .into_iter()
            .enumerate()
            .map(|(index, section)| {
                let parser = Parser::new(&section.body, file_id);
                let tables = module.uses_tables() && section.body.contains('|');
                debug!(title = %section.title, tables, "rendering section");
                let parsed = if tables {
                    parser.parse_tables()
                } else {
                    parser.parse()
                };

                // The first two sections of a reply explain it; the rest are the replies.
                let copy_text = (module.offers_copy() && index >= 2)
                    .then(|| plain::to_plain_text(&parsed.document));

                let warnings = parsed
                    .warnings
                    .into_iter()
                    .map(|mut w| {
                        w.span = w.span.start + section.body_offset..w.span.end + section.body_offset;
                        w
                    })
                    .collect();

                RenderedSection {
                    title: section.title,
                    document: parsed.document,
                    copy_text,
                    warnings,
                }
            })
            .collect();

        Report { module, sections }
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Warning> {
        self.sections.iter().flat_map(|s| s.warnings.iter())
    }
}

/// Write one `result-section` block per section. Titles are written as text.
pub fn write_html(report: &Report, out: &mut dyn Write) -> io::Result<()> {
    for section in &report.sections {
        write!(out, "<div class=\"result-section\">")?;
        write!(out, "<h3>{}</h3>", escape_text(&section.title))?;
        write!(out, "<div>{}</div>", html::to_html(&section.document))?;
        writeln!(out, "</div>")?;
    }
    Ok(())
}

/// Write the report as plain text, each title underlined.
pub fn write_text(report: &Report, out: &mut dyn Write) -> io::Result<()> {
    for (i, section) in report.sections.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        writeln!(out, "{}", section.title)?;
        writeln!(out, "{}", "=".repeat(section.title.chars().count()))?;
        if !section.document.is_empty() {
            writeln!(out, "{}", plain::to_plain_text(&section.document))?;
        }
    }
    Ok(())
}

/// Titles go in as text content, not markup.
fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routine_sections_render_tables() {
        let raw = "1. Plan\nDay | Task\n--|--\nMon | Rest\n2. Notes\nA | B";
        let report = Report::build(raw, AnalysisModule::Routine, 0);
        let mut out = Vec::new();
        write_html(&report, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert_eq!(out.matches("<table>").count(), 1);
        assert!(out.contains("<h3>Notes</h3><div>A | B</div>"));
    }

    #[test]
    fn other_modules_never_render_tables() {
        let raw = "1. Plan\nDay | Task\n--|--\nMon | Rest";
        let report = Report::build(raw, AnalysisModule::Message, 0);
        let mut out = Vec::new();
        write_html(&report, &mut out).unwrap();
        assert!(!String::from_utf8(out).unwrap().contains("<table>"));
    }

    #[test]
    fn response_offers_copy_from_third_section() {
        let raw = "1. Context\nx\n2. Tone\ny\n3. Option A\n**Sure**, see you then.\n4. Option B\nNo thanks.";
        let report = Report::build(raw, AnalysisModule::Response, 0);
        let copies: Vec<_> = report
            .sections
            .iter()
            .map(|s| s.copy_text.as_deref())
            .collect();
        assert_eq!(
            copies,
            vec![None, None, Some("Sure, see you then."), Some("No thanks.")]
        );
    }

    #[test]
    fn warning_spans_are_shifted_to_raw_input() {
        let raw = "1. Title\nok\n2 * 3";
        let report = Report::build(raw, AnalysisModule::Glossary, 7);
        let warning = report.warnings().next().expect("one warning");
        assert_eq!(&raw[warning.span.clone()], "2 * 3");
        assert_eq!(warning.file_id, 7);
    }

    #[test]
    fn titles_are_escaped() {
        let report = Report::build("1. a < b\nbody", AnalysisModule::Decoder, 0);
        let mut out = Vec::new();
        write_html(&report, &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("<h3>a &lt; b</h3>"));
    }

    #[test]
    fn text_output_underlines_titles() {
        let report = Report::build("1. Tone\n*warm*", AnalysisModule::Decoder, 0);
        let mut out = Vec::new();
        write_text(&report, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Tone\n====\nwarm\n");
    }
}
