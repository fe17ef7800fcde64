//! Paged-document export: line classification and PDF rendering.
//!
//! [`paginate`] is a pure walk over the rendered Markdown that maps every
//! line to one rendering rule; [`PdfRenderer`] turns the classified document
//! into PDF bytes with per-page furniture ("AI Research Report" plus page
//! number and generation timestamp on every page).
//!
//! Classification precedence: callout-wrapper lines are dropped, then
//! headings by level, bullets, the lone divider token, blank lines, and
//! finally the default paragraph rule. Lines are stripped of the highlight
//! marker and reduced to Latin-1 (with replacement) before classification,
//! so a non-encodable character can never fail the export.

use crate::error::ExportError;
use crate::render::{CALLOUT_CLOSE, CALLOUT_OPEN};
use chrono::{DateTime, Local};
use genpdf::Element as _;
use genpdf::{Alignment, SimplePageDecorator, elements, fonts, style};

/// Title line drawn on every page of the export.
pub const PAGE_HEADER: &str = "AI Research Report";

/// One classified line of the paged document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineRule {
    /// Top-level heading: 18 pt bold.
    Heading1(String),
    /// Section heading: 15 pt bold.
    Heading2(String),
    /// Sub-heading: 13 pt bold.
    Heading3(String),
    /// Indented bullet item: 11 pt.
    Bullet(String),
    /// Drawn horizontal rule plus vertical spacing.
    Divider,
    /// Fixed vertical spacing.
    Blank,
    /// Default paragraph rule: 11 pt.
    Paragraph(String),
}

impl LineRule {
    /// The canonical Markdown form of this rule, used when re-serializing a
    /// paged document back to plain text.
    pub fn to_markdown(&self) -> String {
        match self {
            LineRule::Heading1(t) => format!("# {t}"),
            LineRule::Heading2(t) => format!("## {t}"),
            LineRule::Heading3(t) => format!("### {t}"),
            LineRule::Bullet(t) => format!("* {t}"),
            LineRule::Divider => "---".to_string(),
            LineRule::Blank => String::new(),
            LineRule::Paragraph(t) => t.clone(),
        }
    }
}

/// Replace every character outside the Latin-1 range, like a lossy
/// single-byte encode.
fn latin1_lossy(text: &str) -> String {
    text.chars()
        .map(|c| if (c as u32) <= 0xFF { c } else { '?' })
        .collect()
}

/// Classify one Markdown line. `None` means the line is dropped entirely
/// (callout wrapper markup has no paged-document counterpart).
pub fn classify_line(line: &str) -> Option<LineRule> {
    if line.contains(CALLOUT_OPEN) || line.contains(CALLOUT_CLOSE) {
        return None;
    }

    let cleaned = line.replace("✨ ", "");
    let cleaned = latin1_lossy(cleaned.trim());

    if cleaned.is_empty() {
        return Some(LineRule::Blank);
    }
    if let Some(rest) = cleaned.strip_prefix("# ") {
        return Some(LineRule::Heading1(rest.trim().to_string()));
    }
    if let Some(rest) = cleaned.strip_prefix("## ") {
        return Some(LineRule::Heading2(rest.trim().to_string()));
    }
    if let Some(rest) = cleaned.strip_prefix("### ") {
        return Some(LineRule::Heading3(rest.trim().to_string()));
    }
    if let Some(rest) = cleaned.strip_prefix("* ") {
        return Some(LineRule::Bullet(rest.trim().to_string()));
    }
    if cleaned == "---" {
        return Some(LineRule::Divider);
    }
    Some(LineRule::Paragraph(cleaned))
}

/// Classify every line of a Markdown document, in order.
pub fn classify_lines(markdown: &str) -> Vec<LineRule> {
    markdown.lines().filter_map(classify_line).collect()
}

/// A report laid out as classified lines, ready for the PDF writer.
#[derive(Debug, Clone)]
pub struct PagedDocument {
    pub lines: Vec<LineRule>,
    /// Shown in the per-page footer line.
    pub generated_at: DateTime<Local>,
}

impl PagedDocument {
    /// Re-serialize the classified lines to plain text.
    pub fn to_plain_text(&self) -> String {
        self.lines
            .iter()
            .map(LineRule::to_markdown)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Walk a Markdown document into a paged document.
pub fn paginate(markdown: &str) -> PagedDocument {
    PagedDocument {
        lines: classify_lines(markdown),
        generated_at: Local::now(),
    }
}

/// Font lookup candidates, tried in order.
const FONT_CANDIDATES: &[(&str, &str)] = &[
    ("/usr/share/fonts/truetype/liberation", "LiberationSans"),
    ("/usr/share/fonts/liberation-sans", "LiberationSans"),
    ("/usr/share/fonts/TTF", "LiberationSans"),
    ("/System/Library/Fonts", "Helvetica"),
    ("/Library/Fonts", "Arial"),
];

/// Renders a [`PagedDocument`] into PDF bytes.
pub struct PdfRenderer;

impl PdfRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Locate a usable sans-serif font family on this system.
    pub fn load_fonts(&self) -> Result<fonts::FontFamily<fonts::FontData>, ExportError> {
        let mut failures = Vec::new();
        for (dir, name) in FONT_CANDIDATES {
            match fonts::from_files(dir, name, None) {
                Ok(family) => return Ok(family),
                Err(e) => failures.push(format!("{dir}/{name}: {e}")),
            }
        }
        Err(ExportError::FontUnavailable {
            message: failures.join("; "),
        })
    }

    /// Render the document. `title` becomes the PDF's document title.
    pub fn render(&self, doc: &PagedDocument, title: &str) -> Result<Vec<u8>, ExportError> {
        let font_family = self.load_fonts()?;

        let mut pdf = genpdf::Document::new(font_family);
        pdf.set_title(title);

        let mut decorator = SimplePageDecorator::new();
        decorator.set_margins(15);
        let timestamp = doc.generated_at.format("%Y-%m-%d %H:%M:%S").to_string();
        decorator.set_header(move |page| {
            let mut header = elements::LinearLayout::vertical();
            header.push(
                elements::Paragraph::new(PAGE_HEADER)
                    .aligned(Alignment::Center)
                    .styled(style::Style::new().bold().with_font_size(12)),
            );
            header.push(
                elements::Paragraph::new(format!("Page {page} | Generated on {timestamp}"))
                    .aligned(Alignment::Center)
                    .styled(style::Style::new().with_font_size(8)),
            );
            header.push(elements::Break::new(1));
            header
        });
        pdf.set_page_decorator(decorator);

        for line in &doc.lines {
            match line {
                LineRule::Heading1(text) => {
                    pdf.push(
                        elements::Paragraph::new(text.clone())
                            .styled(style::Style::new().bold().with_font_size(18)),
                    );
                }
                LineRule::Heading2(text) => {
                    pdf.push(
                        elements::Paragraph::new(text.clone())
                            .styled(style::Style::new().bold().with_font_size(15)),
                    );
                }
                LineRule::Heading3(text) => {
                    pdf.push(
                        elements::Paragraph::new(text.clone())
                            .styled(style::Style::new().bold().with_font_size(13)),
                    );
                }
                LineRule::Bullet(text) => {
                    pdf.push(
                        elements::Paragraph::new(format!("  * {text}"))
                            .styled(style::Style::new().with_font_size(11)),
                    );
                }
                LineRule::Divider => {
                    pdf.push(
                        elements::Paragraph::new("_".repeat(72))
                            .styled(style::Style::new().with_font_size(8)),
                    );
                    pdf.push(elements::Break::new(1));
                }
                LineRule::Blank => {
                    pdf.push(elements::Break::new(1));
                }
                LineRule::Paragraph(text) => {
                    pdf.push(
                        elements::Paragraph::new(text.clone())
                            .styled(style::Style::new().with_font_size(11)),
                    );
                }
            }
        }

        let mut buf = Vec::new();
        pdf.render(&mut buf).map_err(|e| ExportError::RenderFailed {
            message: e.to_string(),
        })?;
        Ok(buf)
    }
}

impl Default for PdfRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::render_markdown;
    use crate::synthesize::{DifferingViewpoints, ResearchReport};

    #[test]
    fn test_classify_headings() {
        assert_eq!(
            classify_line("# Top"),
            Some(LineRule::Heading1("Top".into()))
        );
        assert_eq!(
            classify_line("## Section"),
            Some(LineRule::Heading2("Section".into()))
        );
        assert_eq!(
            classify_line("### Sub"),
            Some(LineRule::Heading3("Sub".into()))
        );
    }

    #[test]
    fn test_classify_callout_wrappers_dropped() {
        assert_eq!(classify_line("<div class=\"highlight-box\">X</div>"), None);
        assert_eq!(classify_line("</div>"), None);
    }

    #[test]
    fn test_classify_bullet_divider_blank_paragraph() {
        assert_eq!(
            classify_line("* item one"),
            Some(LineRule::Bullet("item one".into()))
        );
        assert_eq!(classify_line("---"), Some(LineRule::Divider));
        assert_eq!(classify_line("   "), Some(LineRule::Blank));
        assert_eq!(
            classify_line("plain prose"),
            Some(LineRule::Paragraph("plain prose".into()))
        );
    }

    #[test]
    fn test_highlight_marker_stripped() {
        assert_eq!(
            classify_line("### ✨ Highlighted Finding"),
            Some(LineRule::Heading3("Highlighted Finding".into()))
        );
    }

    #[test]
    fn test_latin1_replacement() {
        assert_eq!(
            classify_line("naïve — résumé 日本"),
            Some(LineRule::Paragraph("naïve ? résumé ??".into()))
        );
    }

    #[test]
    fn test_classification_idempotent_over_reserialization() {
        let report = ResearchReport {
            highlighted_finding: Some("Big news ✨ here.".into()),
            executive_summary: "Summary.".into(),
            key_findings: vec!["First (Source 1).".into(), "Second (Source 2).".into()],
            detailed_analysis: "Analysis with a table:\n\n| a | b |\n|---|---|\n| 1 | 2 |".into(),
            differing_viewpoints: Some(DifferingViewpoints {
                pros: vec!["Pro one.".into()],
                cons: vec!["Con one.".into()],
            }),
            conclusion: "Done.".into(),
            citations: vec!["Doe, J. (2024). Title.".into()],
        };

        let markdown = render_markdown(&report);
        let first = paginate(&markdown);
        let second_lines = classify_lines(&first.to_plain_text());
        assert_eq!(first.lines, second_lines);
    }

    #[test]
    fn test_table_separator_is_not_a_divider() {
        // A table rule row is not the lone divider token.
        assert_eq!(
            classify_line("|---|---|"),
            Some(LineRule::Paragraph("|---|---|".into()))
        );
    }

    #[test]
    fn test_pdf_render_smoke() {
        let renderer = PdfRenderer::new();
        // Rendering requires fonts on the host; skip quietly when absent.
        if renderer.load_fonts().is_err() {
            return;
        }

        let doc = paginate("# Title\n\nBody text.\n\n---\n\n* bullet");
        let bytes = renderer.render(&doc, "Research Report: test").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
