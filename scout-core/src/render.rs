//! Markdown rendering of a synthesized report.
//!
//! A pure transform: sections appear in fixed order and only when their
//! field is present and non-empty. The highlighted finding is wrapped in a
//! callout block the paged export later strips; populated body sections are
//! separated by a horizontal divider.

use crate::synthesize::ResearchReport;

/// Marker wrapping the highlighted finding in the Markdown output.
pub const CALLOUT_OPEN: &str = "<div class=\"highlight-box\">";
pub const CALLOUT_CLOSE: &str = "</div>";

/// Render a validated report into a Markdown document.
pub fn render_markdown(report: &ResearchReport) -> String {
    let mut md: Vec<String> = Vec::new();

    if let Some(finding) = &report.highlighted_finding
        && !finding.is_empty()
    {
        md.push("### ✨ Highlighted Finding".to_string());
        md.push(format!("{CALLOUT_OPEN}{finding}{CALLOUT_CLOSE}"));
    }

    if !report.executive_summary.is_empty() {
        md.push("## Executive Summary".to_string());
        md.push(report.executive_summary.clone());
        md.push("\n---\n".to_string());
    }

    if !report.key_findings.is_empty() {
        md.push("## Key Findings".to_string());
        for finding in &report.key_findings {
            md.push(format!("* {finding}"));
        }
        md.push("\n---\n".to_string());
    }

    if !report.detailed_analysis.is_empty() {
        md.push("## Detailed Analysis".to_string());
        md.push(report.detailed_analysis.clone());
        md.push("\n---\n".to_string());
    }

    if let Some(viewpoints) = &report.differing_viewpoints
        && !viewpoints.is_empty()
    {
        md.push("## Pros & Cons / Differing Viewpoints".to_string());
        if !viewpoints.pros.is_empty() {
            md.push("### Pros".to_string());
            for pro in &viewpoints.pros {
                md.push(format!("* {pro}"));
            }
        }
        if !viewpoints.cons.is_empty() {
            md.push("### Cons".to_string());
            for con in &viewpoints.cons {
                md.push(format!("* {con}"));
            }
        }
        md.push("\n---\n".to_string());
    }

    if !report.conclusion.is_empty() {
        md.push("## Conclusion".to_string());
        md.push(report.conclusion.clone());
        md.push("\n---\n".to_string());
    }

    if !report.citations.is_empty() {
        md.push("## Citations (APA 7th Edition)".to_string());
        for citation in &report.citations {
            md.push(format!("* {citation}"));
        }
    }

    md.join("\n")
}
