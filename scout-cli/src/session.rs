//! Session state and report export.
//!
//! The session is the single overwritable "last report" slot: every new run
//! clears it wholesale before doing anything else, so a failed run leaves no
//! stale report behind. Nothing persists across process restarts.

use scout_core::{PdfRenderer, ResearchReport, SourceMetadata, paginate};
use std::path::{Path, PathBuf};

/// Per-process session state for the interactive front end.
#[derive(Debug, Default)]
pub struct Session {
    pub current_report: Option<ResearchReport>,
    pub current_sources: Option<Vec<SourceMetadata>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the slot at the start of a run. No merge, no partial update.
    pub fn begin_run(&mut self) {
        self.current_report = None;
        self.current_sources = None;
    }

    /// Store a completed run's results.
    pub fn complete(&mut self, report: ResearchReport, sources: Vec<SourceMetadata>) {
        self.current_report = Some(report);
        self.current_sources = Some(sources);
    }
}

/// File-name stem derived from the query: lowercased, spaces to underscores.
pub fn report_file_stem(query: &str) -> String {
    format!("report_{}", query.replace(' ', "_").to_lowercase())
}

/// Write the Markdown report as UTF-8. Returns the written path.
pub fn export_markdown(dir: &Path, query: &str, markdown: &str) -> std::io::Result<PathBuf> {
    let path = dir.join(format!("{}.md", report_file_stem(query)));
    std::fs::write(&path, markdown)?;
    Ok(path)
}

/// Render and write the paged PDF export. Returns the written path.
///
/// Failures here leave the Markdown export and on-screen report untouched;
/// the caller decides how loudly to complain.
pub fn export_pdf(dir: &Path, query: &str, markdown: &str) -> anyhow::Result<PathBuf> {
    let paged = paginate(markdown);
    let renderer = PdfRenderer::new();
    let bytes = renderer.render(&paged, &format!("Research Report: {query}"))?;

    let path = dir.join(format!("{}.pdf", report_file_stem(query)));
    std::fs::write(&path, bytes)?;
    Ok(path)
}

/// Human-readable source appendix, numbered the way the report cites.
pub fn format_source_details(sources: &[SourceMetadata]) -> String {
    let mut out = String::new();
    for (i, source) in sources.iter().enumerate() {
        out.push_str(&format!("Source {}: {}\n", i + 1, source.title));
        out.push_str(&format!("  {} | {}\n", source.domain, source.link));
        if !source.authors.is_empty() {
            out.push_str(&format!("  Authors: {}\n", source.authors.join(", ")));
        }
        if source.publish_date != "N/A" {
            out.push_str(&format!("  Published: {}\n", source.publish_date));
        }
    }
    out
}
