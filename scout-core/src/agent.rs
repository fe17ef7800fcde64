//! The research agent: one query in, one validated report (or a clean
//! "no sources" outcome) out.
//!
//! Orchestrates the sequential pipeline: search and collect up to three
//! sources, synthesize through the LLM, render Markdown. Each run owns its
//! data end-to-end; the caller holds whatever state survives between runs.

use crate::collect::{CollectedSources, SourceCollector, SourceMetadata};
use crate::error::ScoutError;
use crate::extract::Extractor;
use crate::options::{SearchFilters, Tone};
use crate::providers::LlmProvider;
use crate::render::render_markdown;
use crate::search::SearchProvider;
use crate::synthesize::{ReportSynthesizer, ResearchReport};
use std::sync::Arc;
use tracing::info;

/// Progress notifications for a running pipeline.
pub trait ResearchCallback: Send + Sync {
    /// Called when the run enters a new phase ("searching", "synthesizing").
    fn on_phase_change(&self, phase: &str);
}

/// Result of one research run.
#[derive(Debug, Clone)]
pub enum ResearchOutcome {
    /// The search returned no organic results. Retryable with a different
    /// query or broader filters; no LLM call was made.
    NoSources,
    /// A complete, validated report.
    Report {
        report: ResearchReport,
        markdown: String,
        sources: Vec<SourceMetadata>,
    },
}

/// Wires the collector and synthesizer into a single pipeline.
pub struct ResearchAgent {
    collector: SourceCollector,
    synthesizer: ReportSynthesizer,
}

impl ResearchAgent {
    pub fn new(
        search: Arc<dyn SearchProvider>,
        extractor: Arc<dyn Extractor>,
        llm: Arc<dyn LlmProvider>,
    ) -> Self {
        Self {
            collector: SourceCollector::new(search, extractor),
            synthesizer: ReportSynthesizer::new(llm),
        }
    }

    /// Run the full pipeline once.
    ///
    /// A synthesis failure aborts the run with no report; there is no
    /// partial output.
    pub async fn research(
        &self,
        query: &str,
        filters: &SearchFilters,
        tone: Tone,
        callback: Option<Arc<dyn ResearchCallback>>,
    ) -> Result<ResearchOutcome, ScoutError> {
        info!(query, "Starting research run");

        if let Some(ref cb) = callback {
            cb.on_phase_change("searching");
        }
        let CollectedSources { llm_text, sources } =
            self.collector.collect(query, filters).await?;

        if sources.is_empty() {
            return Ok(ResearchOutcome::NoSources);
        }

        if let Some(ref cb) = callback {
            cb.on_phase_change("synthesizing");
        }
        let report = self.synthesizer.synthesize(query, &llm_text, tone).await?;
        let markdown = render_markdown(&report);

        info!(sources = sources.len(), "Research run complete");
        Ok(ResearchOutcome::Report {
            report,
            markdown,
            sources,
        })
    }
}
