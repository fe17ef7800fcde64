//! Source collection: search, per-source extraction, and prompt assembly.
//!
//! One collector invocation issues a single search request, takes the first
//! [`MAX_SOURCES`] organic results, runs the content extractor on each, and
//! produces both the aggregated text blob handed to the LLM and the ordered
//! source-metadata list rendered in the report appendix.
//!
//! The 1-based `Source <n>` numbers embedded in the text blob are the only
//! linkage between prompt content and the "(Source n)" citation markers the
//! synthesizer asks for; they always match the position of the source in the
//! returned metadata sequence.

use crate::error::SearchError;
use crate::extract::Extractor;
use crate::options::SearchFilters;
use crate::search::SearchProvider;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Fixed cap on sources per research run.
pub const MAX_SOURCES: usize = 3;

/// Metadata for one selected source, kept for the lifetime of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    pub title: String,
    pub link: String,
    /// Host component of `link`, or `"N/A"` when the link is missing or
    /// unparsable.
    pub domain: String,
    pub authors: Vec<String>,
    /// ISO `YYYY-MM-DD`, or `"N/A"`.
    pub publish_date: String,
}

/// The collector's output: LLM-ready text plus the ordered source list.
#[derive(Debug, Clone, Default)]
pub struct CollectedSources {
    pub llm_text: String,
    pub sources: Vec<SourceMetadata>,
}

impl CollectedSources {
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// Derive the display domain from a source link.
fn domain_of(link: &str) -> String {
    if link == "N/A" {
        return "N/A".to_string();
    }
    url::Url::parse(link)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
        .unwrap_or_else(|| "N/A".to_string())
}

/// Searches, selects, and extracts the sources for one research run.
pub struct SourceCollector {
    search: Arc<dyn SearchProvider>,
    extractor: Arc<dyn Extractor>,
}

impl SourceCollector {
    pub fn new(search: Arc<dyn SearchProvider>, extractor: Arc<dyn Extractor>) -> Self {
        Self { search, extractor }
    }

    /// Run one collection pass.
    ///
    /// Zero search results is a valid outcome (`CollectedSources::is_empty`),
    /// not an error; fewer than [`MAX_SOURCES`] hits just means fewer blocks.
    pub async fn collect(
        &self,
        query: &str,
        filters: &SearchFilters,
    ) -> Result<CollectedSources, SearchError> {
        let results = self.search.search(query, filters).await?;
        if results.is_empty() {
            info!(query, "Search returned no organic results");
            return Ok(CollectedSources::default());
        }

        let mut blocks = Vec::new();
        let mut sources = Vec::new();

        for (i, result) in results.into_iter().take(MAX_SOURCES).enumerate() {
            let source_num = i + 1;
            debug!(source_num, link = result.link, "Extracting source");

            let content = self.extractor.extract(&result.link, &result.snippet).await;

            let authors_line = if content.authors.is_empty() {
                "N/A".to_string()
            } else {
                content.authors.join(", ")
            };

            blocks.push(format!(
                "Source {source_num}:\nTitle: {title}\nLink: {link}\nAuthors: {authors}\n\
                 Publish Date: {date}\nExtracted Content: {text}\n",
                title = result.title,
                link = result.link,
                authors = authors_line,
                date = content.publish_date,
                text = content.text,
            ));

            sources.push(SourceMetadata {
                domain: domain_of(&result.link),
                title: result.title,
                link: result.link,
                authors: content.authors,
                publish_date: content.publish_date,
            });
        }

        info!(count = sources.len(), "Collected sources");
        Ok(CollectedSources {
            llm_text: blocks.join("\n---\n"),
            sources,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ExtractedContent;
    use crate::options::SearchFilters;
    use crate::search::SearchResult;
    use async_trait::async_trait;

    struct StubSearch {
        results: Vec<SearchResult>,
    }

    #[async_trait]
    impl SearchProvider for StubSearch {
        async fn search(
            &self,
            _query: &str,
            _filters: &SearchFilters,
        ) -> Result<Vec<SearchResult>, SearchError> {
            Ok(self.results.clone())
        }
    }

    struct StubExtractor;

    #[async_trait]
    impl Extractor for StubExtractor {
        async fn extract(&self, url: &str, _snippet: &str) -> ExtractedContent {
            ExtractedContent {
                text: format!("content of {url}"),
                authors: vec!["A. Author".to_string()],
                publish_date: "2024-01-01".to_string(),
            }
        }
    }

    fn make_result(n: usize) -> SearchResult {
        SearchResult {
            title: format!("Title {n}"),
            link: format!("https://example{n}.com/page"),
            snippet: format!("snippet {n}"),
        }
    }

    fn make_collector(results: Vec<SearchResult>) -> SourceCollector {
        SourceCollector::new(
            Arc::new(StubSearch { results }),
            Arc::new(StubExtractor),
        )
    }

    #[tokio::test]
    async fn test_numbering_matches_metadata_order() {
        let collector = make_collector(vec![make_result(1), make_result(2), make_result(3)]);
        let collected = collector
            .collect("q", &SearchFilters::default())
            .await
            .unwrap();

        assert_eq!(collected.sources.len(), 3);
        for (i, source) in collected.sources.iter().enumerate() {
            let marker = format!("Source {}:\nTitle: {}", i + 1, source.title);
            assert!(
                collected.llm_text.contains(&marker),
                "missing block for source {}",
                i + 1
            );
        }
        // Blocks appear in order.
        let pos1 = collected.llm_text.find("Source 1:").unwrap();
        let pos2 = collected.llm_text.find("Source 2:").unwrap();
        let pos3 = collected.llm_text.find("Source 3:").unwrap();
        assert!(pos1 < pos2 && pos2 < pos3);
    }

    #[tokio::test]
    async fn test_caps_at_three_sources() {
        let collector = make_collector((1..=6).map(make_result).collect());
        let collected = collector
            .collect("q", &SearchFilters::default())
            .await
            .unwrap();

        assert_eq!(collected.sources.len(), MAX_SOURCES);
        assert!(!collected.llm_text.contains("Source 4:"));
    }

    #[tokio::test]
    async fn test_zero_results_is_empty_not_error() {
        let collector = make_collector(vec![]);
        let collected = collector
            .collect("q", &SearchFilters::default())
            .await
            .unwrap();

        assert!(collected.is_empty());
        assert_eq!(collected.llm_text, "");
        assert!(collected.sources.is_empty());
    }

    #[tokio::test]
    async fn test_fewer_than_cap_is_fine() {
        let collector = make_collector(vec![make_result(1), make_result(2)]);
        let collected = collector
            .collect("q", &SearchFilters::default())
            .await
            .unwrap();
        assert_eq!(collected.sources.len(), 2);
    }

    #[tokio::test]
    async fn test_block_format() {
        let collector = make_collector(vec![make_result(1)]);
        let collected = collector
            .collect("q", &SearchFilters::default())
            .await
            .unwrap();

        let expected = "Source 1:\nTitle: Title 1\nLink: https://example1.com/page\n\
                        Authors: A. Author\nPublish Date: 2024-01-01\n\
                        Extracted Content: content of https://example1.com/page\n";
        assert_eq!(collected.llm_text, expected);
    }

    #[test]
    fn test_domain_of() {
        assert_eq!(domain_of("https://www.example.com/a/b"), "www.example.com");
        assert_eq!(domain_of("N/A"), "N/A");
        assert_eq!(domain_of("not a url"), "N/A");
    }
}
