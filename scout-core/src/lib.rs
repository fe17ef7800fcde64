//! # Scout Core
//!
//! Core library for the Scout research agent. Provides the content
//! extractor, source collector, report synthesizer, report renderers
//! (Markdown and paged PDF), search and LLM provider clients,
//! configuration, and credential storage.

pub mod agent;
pub mod collect;
pub mod config;
pub mod credentials;
pub mod error;
pub mod extract;
pub mod options;
pub mod pdf;
pub mod providers;
pub mod render;
pub mod search;
pub mod synthesize;

// Re-export commonly used types at the crate root.
pub use agent::{ResearchAgent, ResearchCallback, ResearchOutcome};
pub use collect::{CollectedSources, MAX_SOURCES, SourceCollector, SourceMetadata};
pub use config::{LlmConfig, ScoutConfig, SearchConfig, load_config};
pub use credentials::{CredentialStore, InMemoryCredentialStore, KeyringCredentialStore};
pub use error::{Result, ScoutError};
pub use extract::{ContentExtractor, ExtractedContent, Extractor};
pub use options::{Language, Region, SearchFilters, TimeFilter, Tone};
pub use pdf::{PagedDocument, PdfRenderer, paginate};
pub use providers::{GeminiProvider, LlmProvider};
pub use render::render_markdown;
pub use search::{SearchProvider, SearchResult, SerpApiClient};
pub use synthesize::{DifferingViewpoints, ReportSynthesizer, ResearchReport};
