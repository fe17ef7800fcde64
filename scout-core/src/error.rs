//! Error types for the Scout research pipeline.
//!
//! Uses `thiserror` for public API error types with structured variants
//! covering configuration, search, LLM, synthesis, and export domains.
//! Extraction-tier failures are deliberately absent: the content extractor
//! recovers from them internally and never surfaces an error.

/// Top-level error type for the Scout core library.
#[derive(Debug, thiserror::Error)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    #[error("Synthesis error: {0}")]
    Synthesis(#[from] SynthesisError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from the configuration system.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(
        "API key for {provider} is not configured. Add it to the credential store \
         (`scout keys set {provider}`), a .env file, or the environment"
    )]
    MissingKey { provider: String },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Configuration parse error: {message}")]
    ParseError { message: String },
}

/// Errors from the search provider.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Search request failed: {message}")]
    ApiRequest { message: String },

    #[error("Search response parse error: {message}")]
    ResponseParse { message: String },

    #[error("Search provider rejected the API key")]
    AuthFailed,
}

/// Errors from LLM provider interactions.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("API request failed: {message}")]
    ApiRequest { message: String },

    #[error("API response parse error: {message}")]
    ResponseParse { message: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Response contained no candidates")]
    EmptyResponse,
}

/// Errors from report synthesis.
///
/// A synthesis failure means the whole run produces no report; the caller
/// must not surface a partial one.
#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Report payload is not valid JSON: {message}")]
    InvalidJson { message: String },

    #[error("Report violates the required-field contract: {message}")]
    InvalidReport { message: String },
}

/// Errors from the paged-document (PDF) export.
///
/// Only the PDF action fails on these; the Markdown rendering of the same
/// report stays available.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("No usable font found for PDF rendering: {message}")]
    FontUnavailable { message: String },

    #[error("PDF rendering failed: {message}")]
    RenderFailed { message: String },
}

/// Convenience result type using [`ScoutError`].
pub type Result<T> = std::result::Result<T, ScoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ScoutError::Config(ConfigError::MissingKey {
            provider: "gemini".into(),
        });
        let msg = err.to_string();
        assert!(msg.contains("Configuration error"));
        assert!(msg.contains("gemini"));
    }

    #[test]
    fn test_synthesis_error_from_llm() {
        let err: SynthesisError = LlmError::EmptyResponse.into();
        assert!(matches!(err, SynthesisError::Llm(_)));
    }

    #[test]
    fn test_export_error_display() {
        let err = ExportError::FontUnavailable {
            message: "no system fonts".into(),
        };
        assert!(err.to_string().contains("font"));
    }
}
