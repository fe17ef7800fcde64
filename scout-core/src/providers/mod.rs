//! LLM provider interface and implementations.
//!
//! The synthesizer needs exactly one operation from its collaborator: take a
//! list of prompt segments plus a response-schema constraint and return a
//! JSON text payload. [`LlmProvider`] captures that seam; the production
//! implementation talks to the Google Gemini API.

pub mod gemini;

use crate::error::LlmError;
use async_trait::async_trait;
use serde_json::Value;

pub use gemini::GeminiProvider;

/// A schema-constrained structured-output LLM.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Run one completion constrained to the given response schema.
    ///
    /// `parts` are concatenated in order into the prompt. The return value is
    /// the raw response text, which the caller parses and validates against
    /// its own contract.
    async fn generate_structured(
        &self,
        parts: &[String],
        response_schema: &Value,
    ) -> Result<String, LlmError>;
}
