//! Report synthesis: schema-constrained LLM call and strict validation.
//!
//! The synthesizer owns the fixed prompt contract (instruction block + tone
//! directive + query + aggregated source text) and the response schema. The
//! provider must return a JSON document matching [`ResearchReport`]; anything
//! else is a [`SynthesisError`] for the whole run, never a partial report.

use crate::error::SynthesisError;
use crate::options::Tone;
use crate::providers::LlmProvider;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// Fixed instruction block for every synthesis call.
const MASTER_PROMPT: &str = r#"
You are a world-class AI research analyst. Your task is to produce a high-quality, multi-faceted research report by populating a structured JSON object. Analyze the user's query and the provided web content to do this.

**Instructions:**
-   **Highlight:** First, identify the single most impactful, surprising, or recent finding from the content. Populate the 'highlighted_finding' field with this insight. It must be a concise, direct statement.
-   **Analyze:** Carefully analyze all provided content, which includes full article text and metadata. Synthesize information critically and objectively.
-   **Cite Rigorously:** For each point in 'key_findings', 'detailed_analysis', and 'differing_viewpoints', you MUST cite the source number in parentheses, like this: (Source 1).
-   **Format Citations:** Populate the 'citations' array with APA 7th Edition formatted citations for all sources. Use the provided metadata for this.
-   **Use Tables:** If the content allows for a direct comparison, embed a Markdown table within the 'detailed_analysis' string.
-   **Handle Viewpoints:** If pros and cons are not applicable, return empty arrays for them.
"#;

/// Opposing viewpoints. Both lists may legitimately be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifferingViewpoints {
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
}

impl DifferingViewpoints {
    pub fn is_empty(&self) -> bool {
        self.pros.is_empty() && self.cons.is_empty()
    }
}

/// The LLM's structured answer for one research run.
///
/// The four required String fields plus `key_findings` and `citations` must
/// be present and non-null for the object to be valid; the two `Option`
/// fields may be absent, which means "omit this section" downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlighted_finding: Option<String>,
    pub executive_summary: String,
    pub key_findings: Vec<String>,
    pub detailed_analysis: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub differing_viewpoints: Option<DifferingViewpoints>,
    pub conclusion: String,
    pub citations: Vec<String>,
}

/// The response-schema constraint sent with every synthesis call, in the
/// provider's schema dialect.
pub fn response_schema() -> Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "highlighted_finding": {"type": "STRING"},
            "executive_summary": {"type": "STRING"},
            "key_findings": {
                "type": "ARRAY",
                "items": {"type": "STRING"}
            },
            "detailed_analysis": {"type": "STRING"},
            "differing_viewpoints": {
                "type": "OBJECT",
                "properties": {
                    "pros": {"type": "ARRAY", "items": {"type": "STRING"}},
                    "cons": {"type": "ARRAY", "items": {"type": "STRING"}}
                }
            },
            "conclusion": {"type": "STRING"},
            "citations": {
                "type": "ARRAY",
                "items": {"type": "STRING"}
            }
        },
        "required": [
            "executive_summary",
            "key_findings",
            "detailed_analysis",
            "conclusion",
            "citations"
        ]
    })
}

/// Parse and validate a raw response payload into a report.
pub fn parse_report(payload: &str) -> Result<ResearchReport, SynthesisError> {
    let value: Value =
        serde_json::from_str(payload).map_err(|e| SynthesisError::InvalidJson {
            message: e.to_string(),
        })?;

    serde_json::from_value(value).map_err(|e| SynthesisError::InvalidReport {
        message: e.to_string(),
    })
}

/// Builds the prompt contract and drives the LLM collaborator.
pub struct ReportSynthesizer {
    provider: Arc<dyn LlmProvider>,
}

impl ReportSynthesizer {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    /// The ordered prompt segments for one synthesis call.
    fn prompt_parts(query: &str, llm_text: &str, tone: Tone) -> Vec<String> {
        let toned_prompt = format!(
            "{MASTER_PROMPT}\n**Tone Requirement:** The tone of the entire report must be **{}**.",
            tone.as_str()
        );
        vec![
            toned_prompt,
            format!("**User Query:** {query}"),
            "**Research Content:**".to_string(),
            llm_text.to_string(),
        ]
    }

    /// Run one synthesis. Fails if the LLM call fails or the response does
    /// not satisfy the [`ResearchReport`] contract; never retries.
    pub async fn synthesize(
        &self,
        query: &str,
        llm_text: &str,
        tone: Tone,
    ) -> Result<ResearchReport, SynthesisError> {
        let parts = Self::prompt_parts(query, llm_text, tone);
        let schema = response_schema();

        let payload = self.provider.generate_structured(&parts, &schema).await?;
        let report = parse_report(&payload)?;

        info!(
            findings = report.key_findings.len(),
            citations = report.citations.len(),
            "Synthesized report"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use async_trait::async_trait;

    pub(crate) fn minimal_report_json() -> String {
        serde_json::json!({
            "executive_summary": "Summary.",
            "key_findings": ["Finding one (Source 1)."],
            "detailed_analysis": "Analysis (Source 2).",
            "conclusion": "Conclusion.",
            "citations": ["Doe, J. (2024). Title. https://example.com"]
        })
        .to_string()
    }

    struct StubProvider {
        payload: Result<String, LlmError>,
    }

    #[async_trait]
    impl LlmProvider for StubProvider {
        async fn generate_structured(
            &self,
            _parts: &[String],
            _schema: &Value,
        ) -> Result<String, LlmError> {
            match &self.payload {
                Ok(p) => Ok(p.clone()),
                Err(_) => Err(LlmError::EmptyResponse),
            }
        }
    }

    #[test]
    fn test_parse_minimal_report() {
        let report = parse_report(&minimal_report_json()).unwrap();
        assert!(report.highlighted_finding.is_none());
        assert!(report.differing_viewpoints.is_none());
        assert_eq!(report.key_findings.len(), 1);
    }

    #[test]
    fn test_parse_rejects_non_json() {
        let err = parse_report("I could not produce JSON, sorry.").unwrap_err();
        assert!(matches!(err, SynthesisError::InvalidJson { .. }));
    }

    #[test]
    fn test_parse_rejects_missing_required_field() {
        let payload = serde_json::json!({
            "key_findings": [],
            "detailed_analysis": "a",
            "conclusion": "b",
            "citations": []
        })
        .to_string();
        let err = parse_report(&payload).unwrap_err();
        assert!(matches!(err, SynthesisError::InvalidReport { .. }));
    }

    #[test]
    fn test_parse_rejects_null_required_field() {
        let payload = serde_json::json!({
            "executive_summary": null,
            "key_findings": [],
            "detailed_analysis": "a",
            "conclusion": "b",
            "citations": []
        })
        .to_string();
        assert!(parse_report(&payload).is_err());
    }

    #[test]
    fn test_viewpoints_with_missing_lists_default_empty() {
        let payload = serde_json::json!({
            "executive_summary": "s",
            "key_findings": [],
            "detailed_analysis": "a",
            "differing_viewpoints": {},
            "conclusion": "c",
            "citations": []
        })
        .to_string();
        let report = parse_report(&payload).unwrap();
        assert!(report.differing_viewpoints.unwrap().is_empty());
    }

    #[test]
    fn test_prompt_parts_shape() {
        let parts = ReportSynthesizer::prompt_parts("my query", "Source 1: ...", Tone::Academic);
        assert_eq!(parts.len(), 4);
        assert!(parts[0].contains("world-class AI research analyst"));
        assert!(parts[0].contains("**Academic**"));
        assert!(parts[1].contains("my query"));
        assert_eq!(parts[2], "**Research Content:**");
        assert_eq!(parts[3], "Source 1: ...");
    }

    #[test]
    fn test_response_schema_required_fields() {
        let schema = response_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert_eq!(
            required,
            vec![
                "executive_summary",
                "key_findings",
                "detailed_analysis",
                "conclusion",
                "citations"
            ]
        );
        assert!(schema["properties"]["highlighted_finding"].is_object());
    }

    #[tokio::test]
    async fn test_synthesize_surfaces_invalid_json() {
        let synthesizer = ReportSynthesizer::new(Arc::new(StubProvider {
            payload: Ok("not json".to_string()),
        }));
        let err = synthesizer
            .synthesize("q", "", Tone::Professional)
            .await
            .unwrap_err();
        assert!(matches!(err, SynthesisError::InvalidJson { .. }));
    }

    #[tokio::test]
    async fn test_synthesize_wraps_llm_error() {
        let synthesizer = ReportSynthesizer::new(Arc::new(StubProvider {
            payload: Err(LlmError::EmptyResponse),
        }));
        let err = synthesizer
            .synthesize("q", "", Tone::Professional)
            .await
            .unwrap_err();
        assert!(matches!(err, SynthesisError::Llm(_)));
    }
}
