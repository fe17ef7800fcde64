//! Google Gemini API provider implementation.
//!
//! Implements [`LlmProvider`] for the native Google Gemini API.
//!
//! Notable Gemini API details:
//! - Auth via `?key=API_KEY` query parameter (not header-based)
//! - Structured output via `generationConfig.responseMimeType` +
//!   `generationConfig.responseSchema`
//! - The response payload lives in `candidates[0].content.parts[*].text`

use crate::config::LlmConfig;
use crate::error::LlmError;
use crate::providers::LlmProvider;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

/// The default Google Gemini API base URL.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google Gemini API provider.
pub struct GeminiProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    max_output_tokens: usize,
    temperature: f32,
}

impl GeminiProvider {
    /// Create a new Gemini provider with an explicitly provided API key.
    ///
    /// The key is resolved externally (credential store first, environment
    /// second) before this constructor runs.
    pub fn new_with_key(config: &LlmConfig, api_key: String) -> Result<Self, LlmError> {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| LlmError::ApiRequest {
                message: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url,
            api_key,
            model: config.model.clone(),
            max_output_tokens: config.max_output_tokens,
            temperature: config.temperature,
        })
    }

    /// Build the JSON request body for a structured-output completion.
    fn build_request_body(&self, parts: &[String], response_schema: &Value) -> Value {
        let contents: Vec<Value> = vec![serde_json::json!({
            "role": "user",
            "parts": parts.iter().map(|p| serde_json::json!({"text": p})).collect::<Vec<_>>(),
        })];

        serde_json::json!({
            "contents": contents,
            "generationConfig": {
                "maxOutputTokens": self.max_output_tokens,
                "temperature": self.temperature,
                "responseMimeType": "application/json",
                "responseSchema": response_schema,
            },
        })
    }

    /// Build the endpoint URL for a Gemini API call; the key rides along as
    /// a `?key=` query parameter.
    fn endpoint_url(&self, method: &str) -> String {
        format!(
            "{}/models/{}:{}?key={}",
            self.base_url, self.model, method, self.api_key
        )
    }

    /// Map an HTTP status code to the appropriate `LlmError`.
    fn map_http_error(status: reqwest::StatusCode, body_text: &str) -> LlmError {
        match status.as_u16() {
            401 | 403 => LlmError::AuthFailed {
                provider: "Gemini".to_string(),
            },
            429 => LlmError::RateLimited {
                retry_after_secs: 30,
            },
            _ => LlmError::ApiRequest {
                message: format!("HTTP {status} from Gemini API: {body_text}"),
            },
        }
    }

    /// Concatenated text of the first candidate's parts.
    fn parse_response_text(response: &Value) -> Result<String, LlmError> {
        let candidates = response["candidates"]
            .as_array()
            .filter(|c| !c.is_empty())
            .ok_or(LlmError::EmptyResponse)?;

        let parts = candidates[0]["content"]["parts"]
            .as_array()
            .ok_or(LlmError::EmptyResponse)?;

        let text: String = parts
            .iter()
            .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
            .collect();

        if text.is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(text)
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn generate_structured(
        &self,
        parts: &[String],
        response_schema: &Value,
    ) -> Result<String, LlmError> {
        let body = self.build_request_body(parts, response_schema);
        let url = self.endpoint_url("generateContent");

        debug!(model = self.model.as_str(), "Sending Gemini completion request");

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::ApiRequest {
                message: format!("Request to Gemini API failed: {e}"),
            })?;

        let status = response.status();
        let body_text = response.text().await.map_err(|e| LlmError::ResponseParse {
            message: format!("Failed to read response body: {e}"),
        })?;

        if !status.is_success() {
            return Err(Self::map_http_error(status, &body_text));
        }

        let response_json: Value =
            serde_json::from_str(&body_text).map_err(|e| LlmError::ResponseParse {
                message: format!("Invalid JSON in response: {e}"),
            })?;

        Self::parse_response_text(&response_json)
    }
}
