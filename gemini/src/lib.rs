//! Minimal Google Gemini API client.
//!
//! This crate provides a focused client for the `generateContent` endpoint:
//! - Non-streaming text completions
//! - System instructions and generation config
//! - Typed errors for network, API, and parse failures

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Errors that can occur when using the Gemini client.
#[derive(Debug, Error)]
pub enum Error {
    #[error("API key not configured")]
    NoApiKey,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Gemini API client.
#[derive(Clone)]
pub struct Gemini {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl Gemini {
    /// Create a new Gemini client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .connect_timeout(std::time::Duration::from_secs(15))
                .build()
                .expect("Failed to build HTTP client"),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Create a Gemini client from the GEMINI_API_KEY environment variable.
    pub fn from_env() -> Result<Self, Error> {
        let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| Error::NoApiKey)?;
        Ok(Self::new(api_key))
    }

    /// Set the default model for this client.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Send a generation request and return the full response.
    pub async fn generate(&self, request: Request) -> Result<Response, Error> {
        let model = request.model.as_deref().unwrap_or(&self.model);
        let url = format!("{API_BASE}/models/{model}:generateContent");
        let api_request = build_api_request(&request);
        let headers = self.build_headers()?;

        let response = self
            .client
            .post(url)
            .headers(headers)
            .json(&api_request)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status,
                message: body,
            });
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))?;

        Ok(parse_response(api_response))
    }

    fn build_headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| Error::Config(format!("Invalid API key: {e}")))?,
        );
        Ok(headers)
    }
}

// ============================================================================
// Public types
// ============================================================================

/// A generation request to send to Gemini.
#[derive(Debug, Clone)]
pub struct Request {
    pub model: Option<String>,
    pub prompt: String,
    pub system: Option<String>,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

impl Request {
    /// Create a new request with the given prompt text.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            model: None,
            prompt: prompt.into(),
            system: None,
            temperature: None,
            max_output_tokens: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }
}

/// A generation response from Gemini.
#[derive(Debug, Clone)]
pub struct Response {
    pub model: Option<String>,
    pub candidates: Vec<Candidate>,
    pub usage: Usage,
}

impl Response {
    /// Get all text from the first candidate, concatenated.
    ///
    /// Returns an empty string if the response carried no candidates.
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .map(|c| c.parts.join(""))
            .unwrap_or_default()
    }
}

/// A single candidate completion.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub parts: Vec<String>,
    pub finish_reason: FinishReason,
}

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    MaxTokens,
    Safety,
    Other,
}

/// Token usage information.
#[derive(Debug, Clone, Default)]
pub struct Usage {
    pub prompt_tokens: usize,
    pub candidate_tokens: usize,
}

// ============================================================================
// Internal API types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRequest {
    contents: Vec<ApiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<ApiSystemInstruction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<ApiGenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<ApiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct ApiSystemInstruction {
    parts: Vec<ApiPart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<ApiCandidate>,
    #[serde(default)]
    usage_metadata: Option<ApiUsageMetadata>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiCandidate {
    #[serde(default)]
    content: Option<ApiCandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiCandidateContent {
    #[serde(default)]
    parts: Vec<ApiPart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiUsageMetadata {
    #[serde(default)]
    prompt_token_count: usize,
    #[serde(default)]
    candidates_token_count: usize,
}

fn build_api_request(request: &Request) -> ApiRequest {
    ApiRequest {
        contents: vec![ApiContent {
            role: Some("user".to_string()),
            parts: vec![ApiPart {
                text: request.prompt.clone(),
            }],
        }],
        system_instruction: request.system.as_ref().map(|s| ApiSystemInstruction {
            parts: vec![ApiPart { text: s.clone() }],
        }),
        generation_config: if request.temperature.is_some() || request.max_output_tokens.is_some() {
            Some(ApiGenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_output_tokens,
            })
        } else {
            None
        },
    }
}

fn parse_response(api_response: ApiResponse) -> Response {
    let candidates = api_response
        .candidates
        .into_iter()
        .map(|c| Candidate {
            parts: c
                .content
                .map(|content| content.parts.into_iter().map(|p| p.text).collect())
                .unwrap_or_default(),
            finish_reason: match c.finish_reason.as_deref() {
                Some("STOP") | None => FinishReason::Stop,
                Some("MAX_TOKENS") => FinishReason::MaxTokens,
                Some("SAFETY") => FinishReason::Safety,
                Some(_) => FinishReason::Other,
            },
        })
        .collect();

    let usage = api_response
        .usage_metadata
        .map(|u| Usage {
            prompt_tokens: u.prompt_token_count,
            candidate_tokens: u.candidates_token_count,
        })
        .unwrap_or_default();

    Response {
        model: api_response.model_version,
        candidates,
        usage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = Gemini::new("test-key");
        assert_eq!(client.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_client_with_model() {
        let client = Gemini::new("test-key").with_model("gemini-2.0-pro");
        assert_eq!(client.model, "gemini-2.0-pro");
    }

    #[test]
    fn test_request_builder() {
        let request = Request::new("Describe the corridor")
            .with_system("You are a narrator")
            .with_temperature(0.8)
            .with_max_output_tokens(256);

        assert_eq!(request.prompt, "Describe the corridor");
        assert!(request.system.is_some());
        assert_eq!(request.temperature, Some(0.8));
        assert_eq!(request.max_output_tokens, Some(256));
    }

    #[test]
    fn test_request_serialization() {
        let request = Request::new("hello").with_temperature(0.5);
        let api_request = build_api_request(&request);
        let json = serde_json::to_value(&api_request).unwrap();

        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(json["generationConfig"]["temperature"], 0.5);
        assert!(json.get("systemInstruction").is_none());
    }

    #[test]
    fn test_response_parsing() {
        let raw = serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "The airlock hisses open." }] },
                "finishReason": "STOP"
            }],
            "usageMetadata": {
                "promptTokenCount": 12,
                "candidatesTokenCount": 7
            },
            "modelVersion": "gemini-2.5-flash"
        });

        let api_response: ApiResponse = serde_json::from_value(raw).unwrap();
        let response = parse_response(api_response);

        assert_eq!(response.text(), "The airlock hisses open.");
        assert_eq!(response.candidates[0].finish_reason, FinishReason::Stop);
        assert_eq!(response.usage.prompt_tokens, 12);
        assert_eq!(response.usage.candidate_tokens, 7);
        assert_eq!(response.model.as_deref(), Some("gemini-2.5-flash"));
    }

    #[test]
    fn test_empty_response_text() {
        let api_response: ApiResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        let response = parse_response(api_response);
        assert_eq!(response.text(), "");
        assert!(response.candidates.is_empty());
    }

    #[test]
    fn test_candidate_without_content() {
        // Safety-blocked candidates come back with a finish reason but no content.
        let raw = serde_json::json!({
            "candidates": [{ "finishReason": "SAFETY" }]
        });
        let api_response: ApiResponse = serde_json::from_value(raw).unwrap();
        let response = parse_response(api_response);
        assert_eq!(response.text(), "");
        assert_eq!(response.candidates[0].finish_reason, FinishReason::Safety);
    }
}
