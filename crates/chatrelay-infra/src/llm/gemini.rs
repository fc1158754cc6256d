//! GeminiBackend -- [`GenerationBackend`] for the Google Generative Language API.
//!
//! Calls `POST {base_url}/models/{model}:generateContent?key=...` with a
//! single user turn whose text merges the transcript and the question.
//! The API key is a [`SecretString`], exposed only as the `key` query parameter.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use chatrelay_core::backend::GenerationBackend;
use chatrelay_types::error::BackendError;

use super::combine_prompt;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiBackend {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
}

impl GeminiBackend {
    pub fn new(client: reqwest::Client, api_key: SecretString, model: String) -> Self {
        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model,
        }
    }

    /// Override the API root (proxies, regional endpoints).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

impl GenerationBackend for GeminiBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &str, context: &str) -> Result<String, BackendError> {
        let body = GenerateContentRequest::user_text(combine_prompt(prompt, context));

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.expose_secret())])
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Request(format!("Gemini request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), model = %self.model, "Gemini returned an error");
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Deserialization(format!("failed to parse Gemini response: {e}")))?;

        parsed.into_text()
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

impl GenerateContentRequest {
    fn user_text(text: String) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part { text: Some(text) }],
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateContentResponse {
    /// Text parts of the first candidate, concatenated and trimmed.
    fn into_text(self) -> Result<String, BackendError> {
        let text: String = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        let text = text.trim();
        if text.is_empty() {
            return Err(BackendError::EmptyResponse);
        }
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> GeminiBackend {
        GeminiBackend::new(
            reqwest::Client::new(),
            SecretString::from("test-key".to_string()),
            "gemini-1.5-flash".to_string(),
        )
    }

    #[test]
    fn test_endpoint() {
        assert_eq!(
            backend().endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
        let proxied = backend().with_base_url("http://localhost:8080/".to_string());
        assert_eq!(
            proxied.endpoint(),
            "http://localhost:8080/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn test_request_shape() {
        let body = GenerateContentRequest::user_text("hello".to_string());
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"contents": [{"role": "user", "parts": [{"text": "hello"}]}]})
        );
    }

    #[test]
    fn test_response_text_from_first_candidate() {
        let raw = serde_json::json!({
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "A contract "}, {"text": "is an agreement.\n"}]}},
                {"content": {"role": "model", "parts": [{"text": "ignored"}]}}
            ]
        });
        let parsed: GenerateContentResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.into_text().unwrap(), "A contract is an agreement.");
    }

    #[test]
    fn test_no_candidates_is_empty_response() {
        let parsed: GenerateContentResponse =
            serde_json::from_value(serde_json::json!({"promptFeedback": {"blockReason": "SAFETY"}}))
                .unwrap();
        assert!(matches!(parsed.into_text(), Err(BackendError::EmptyResponse)));
    }

    #[test]
    fn test_candidate_without_content_is_empty_response() {
        let parsed: GenerateContentResponse =
            serde_json::from_value(serde_json::json!({"candidates": [{"finishReason": "SAFETY"}]}))
                .unwrap();
        assert!(matches!(parsed.into_text(), Err(BackendError::EmptyResponse)));
    }

    #[test]
    fn test_name_and_model() {
        let b = backend();
        assert_eq!(GenerationBackend::name(&b), "gemini");
        assert_eq!(b.model(), "gemini-1.5-flash");
    }
}
