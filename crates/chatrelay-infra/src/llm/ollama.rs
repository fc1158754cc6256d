//! OllamaBackend -- [`GenerationBackend`] for a local Ollama server.
//!
//! Uses the non-streaming `POST {base_url}/api/generate` endpoint. No
//! authentication.

use serde::{Deserialize, Serialize};

use chatrelay_core::backend::GenerationBackend;
use chatrelay_types::error::BackendError;

use super::combine_prompt;

#[derive(Debug)]
pub struct OllamaBackend {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaBackend {
    pub fn new(client: reqwest::Client, base_url: String, model: String) -> Self {
        Self {
            client,
            base_url,
            model,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }
}

impl GenerationBackend for OllamaBackend {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(&self, prompt: &str, context: &str) -> Result<String, BackendError> {
        let body = GenerateRequest {
            model: &self.model,
            prompt: combine_prompt(prompt, context),
            stream: false,
        };

        let response = self
            .client
            .post(self.endpoint())
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Request(format!("Ollama request to {} failed: {e}", self.base_url)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), model = %self.model, "Ollama returned an error");
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Deserialization(format!("failed to parse Ollama response: {e}")))?;

        parsed.into_text()
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

impl GenerateResponse {
    fn into_text(self) -> Result<String, BackendError> {
        let text = self.response.trim();
        if text.is_empty() {
            return Err(BackendError::EmptyResponse);
        }
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(base_url: &str) -> OllamaBackend {
        OllamaBackend::new(reqwest::Client::new(), base_url.to_string(), "llama3".to_string())
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        assert_eq!(
            backend("http://localhost:11434/").endpoint(),
            "http://localhost:11434/api/generate"
        );
    }

    #[test]
    fn test_request_is_non_streaming() {
        let body = GenerateRequest {
            model: "llama3",
            prompt: "hi".to_string(),
            stream: false,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"model": "llama3", "prompt": "hi", "stream": false})
        );
    }

    #[test]
    fn test_response_field_is_reply() {
        let parsed: GenerateResponse = serde_json::from_value(serde_json::json!({
            "model": "llama3",
            "response": " Negligence is ... \n",
            "done": true
        }))
        .unwrap();
        assert_eq!(parsed.into_text().unwrap(), "Negligence is ...");
    }

    #[test]
    fn test_blank_response_is_empty() {
        let parsed: GenerateResponse =
            serde_json::from_value(serde_json::json!({"done": true})).unwrap();
        assert!(matches!(parsed.into_text(), Err(BackendError::EmptyResponse)));
    }
}
