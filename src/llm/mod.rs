//! LLM adapter for response generation
//!
//! Generation sits behind this adapter so the rest of the crate never sees
//! provider wire formats. Response bodies vary between providers and
//! versions, so text extraction runs an ordered list of strategies and
//! stops at the first non-empty hit.

use reqwest::Client;
use serde_json::json;
use serde_json::Value;
use tracing::debug;

use crate::errors::CounselRagError;
use crate::errors::Result;

/// Supported generation providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    /// Gemini `generateContent` API
    Gemini,
    /// Ollama `/api/generate`
    Ollama,
}

/// Service for generating chat responses
pub struct LlmService {
    provider: LlmProvider,
    model: String,
    endpoint: String,
    api_key: String,
    client: Client,
}

impl LlmService {
    /// Create a new LLM service from the application config
    pub fn new(config: &crate::config::AppConfig) -> Result<Self> {
        // The "ollama" key sentinel selects the local provider, mirroring
        // the embedding provider convention
        let provider = if config.llm_key() == "ollama" {
            LlmProvider::Ollama
        } else {
            LlmProvider::Gemini
        };

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .map_err(|e| CounselRagError::Http(e.to_string()))?;

        Ok(Self {
            provider,
            model: config.llm_model().to_string(),
            endpoint: config.llm_endpoint().to_string(),
            api_key: config.llm_key().to_string(),
            client,
        })
    }

    /// Generate a response with custom sampling parameters
    ///
    /// # Errors
    /// Generation has no silent degradation: API failures, rate limits, and
    /// unparseable responses all propagate.
    pub async fn generate_with_params(
        &self,
        prompt: &str,
        temperature: f32,
        max_tokens: usize,
    ) -> Result<String> {
        let body = match self.provider {
            LlmProvider::Gemini => json!({
                "contents": [{ "parts": [{ "text": prompt }] }],
                "generationConfig": {
                    "temperature": temperature,
                    "maxOutputTokens": max_tokens,
                },
            }),
            LlmProvider::Ollama => json!({
                "model": self.model,
                "prompt": prompt,
                "stream": false,
                "options": {
                    "temperature": temperature,
                    "num_predict": max_tokens,
                },
            }),
        };

        let url = match self.provider {
            LlmProvider::Gemini => format!(
                "{}/models/{}:generateContent?key={}",
                self.endpoint, self.model, self.api_key
            ),
            LlmProvider::Ollama => format!("{}/api/generate", self.endpoint),
        };
        debug!("Calling generation API: model {}", self.model);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| CounselRagError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(CounselRagError::Llm(format!(
                "Generation API error ({status}): {error_text}"
            )));
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| CounselRagError::Llm(format!("Failed to parse response: {e}")))?;

        extract_response_text(&value)
            .ok_or_else(|| CounselRagError::Llm("No text in generation response".to_string()))
    }

    /// Generate a response with default parameters
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_with_params(prompt, 0.7, 2000).await
    }
}

/// Pull the generated text out of a provider response body
///
/// Strategies are tried in order; the first non-empty extraction wins:
/// 1. Gemini: `candidates[0].content.parts[*].text` (parts concatenated)
/// 2. Ollama generate: top-level `response`
/// 3. Ollama chat: `message.content`
/// 4. OpenAI-compatible: `choices[0].message.content`
/// 5. Bare `text` field
#[must_use]
pub fn extract_response_text(value: &Value) -> Option<String> {
    let strategies: [fn(&Value) -> Option<String>; 5] = [
        extract_gemini_candidates,
        |v| v.get("response").and_then(Value::as_str).map(str::to_string),
        |v| {
            v.get("message")
                .and_then(|m| m.get("content"))
                .and_then(Value::as_str)
                .map(str::to_string)
        },
        |v| {
            v.get("choices")
                .and_then(|c| c.get(0))
                .and_then(|c| c.get("message"))
                .and_then(|m| m.get("content"))
                .and_then(Value::as_str)
                .map(str::to_string)
        },
        |v| v.get("text").and_then(Value::as_str).map(str::to_string),
    ];

    strategies
        .iter()
        .filter_map(|strategy| strategy(value))
        .map(|text| text.trim().to_string())
        .find(|text| !text.is_empty())
}

fn extract_gemini_candidates(value: &Value) -> Option<String> {
    let parts = value
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;

    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();

    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_gemini_shape() {
        let value = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Hello " }, { "text": "there" }] }
            }]
        });
        assert_eq!(extract_response_text(&value).unwrap(), "Hello there");
    }

    #[test]
    fn test_extracts_ollama_generate_shape() {
        let value = json!({ "model": "gemma", "response": "A warm reply" });
        assert_eq!(extract_response_text(&value).unwrap(), "A warm reply");
    }

    #[test]
    fn test_extracts_openai_compatible_shape() {
        let value = json!({
            "choices": [{ "message": { "content": "compat reply" } }]
        });
        assert_eq!(extract_response_text(&value).unwrap(), "compat reply");
    }

    #[test]
    fn test_empty_candidates_fall_through_to_next_strategy() {
        let value = json!({
            "candidates": [{ "content": { "parts": [] } }],
            "text": "fallback"
        });
        assert_eq!(extract_response_text(&value).unwrap(), "fallback");
    }

    #[test]
    fn test_no_text_anywhere_is_none() {
        let value = json!({ "usage": { "tokens": 42 } });
        assert!(extract_response_text(&value).is_none());
    }
}
