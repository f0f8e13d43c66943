//! Enrichment backend for OpenAI-compatible chat completions APIs
//!
//! Works with the OpenAI API and local servers exposing the same surface
//! (Ollama, vLLM, LM Studio).

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{Enricher, EnrichmentError};
use crate::util::{truncate_chars, truncate_for_display};

/// Configuration for [`ChatEnricher`]
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Chat completions endpoint
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
    /// Prompts are cut to this many characters
    pub max_input_chars: usize,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: usize,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Chat completions client
#[derive(Debug)]
pub struct ChatEnricher {
    client: Client,
    config: ChatConfig,
}

impl ChatEnricher {
    pub fn new(config: ChatConfig) -> Result<Self, EnrichmentError> {
        info!(
            "Initializing enrichment backend: endpoint={}, model={}",
            config.endpoint, config.model
        );

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(key) = &config.api_key {
            let auth_value = format!("Bearer {}", key);
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&auth_value)
                    .map_err(|e| EnrichmentError::Config(format!("Invalid API key format: {}", e)))?,
            );
        } else if config.endpoint.contains("openai.com") || config.endpoint.contains("azure.com") {
            warn!("No API key provided for {}", config.endpoint);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| EnrichmentError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl Enricher for ChatEnricher {
    async fn enrich(&self, prompt: &str) -> Result<String, EnrichmentError> {
        let prompt = truncate_chars(prompt, self.config.max_input_chars);
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: 0.2,
        };

        debug!(
            "Sending enrichment request to {} ({} chars)",
            self.config.endpoint,
            prompt.len()
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| EnrichmentError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let message = serde_json::from_str::<ErrorResponse>(&error_text)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| truncate_for_display(&error_text, 500));
            return Err(EnrichmentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| EnrichmentError::Request(format!("Failed to parse response: {}", e)))?;

        if let Some(usage) = &body.usage {
            debug!("Enrichment request used {} tokens", usage.total_tokens);
        }

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(EnrichmentError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ChatConfig {
        ChatConfig {
            endpoint: "http://127.0.0.1:9/v1/chat/completions".to_string(),
            api_key: Some("sk-local".to_string()),
            model: "llama3".to_string(),
            timeout_secs: 5,
            max_input_chars: 100,
        }
    }

    #[test]
    fn builds_with_api_key() {
        assert!(ChatEnricher::new(config()).is_ok());
    }

    #[test]
    fn rejects_unencodable_api_key() {
        let mut cfg = config();
        cfg.api_key = Some("bad\nkey".to_string());
        assert!(matches!(ChatEnricher::new(cfg), Err(EnrichmentError::Config(_))));
    }

    #[test]
    fn parses_chat_response() {
        let json = r#"{"choices":[{"message":{"role":"assistant","content":"Industry: Retail"}}],
                       "usage":{"prompt_tokens":10,"completion_tokens":3,"total_tokens":13}}"#;
        let parsed: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("Industry: Retail"));
        assert_eq!(parsed.usage.map(|u| u.total_tokens), Some(13));
    }

    #[test]
    fn request_shape() {
        let request = ChatRequest {
            model: "m",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            temperature: 0.2,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"], "hi");
        assert_eq!(value["model"], "m");
    }
}
