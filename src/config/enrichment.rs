//! AI enrichment backend configuration

use serde::{Deserialize, Serialize};

/// Environment variables consulted for the API key, in order
pub const API_KEY_ENV_VARS: &[&str] = &["JOBSCOUT_AI_API_KEY", "OPENAI_API_KEY"];

/// Enrichment configuration
///
/// ```toml
/// [enrichment]
/// enabled = true
/// endpoint = "https://api.openai.com/v1/chat/completions"
/// model = "gpt-4o-mini"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// Call the enrichment backend at all
    pub enabled: bool,
    /// OpenAI-compatible chat completions endpoint
    pub endpoint: Option<String>,
    /// Model name sent with each request
    pub model: String,
    /// API key (falls back to the environment)
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Description text beyond this many characters is not sent
    pub max_input_chars: usize,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: None,
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            timeout_secs: 60,
            max_input_chars: 12_000,
        }
    }
}

impl EnrichmentConfig {
    /// Endpoint to use, or `None` when enrichment is off or unconfigured
    pub fn active_endpoint(&self) -> Option<&str> {
        if !self.enabled {
            return None;
        }
        self.endpoint.as_deref().filter(|e| !e.trim().is_empty())
    }

    /// API key from the config file or the environment
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key.clone().or_else(|| {
            API_KEY_ENV_VARS
                .iter()
                .find_map(|name| std::env::var(name).ok())
                .filter(|key| !key.is_empty())
        })
    }
}
