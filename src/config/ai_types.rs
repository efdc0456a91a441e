// AI configuration type definitions

use serde::Deserialize;

/// Default completion endpoint
fn default_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

/// Default model for completion requests
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

/// Default max tokens for a completion (kept short for inline display)
fn default_max_tokens() -> u32 {
    150
}

/// Default sampling temperature (low, for deterministic continuations)
fn default_temperature() -> f32 {
    0.2
}

/// Default debounce delay in milliseconds
fn default_debounce_ms() -> u64 {
    1000
}

/// Default maximum number of cached prompts
fn default_cache_max_size() -> usize {
    128
}

/// Default time-to-live for cache entries, in seconds
fn default_cache_ttl_seconds() -> u64 {
    300
}

/// Default maximum number of retries after a 429 response
fn default_max_retries() -> u32 {
    3
}

/// AI suggestion configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// API key (falls back to the OPENAI_API_KEY environment variable)
    pub api_key: Option<String>,
    /// Completion endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Model to request completions from
    #[serde(default = "default_model")]
    pub model: String,
    /// Maximum tokens in a completion
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Debounce delay in milliseconds before making API requests
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Maximum number of cached prompts
    #[serde(default = "default_cache_max_size")]
    pub cache_max_size: usize,
    /// Time-to-live for cache entries, in seconds
    #[serde(default = "default_cache_ttl_seconds")]
    pub cache_ttl_seconds: u64,
    /// Maximum retries after rate-limited responses
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for AiConfig {
    fn default() -> Self {
        AiConfig {
            api_key: None,
            endpoint: default_endpoint(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            debounce_ms: default_debounce_ms(),
            cache_max_size: default_cache_max_size(),
            cache_ttl_seconds: default_cache_ttl_seconds(),
            max_retries: default_max_retries(),
        }
    }
}
