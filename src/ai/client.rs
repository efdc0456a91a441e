//! Completion API client
//!
//! Builds the request payload, performs the network call, interprets status
//! codes, retries on rate limiting, and consults/populates the suggestion
//! cache. Expected failures never surface as hard errors: every fetch
//! resolves to a [`SuggestionResult`] so the UI stays usable.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};

use super::cache::SuggestionCache;
use crate::config::AiConfig;
use crate::error::AssistError;

/// Fixed wait before retrying a rate-limited request
const RATE_LIMIT_BACKOFF: Duration = Duration::from_secs(5);

/// Why a fetch resolved without a suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// HTTP 429, retries exhausted
    RateLimited,
    /// Any other non-success HTTP status
    Upstream,
    /// Connection error, timeout, or unreadable response
    Transport,
}

/// Outcome of a suggestion fetch
///
/// Failures carry their kind and a human-readable detail; `Display` renders
/// them as `Error: <detail>`, matching what the panel shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestionResult {
    Success(String),
    Failure { kind: FailureKind, detail: String },
}

impl SuggestionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, SuggestionResult::Success(_))
    }
}

impl fmt::Display for SuggestionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuggestionResult::Success(text) => write!(f, "{}", text),
            SuggestionResult::Failure { detail, .. } => write!(f, "Error: {}", detail),
        }
    }
}

/// Outcome of one HTTP attempt; rate limiting is separated out so the retry
/// loop can react to it without inspecting final results.
enum Attempt {
    Success(String),
    RateLimited(String),
    Failed(SuggestionResult),
}

type SharedFetch = Shared<BoxFuture<'static, SuggestionResult>>;

#[derive(Clone)]
struct ClientInner {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    max_retries: u32,
    backoff: Duration,
    cache: SuggestionCache,
}

/// Client for the completion endpoint
///
/// Cheap to clone; clones share the HTTP connection pool, the cache, and the
/// in-flight request map. Construction fails fast when no credential is
/// configured, so a client in hand is always usable.
#[derive(Clone)]
pub struct SuggestionClient {
    inner: Arc<ClientInner>,
    /// One shared future per in-flight prompt; concurrent fetches for the
    /// same prompt await the same network call.
    pending: Arc<Mutex<HashMap<String, SharedFetch>>>,
}

impl SuggestionClient {
    /// Create a client from configuration.
    ///
    /// The API key comes from the config file, falling back to the
    /// `OPENAI_API_KEY` environment variable. Missing credential is a
    /// construction-time error, never a call-time one.
    pub fn new(config: &AiConfig, cache: SuggestionCache) -> Result<Self, AssistError> {
        let api_key = resolve_api_key(
            config.api_key.as_deref(),
            std::env::var("OPENAI_API_KEY").ok(),
        )?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http: reqwest::Client::new(),
                endpoint: config.endpoint.clone(),
                api_key,
                model: config.model.clone(),
                max_tokens: config.max_tokens,
                temperature: config.temperature,
                max_retries: config.max_retries,
                backoff: RATE_LIMIT_BACKOFF,
                cache,
            }),
            pending: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// Override the retry policy. Tests use this to shorten the backoff.
    pub fn with_retry_policy(mut self, max_retries: u32, backoff: Duration) -> Self {
        let inner = Arc::make_mut(&mut self.inner);
        inner.max_retries = max_retries;
        inner.backoff = backoff;
        self
    }

    /// Fetch a suggestion for `prompt`.
    ///
    /// Consults the cache first; on a miss, joins any in-flight fetch for the
    /// same prompt or issues a new request. Rate-limited responses are
    /// retried with a fixed backoff up to the configured maximum.
    pub async fn fetch_suggestion(&self, prompt: &str) -> SuggestionResult {
        if let Some(hit) = self.inner.cache.get(prompt) {
            log::debug!("Cache hit for prompt");
            return SuggestionResult::Success(hit);
        }

        let fetch = {
            let mut pending = self.pending.lock().expect("pending map lock poisoned");
            match pending.get(prompt) {
                Some(fetch) => {
                    log::debug!("Joining in-flight request for identical prompt");
                    fetch.clone()
                }
                None => {
                    let inner = Arc::clone(&self.inner);
                    let owned = prompt.to_string();
                    let fetch: SharedFetch =
                        async move { fetch_remote(inner, owned).await }.boxed().shared();
                    pending.insert(prompt.to_string(), fetch.clone());
                    fetch
                }
            }
        };

        let result = fetch.await;
        self.pending
            .lock()
            .expect("pending map lock poisoned")
            .remove(prompt);
        result
    }
}

impl fmt::Debug for SuggestionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuggestionClient")
            .field("endpoint", &self.inner.endpoint)
            .field("model", &self.inner.model)
            .finish()
    }
}

fn resolve_api_key(
    configured: Option<&str>,
    env_value: Option<String>,
) -> Result<String, AssistError> {
    configured
        .map(str::to_string)
        .filter(|k| !k.trim().is_empty())
        .or(env_value.filter(|k| !k.trim().is_empty()))
        .ok_or(AssistError::MissingApiKey)
}

/// The full fetch-with-retry loop for one prompt.
///
/// Each retry restarts from the cache consult, so a response that landed in
/// the cache during the backoff wait is honored without another call.
async fn fetch_remote(inner: Arc<ClientInner>, prompt: String) -> SuggestionResult {
    let mut attempts: u32 = 0;
    loop {
        if attempts > 0
            && let Some(hit) = inner.cache.get(&prompt)
        {
            return SuggestionResult::Success(hit);
        }

        match send_once(&inner, &prompt).await {
            Attempt::Success(text) => {
                inner.cache.set(&prompt, &text);
                log::debug!("Suggestion fetched and cached");
                return SuggestionResult::Success(text);
            }
            Attempt::RateLimited(detail) => {
                if attempts >= inner.max_retries {
                    log::warn!("Rate limited, retries exhausted after {} attempts", attempts + 1);
                    return SuggestionResult::Failure {
                        kind: FailureKind::RateLimited,
                        detail,
                    };
                }
                attempts += 1;
                log::debug!(
                    "Rate limited, retrying in {:?} ({}/{})",
                    inner.backoff,
                    attempts,
                    inner.max_retries
                );
                tokio::time::sleep(inner.backoff).await;
            }
            Attempt::Failed(result) => return result,
        }
    }
}

/// One HTTP round trip: build the payload, send it, interpret the status.
async fn send_once(inner: &ClientInner, prompt: &str) -> Attempt {
    let payload = serde_json::json!({
        "model": inner.model,
        "messages": [{ "role": "user", "content": prompt }],
        "max_tokens": inner.max_tokens,
        "temperature": inner.temperature,
        "n": 1,
        "stop": serde_json::Value::Null,
    });

    let response = match inner
        .http
        .post(&inner.endpoint)
        .header("Content-Type", "application/json")
        .header("Authorization", format!("Bearer {}", inner.api_key))
        .json(&payload)
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => {
            log::error!("API request failed: {}", e);
            return Attempt::Failed(SuggestionResult::Failure {
                kind: FailureKind::Transport,
                detail: e.to_string(),
            });
        }
    };

    let status = response.status();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let body = response.text().await.unwrap_or_default();
        return Attempt::RateLimited(format!("{} - {}", status.as_u16(), body));
    }

    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        log::error!("API request failed with status {}: {}", status.as_u16(), body);
        return Attempt::Failed(SuggestionResult::Failure {
            kind: FailureKind::Upstream,
            detail: format!("{} - {}", status.as_u16(), body),
        });
    }

    let json: serde_json::Value = match response.json().await {
        Ok(json) => json,
        Err(e) => {
            log::error!("Failed to read API response: {}", e);
            return Attempt::Failed(SuggestionResult::Failure {
                kind: FailureKind::Transport,
                detail: e.to_string(),
            });
        }
    };

    // Missing fields degrade to an empty suggestion, as the endpoint
    // occasionally returns empty choices for short prompts.
    let text = json
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(|content| content.as_str())
        .unwrap_or("")
        .trim()
        .to_string();

    Attempt::Success(text)
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod client_tests;
