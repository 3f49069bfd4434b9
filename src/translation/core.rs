/*!
 * Core LLM service implementation.
 *
 * `TranslationService` dispatches a system/user prompt pair to the configured
 * provider, retries transient failures with exponential backoff, paces
 * requests to the provider's rate limit and keeps a running token tally.
 */

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::{debug, warn};
use parking_lot::Mutex;
use std::time::{Duration, Instant};
use url::Url;

use crate::app_config::{TranslationConfig, TranslationProvider as ConfigTranslationProvider};
use crate::errors::ProviderError;
use crate::providers::anthropic::{Anthropic, AnthropicRequest};
use crate::providers::ollama::{ChatRequest, Ollama};
use crate::providers::openai::{OpenAI, OpenAIRequest};
use crate::providers::Provider;

/// Anything that can answer a prompt pair with raw text
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete_prompt(&self, system_prompt: &str, user_prompt: &str) -> Result<String, ProviderError>;
}

/// Token usage statistics for tracking API consumption
#[derive(Clone, Debug)]
pub struct TokenUsageStats {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
    /// Number of successful requests
    pub requests: u64,
    /// Total time spent on API requests
    pub api_duration: Duration,
    pub provider: String,
    pub model: String,
}

impl TokenUsageStats {
    /// Create new token usage stats with provider info
    pub fn with_provider_info(provider: String, model: String) -> Self {
        Self {
            prompt_tokens: 0,
            completion_tokens: 0,
            total_tokens: 0,
            requests: 0,
            api_duration: Duration::from_secs(0),
            provider,
            model,
        }
    }

    /// Record one successful request
    pub fn add_token_usage(&mut self, prompt_tokens: Option<u64>, completion_tokens: Option<u64>, duration: Duration) {
        if let Some(pt) = prompt_tokens {
            self.prompt_tokens += pt;
            self.total_tokens += pt;
        }

        if let Some(ct) = completion_tokens {
            self.completion_tokens += ct;
            self.total_tokens += ct;
        }

        self.requests += 1;
        self.api_duration += duration;
    }

    /// Generate a summary of token usage
    pub fn summary(&self) -> String {
        format!(
            "Token usage ({} / {}): {} requests, {} prompt + {} completion = {} tokens, {:.1}s API time",
            self.provider,
            self.model,
            self.requests,
            self.prompt_tokens,
            self.completion_tokens,
            self.total_tokens,
            self.api_duration.as_secs_f64()
        )
    }
}

/// Normalize an endpoint into a base URL with scheme, host and port
pub fn parse_endpoint(endpoint: &str) -> Result<String> {
    if endpoint.trim().is_empty() {
        return Err(anyhow!("Endpoint cannot be empty"));
    }

    let url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        Url::parse(endpoint)?
    } else {
        Url::parse(&format!("http://{}", endpoint))?
    };

    let host = url.host_str()
        .ok_or_else(|| anyhow!("Invalid host in endpoint: {}", endpoint))?;
    let port = url.port_or_known_default()
        .ok_or_else(|| anyhow!("Invalid port in endpoint: {}", endpoint))?;
    let path = url.path().trim_end_matches('/');

    Ok(format!("{}://{}:{}{}", url.scheme(), host, port, path))
}

/// Output token cap per request
pub fn max_tokens_for_model(model: &str) -> u32 {
    match model {
        m if m.starts_with("gpt-4o") || m.starts_with("gpt-4.1") => 16384,
        m if m.starts_with("gpt-3.5-turbo") => 4096,
        m if m.starts_with("claude-3-5") => 8192,
        m if m.starts_with("claude-3") => 4096,
        _ => 4096,
    }
}

/// Spaces requests out to a requests-per-minute limit
#[derive(Debug)]
struct RequestPacer {
    interval: Option<Duration>,
    next_slot: Mutex<Instant>,
}

impl RequestPacer {
    fn new(rate_limit: Option<u32>) -> Self {
        Self {
            interval: rate_limit
                .filter(|rpm| *rpm > 0)
                .map(|rpm| Duration::from_millis(60_000 / u64::from(rpm))),
            next_slot: Mutex::new(Instant::now()),
        }
    }

    async fn wait_turn(&self) {
        let Some(interval) = self.interval else {
            return;
        };

        let wait = {
            let mut next_slot = self.next_slot.lock();
            let now = Instant::now();
            let slot = (*next_slot).max(now);
            *next_slot = slot + interval;
            slot - now
        };

        if !wait.is_zero() {
            debug!("Rate limit: waiting {:?} before next request", wait);
            tokio::time::sleep(wait).await;
        }
    }
}

/// Provider implementation variants
#[derive(Debug)]
enum TranslationProviderImpl {
    Ollama { client: Ollama },
    OpenAI { client: OpenAI },
    /// LM Studio local server (OpenAI-compatible)
    LMStudio { client: OpenAI },
    Anthropic { client: Anthropic },
}

/// Config-driven LLM service
#[derive(Debug)]
pub struct TranslationService {
    provider: TranslationProviderImpl,

    /// Configuration for the translation service
    pub config: TranslationConfig,

    pacer: RequestPacer,
    usage: Mutex<TokenUsageStats>,
}

impl TranslationService {
    /// Create a new translation service with the given configuration
    pub fn new(config: TranslationConfig) -> Result<Self> {
        let timeout_secs = config.get_timeout_secs();

        let provider = match config.provider {
            ConfigTranslationProvider::Ollama => {
                let base_url = parse_endpoint(&config.get_endpoint())?;
                TranslationProviderImpl::Ollama {
                    client: Ollama::new(base_url, timeout_secs),
                }
            }
            ConfigTranslationProvider::OpenAI => TranslationProviderImpl::OpenAI {
                client: OpenAI::new(config.get_api_key(), config.get_endpoint(), timeout_secs),
            },
            ConfigTranslationProvider::LMStudio => {
                // LM Studio often doesn't require an API key; use a default if empty
                let api_key = {
                    let k = config.get_api_key();
                    if k.is_empty() { "lm-studio".to_string() } else { k }
                };
                TranslationProviderImpl::LMStudio {
                    client: OpenAI::new(api_key, parse_endpoint(&config.get_endpoint())?, timeout_secs),
                }
            }
            ConfigTranslationProvider::Anthropic => TranslationProviderImpl::Anthropic {
                client: Anthropic::new(config.get_api_key(), config.get_endpoint(), timeout_secs),
            },
        };

        let usage = TokenUsageStats::with_provider_info(
            config.provider.display_name().to_string(),
            config.get_model(),
        );

        Ok(Self {
            provider,
            pacer: RequestPacer::new(config.get_rate_limit()),
            usage: Mutex::new(usage),
            config,
        })
    }

    /// Snapshot of the token usage so far
    pub fn token_usage(&self) -> TokenUsageStats {
        self.usage.lock().clone()
    }

    /// Send a short prompt to check that the provider answers
    pub async fn test_connection(&self) -> Result<(), ProviderError> {
        self.send_once("You are a connection test.", "Reply with: OK").await.map(|_| ())
    }

    async fn send_once(&self, system_prompt: &str, user_prompt: &str) -> Result<String, ProviderError> {
        self.pacer.wait_turn().await;

        let model = self.config.get_model();
        let temperature = self.config.common.temperature;
        let max_tokens = max_tokens_for_model(&model);
        let start_time = Instant::now();

        let (text, (prompt_tokens, completion_tokens)) = match &self.provider {
            TranslationProviderImpl::Ollama { client } => {
                let request = ChatRequest::new(model)
                    .add_message("system", system_prompt)
                    .add_message("user", user_prompt)
                    .temperature(temperature);
                let response = client.complete(request).await?;
                (Ollama::extract_text(&response), Ollama::token_usage(&response))
            }
            TranslationProviderImpl::OpenAI { client } | TranslationProviderImpl::LMStudio { client } => {
                let request = OpenAIRequest::new(model)
                    .add_message("system", system_prompt)
                    .add_message("user", user_prompt)
                    .temperature(temperature)
                    .max_tokens(max_tokens);
                let response = client.complete(request).await?;
                (OpenAI::extract_text(&response), OpenAI::token_usage(&response))
            }
            TranslationProviderImpl::Anthropic { client } => {
                let request = AnthropicRequest::new(model, max_tokens)
                    .system(system_prompt)
                    .add_message("user", user_prompt)
                    .temperature(temperature);
                let response = client.complete(request).await?;
                (Anthropic::extract_text(&response), Anthropic::token_usage(&response))
            }
        };

        self.usage.lock().add_token_usage(prompt_tokens, completion_tokens, start_time.elapsed());
        Ok(text)
    }
}

#[async_trait]
impl CompletionBackend for TranslationService {
    async fn complete_prompt(&self, system_prompt: &str, user_prompt: &str) -> Result<String, ProviderError> {
        let retry_count = self.config.common.retry_count;
        let backoff_ms = self.config.common.retry_backoff_ms;
        let mut attempt = 0;

        loop {
            match self.send_once(system_prompt, user_prompt).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_retryable() && attempt < retry_count => {
                    let delay = Duration::from_millis(backoff_ms.saturating_mul(1 << attempt.min(16)));
                    warn!(
                        "{} request failed (attempt {}/{}): {}. Retrying in {:?}",
                        self.config.provider.display_name(),
                        attempt + 1,
                        retry_count + 1,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
