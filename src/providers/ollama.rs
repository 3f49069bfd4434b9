use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{send_error, status_error, Provider};
use crate::errors::ProviderError;

/// Ollama client for interacting with a local Ollama server
#[derive(Debug)]
pub struct Ollama {
    /// Base URL including scheme and port, e.g. `http://localhost:11434`
    base_url: String,
    client: Client,
}

/// Additional model parameters
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct GenerationOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Maximum number of tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<u32>,
}

/// Chat message object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,
    pub content: String,
}

/// Chat request for the Ollama API
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    stream: bool,
}

/// Chat response from the Ollama API
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub message: ChatMessage,
    #[serde(default)]
    pub done: bool,
    /// Number of prompt tokens
    #[serde(default)]
    pub prompt_eval_count: Option<u64>,
    /// Number of generated tokens
    #[serde(default)]
    pub eval_count: Option<u64>,
}

impl ChatRequest {
    /// Create a non-streaming chat request
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            options: None,
            stream: false,
        }
    }

    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(ChatMessage {
            role: role.into(),
            content: content.into(),
        });
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options.get_or_insert_with(GenerationOptions::default).temperature = Some(temperature);
        self
    }

    /// Cap the number of generated tokens
    pub fn num_predict(mut self, num_predict: u32) -> Self {
        self.options.get_or_insert_with(GenerationOptions::default).num_predict = Some(num_predict);
        self
    }
}

impl Ollama {
    /// Create a new Ollama client for a base URL
    ///
    /// Ollama uses HTTP/1.1; connections are kept alive for parallel batch requests.
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .http1_only()
                .pool_idle_timeout(Duration::from_secs(90))
                .pool_max_idle_per_host(20)
                .tcp_keepalive(Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Parse a chat body; servers that ignore `stream: false` answer with JSON lines
    fn parse_chat_body(body: &str) -> Result<ChatResponse, ProviderError> {
        match serde_json::from_str::<ChatResponse>(body) {
            Ok(response) => Ok(response),
            Err(e) => {
                debug!("Ollama chat body is not a single object ({}), trying JSON lines", e);

                let chunks: Vec<ChatResponse> = body
                    .lines()
                    .filter(|line| !line.trim().is_empty())
                    .filter_map(|line| serde_json::from_str::<ChatResponse>(line).ok())
                    .collect();

                if chunks.is_empty() {
                    return Err(ProviderError::ParseError(format!("Ollama chat response: {}", e)));
                }
                if !chunks.iter().any(|chunk| chunk.done) {
                    warn!("Ollama stream ended without a final chunk");
                }

                let content: String = chunks.iter().map(|chunk| chunk.message.content.as_str()).collect();
                let last = chunks.last();
                Ok(ChatResponse {
                    message: ChatMessage {
                        role: "assistant".to_string(),
                        content,
                    },
                    done: true,
                    prompt_eval_count: last.and_then(|chunk| chunk.prompt_eval_count),
                    eval_count: last.and_then(|chunk| chunk.eval_count),
                })
            }
        }
    }
}

#[async_trait]
impl Provider for Ollama {
    type Request = ChatRequest;
    type Response = ChatResponse;

    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
        let url = format!("{}/api/chat", self.base_url);

        let response = self.client.post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| send_error("Ollama", e))?;

        if !response.status().is_success() {
            return Err(status_error("Ollama", response).await);
        }

        let body = response.text().await
            .map_err(|e| ProviderError::RequestFailed(format!("Ollama response body: {}", e)))?;
        Self::parse_chat_body(&body)
    }

    fn extract_text(response: &ChatResponse) -> String {
        response.message.content.clone()
    }

    fn token_usage(response: &ChatResponse) -> (Option<u64>, Option<u64>) {
        (response.prompt_eval_count, response.eval_count)
    }
}
