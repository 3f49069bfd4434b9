/*!
 * Mock provider implementations for testing.
 *
 * The mock reads the word list out of the user prompt and answers with one
 * word card per word, so the augmenter can be driven end to end without a
 * server:
 * - `MockProvider::working()` - Always answers with a valid JSON array
 * - `MockProvider::intermittent(n)` - Every nth request fails with a 503
 * - `MockProvider::failing()` - Always fails with an error
 * - `MockProvider::malformed()` - Answers with text that is not JSON
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::providers::Provider;
use crate::translation::response::WordCard;
use crate::translation::CompletionBackend;

const WORD_LIST_PREFIX: &str = "Word List:";

/// Mock request for testing
#[derive(Debug, Clone)]
pub struct MockRequest {
    pub system_prompt: String,
    pub user_prompt: String,
}

impl MockRequest {
    /// Words listed in the user prompt
    pub fn words(&self) -> Vec<String> {
        self.user_prompt
            .lines()
            .find_map(|line| line.trim().strip_prefix(WORD_LIST_PREFIX))
            .map(|list| {
                list.split(", ")
                    .map(|word| word.trim().to_string())
                    .filter(|word| !word.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Mock response for testing
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub text: String,
    /// Simulated prompt tokens
    pub prompt_tokens: Option<u64>,
    /// Simulated completion tokens
    pub completion_tokens: Option<u64>,
}

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always answers with a raw JSON array
    Working,
    /// Wraps the array in a ```json code fence
    Fenced,
    /// Leaves the last word of every request out of the answer
    Partial,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Answers with prose instead of JSON
    Malformed,
    /// Returns empty response
    Empty,
    /// Simulates slow response (for timeout testing)
    Slow { delay_ms: u64 },
}

/// Mock provider for testing augmentation behavior
#[derive(Debug)]
pub struct MockProvider {
    behavior: MockBehavior,
    /// Request counter for intermittent failures
    request_count: Arc<AtomicUsize>,
    /// Word lists of every request received
    word_lists: Arc<Mutex<Vec<Vec<String>>>>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&MockRequest) -> String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            word_lists: Arc::new(Mutex::new(Vec::new())),
            custom_response: None,
        }
    }

    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    pub fn fenced() -> Self {
        Self::new(MockBehavior::Fenced)
    }

    pub fn partial() -> Self {
        Self::new(MockBehavior::Partial)
    }

    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every: fail_every.max(1) })
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn malformed() -> Self {
        Self::new(MockBehavior::Malformed)
    }

    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Set a custom response generator, used instead of the generated cards
    pub fn with_custom_response(mut self, generator: fn(&MockRequest) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of requests received so far (shared between clones)
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Word lists of all requests received so far, in arrival order
    pub fn word_lists(&self) -> Vec<Vec<String>> {
        self.word_lists.lock().clone()
    }

    /// The card the mock generates for a word
    pub fn card_for(word: &str) -> WordCard {
        WordCard {
            word: word.to_string(),
            sentence: format!("Ein Satz mit {}.", word),
            translate_word: format!("{} (translated)", word),
            translate_sentence: format!("A sentence with {}.", word),
        }
    }

    /// A JSON array answer for the given words
    pub fn generate_cards_response<S: AsRef<str>>(words: &[S]) -> String {
        let cards: Vec<WordCard> = words.iter().map(|word| Self::card_for(word.as_ref())).collect();
        serde_json::to_string_pretty(&cards).unwrap_or_else(|_| "[]".to_string())
    }

    fn answer(&self, request: &MockRequest, words: &[String]) -> String {
        match self.custom_response {
            Some(generator) => generator(request),
            None => Self::generate_cards_response(words),
        }
    }

    fn respond(text: String, request: &MockRequest) -> MockResponse {
        MockResponse {
            prompt_tokens: Some((request.system_prompt.len() + request.user_prompt.len()) as u64 / 4),
            completion_tokens: Some(text.len() as u64 / 4),
            text,
        }
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            request_count: Arc::clone(&self.request_count),
            word_lists: Arc::clone(&self.word_lists),
            custom_response: self.custom_response,
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    type Request = MockRequest;
    type Response = MockResponse;

    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        let words = request.words();
        self.word_lists.lock().push(words.clone());

        match self.behavior {
            MockBehavior::Working => Ok(Self::respond(self.answer(&request, &words), &request)),

            MockBehavior::Fenced => {
                let text = format!("```json\n{}\n```", self.answer(&request, &words));
                Ok(Self::respond(text, &request))
            }

            MockBehavior::Partial => {
                let kept = &words[..words.len().saturating_sub(1)];
                Ok(Self::respond(self.answer(&request, kept), &request))
            }

            MockBehavior::Intermittent { fail_every } => {
                if count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    Ok(Self::respond(self.answer(&request, &words), &request))
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::Malformed => Ok(Self::respond(
                "Sure! Here are your words: Hund means dog.".to_string(),
                &request,
            )),

            MockBehavior::Empty => Ok(MockResponse {
                text: String::new(),
                prompt_tokens: Some(0),
                completion_tokens: Some(0),
            }),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(Self::respond(self.answer(&request, &words), &request))
            }
        }
    }

    fn extract_text(response: &Self::Response) -> String {
        response.text.clone()
    }

    fn token_usage(response: &Self::Response) -> (Option<u64>, Option<u64>) {
        (response.prompt_tokens, response.completion_tokens)
    }
}

#[async_trait]
impl CompletionBackend for MockProvider {
    async fn complete_prompt(&self, system_prompt: &str, user_prompt: &str) -> Result<String, ProviderError> {
        let request = MockRequest {
            system_prompt: system_prompt.to_string(),
            user_prompt: user_prompt.to_string(),
        };
        let response = self.complete(request).await?;
        Ok(Self::extract_text(&response))
    }
}
