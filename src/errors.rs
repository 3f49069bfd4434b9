/*!
 * Error types for the vocabulator application.
 *
 * This module contains custom error types for the different parts of the
 * pipeline, using the thiserror crate for ergonomic error definitions.
 * Fatal errors (model, file, validation, export) travel up as `AppError`;
 * per-batch translation failures are `TranslationError`s that the augmenter
 * collects instead of propagating.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Whether retrying the same request could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RequestFailed(_) | Self::ConnectionError(_) | Self::RateLimitExceeded(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            Self::ParseError(_) | Self::AuthenticationError(_) => false,
        }
    }

    /// Map a non-success HTTP status to the matching error variant
    pub fn from_status(status_code: u16, message: String) -> Self {
        match status_code {
            401 | 403 => Self::AuthenticationError(message),
            429 => Self::RateLimitExceeded(message),
            _ => Self::ApiError { status_code, message },
        }
    }
}

/// Errors raised by the tokenization adapter
#[derive(Error, Debug)]
pub enum NlpError {
    /// The language model is not installed
    #[error("Model '{model}' not found in {location}. Install the model directory (lexicon.tsv, stopwords.txt) for this language and try again")]
    ModelUnavailable {
        /// Model name, e.g. `de_core_news_sm`
        model: String,
        /// Where the model was looked up
        location: String,
    },

    /// The model exists but its files are corrupt
    #[error("Model '{model}' is invalid (line {line}): {reason}")]
    InvalidModel {
        model: String,
        line: usize,
        reason: String,
    },

    /// Tokenizing a text failed
    #[error("Tokenization failed: {0}")]
    Tokenization(String),
}

/// Errors that can occur while augmenting a single batch of words
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The LLM answered with something that is not the expected JSON array
    #[error("Malformed translation response: {0}")]
    MalformedResponse(String),

    /// A batch could not be processed
    #[error("Batch {batch} failed: {message}")]
    Batch {
        /// One-based batch number
        batch: usize,
        message: String,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// A PDF or known-words file is unreadable, corrupt or empty
    #[error("File format error: {0}")]
    FileFormat(String),

    /// Bad user input, caught before background work starts
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The export destination could not be written
    #[error("Export failed: {0}")]
    Export(String),

    /// A background operation is still running
    #[error("Another operation is still running, wait for it to finish")]
    Busy,

    /// Error from the tokenization adapter
    #[error("NLP error: {0}")]
    Nlp(#[from] NlpError),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl AppError {
    /// True when the language model needs to be installed by the user
    pub fn is_model_unavailable(&self) -> bool {
        matches!(self, Self::Nlp(NlpError::ModelUnavailable { .. }))
    }
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
