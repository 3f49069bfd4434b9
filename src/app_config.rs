use anyhow::{anyhow, Context, Result};
use log::{warn, LevelFilter};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::file_utils::FileManager;
use crate::language_utils::{self, LanguageProfile};
use crate::translation::prompts::PromptTemplate;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Language of the analyzed documents (ISO)
    pub source_language: String,

    /// Language translations are written in (ISO)
    pub target_language: String,

    /// Prefix noun lemmas with their article
    #[serde(default)]
    pub include_articles: bool,

    /// Tokenizer settings
    #[serde(default)]
    pub nlp: NlpConfig,

    /// Per-language model and article tables
    #[serde(default = "LanguageProfile::defaults")]
    pub languages: Vec<LanguageProfile>,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Tokenizer model location and batching
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NlpConfig {
    /// Directory holding one sub-directory per model
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,

    /// Pages per tokenizer call
    #[serde(default = "default_nlp_batch_size")]
    pub batch_size: usize,

    /// Known-word cells per tokenizer call
    #[serde(default = "default_known_words_batch_size")]
    pub known_words_batch_size: usize,
}

impl Default for NlpConfig {
    fn default() -> Self {
        Self {
            model_dir: default_model_dir(),
            batch_size: default_nlp_batch_size(),
            known_words_batch_size: default_known_words_batch_size(),
        }
    }
}

impl NlpConfig {
    /// The configured model directory, or the per-user data directory when
    /// the configured one does not exist
    pub fn resolve_model_dir(&self) -> PathBuf {
        if FileManager::dir_exists(&self.model_dir) {
            return self.model_dir.clone();
        }

        dirs::data_dir()
            .map(|data| data.join("vocabulator").join("models"))
            .filter(|dir| FileManager::dir_exists(dir))
            .unwrap_or_else(|| self.model_dir.clone())
    }
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: Ollama
    Ollama,
    // @provider: OpenAI
    #[default]
    OpenAI,
    // @provider: Anthropic
    Anthropic,
    // @provider: LM Studio (OpenAI-compatible local server)
    LMStudio,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Ollama => "Ollama",
            Self::OpenAI => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::LMStudio => "LM Studio",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Ollama => "ollama".to_string(),
            Self::OpenAI => "openai".to_string(),
            Self::Anthropic => "anthropic".to_string(),
            Self::LMStudio => "lmstudio".to_string(),
        }
    }

    // @returns: Whether the provider runs on the local machine (no API cost)
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Ollama | Self::LMStudio)
    }

    // @returns: Whether requests need an API key
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::OpenAI | Self::Anthropic)
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAI),
            "anthropic" => Ok(Self::Anthropic),
            "lmstudio" => Ok(Self::LMStudio),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Max concurrent batch requests
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Rate limit (requests per minute)
    #[serde(default)]
    pub rate_limit: Option<u32>,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: TranslationProvider) -> Self {
        Self {
            provider_type: provider_type.to_lowercase_string(),
            model: default_model(&provider_type),
            api_key: String::new(),
            endpoint: default_endpoint(&provider_type),
            concurrent_requests: default_concurrent_requests(),
            timeout_secs: default_timeout_secs(),
            rate_limit: default_rate_limit(&provider_type),
        }
    }
}

/// Price of a hosted model in USD per million tokens
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ModelPricing {
    /// Model name or name prefix, e.g. "gpt-4o-mini"
    pub model: String,
    pub input_per_million: f64,
    pub output_per_million: f64,
}

impl ModelPricing {
    pub fn new(model: &str, input_per_million: f64, output_per_million: f64) -> Self {
        Self {
            model: model.to_string(),
            input_per_million,
            output_per_million,
        }
    }

    /// Zero-cost pricing for local providers
    pub fn free(model: &str) -> Self {
        Self::new(model, 0.0, 0.0)
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Available translation providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,

    /// Known model prices, used for the cost estimate
    #[serde(default = "default_pricing")]
    pub pricing: Vec<ModelPricing>,
}

/// Common translation settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// System prompt template
    /// Placeholders: {source_language}, {target_language}
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Retry count for failed requests
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Backoff multiplier for retries (in milliseconds)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Temperature parameter for text generation
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Words per LLM request
    #[serde(default = "default_translation_batch_size")]
    pub batch_size: usize,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            retry_count: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
            temperature: default_temperature(),
            batch_size: default_translation_batch_size(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn default_model_dir() -> PathBuf {
    PathBuf::from("models")
}

fn default_nlp_batch_size() -> usize {
    20
}

fn default_known_words_batch_size() -> usize {
    100
}

fn default_concurrent_requests() -> usize {
    1
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_retry_count() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    1000 // doubled on each retry
}

fn default_temperature() -> f32 {
    0.7
}

fn default_translation_batch_size() -> usize {
    20
}

fn default_system_prompt() -> String {
    PromptTemplate::DICTIONARY_ASSISTANT.to_string()
}

fn default_model(provider: &TranslationProvider) -> String {
    match provider {
        TranslationProvider::Ollama => "llama3.1:8b",
        TranslationProvider::OpenAI => "gpt-4o-mini",
        TranslationProvider::Anthropic => "claude-3-haiku-20240307",
        // Placeholder; users should set to the loaded model name in LM Studio
        TranslationProvider::LMStudio => "local-model",
    }
    .to_string()
}

fn default_endpoint(provider: &TranslationProvider) -> String {
    match provider {
        TranslationProvider::Ollama => "http://localhost:11434",
        TranslationProvider::OpenAI => "https://api.openai.com/v1",
        TranslationProvider::Anthropic => "https://api.anthropic.com",
        TranslationProvider::LMStudio => "http://localhost:1234/v1",
    }
    .to_string()
}

fn default_rate_limit(provider: &TranslationProvider) -> Option<u32> {
    match provider {
        TranslationProvider::OpenAI => Some(60),
        // slightly below Anthropic's 50 requests per minute
        TranslationProvider::Anthropic => Some(45),
        TranslationProvider::Ollama | TranslationProvider::LMStudio => None,
    }
}

fn default_pricing() -> Vec<ModelPricing> {
    vec![
        ModelPricing::new("gpt-4o-mini", 0.15, 0.60),
        ModelPricing::new("gpt-4o", 2.50, 10.00),
        ModelPricing::new("gpt-4.1-mini", 0.40, 1.60),
        ModelPricing::new("gpt-4.1", 2.00, 8.00),
        ModelPricing::new("gpt-3.5-turbo", 0.50, 1.50),
        ModelPricing::new("claude-3-haiku", 0.25, 1.25),
        ModelPricing::new("claude-3-5-haiku", 0.80, 4.00),
        ModelPricing::new("claude-3-5-sonnet", 3.00, 15.00),
    ]
}

impl Config {
    /// Load the configuration file, writing a default one when it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if FileManager::file_exists(path) {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let config: Config = serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        FileManager::write_to_file(path, &config_json)
    }

    /// Profile of the configured source language
    pub fn source_profile(&self) -> Option<&LanguageProfile> {
        language_utils::find_profile(&self.languages, &self.source_language)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let _source_name = language_utils::get_language_name(&self.source_language)?;
        let _target_name = language_utils::get_language_name(&self.target_language)?;

        if self.source_profile().is_none() {
            let known: Vec<&str> = self.languages.iter().map(|p| p.code.as_str()).collect();
            return Err(anyhow!(
                "No language profile for '{}' (configured: {})",
                self.source_language,
                known.join(", ")
            ));
        }

        if self.nlp.batch_size == 0 || self.nlp.known_words_batch_size == 0 {
            return Err(anyhow!("NLP batch sizes must be greater than 0"));
        }

        if self.translation.common.batch_size == 0 {
            return Err(anyhow!("Translation batch size must be greater than 0"));
        }

        if let Some(provider_config) = self.translation.get_active_provider_config() {
            if provider_config.concurrent_requests == 0 {
                return Err(anyhow!(
                    "concurrent_requests for {} must be greater than 0",
                    self.translation.provider.display_name()
                ));
            }
        }

        Ok(())
    }

    /// Checks that only matter when translation is requested
    pub fn validate_for_translation(&self) -> Result<()> {
        let provider = &self.translation.provider;
        if provider.requires_api_key() && self.translation.get_api_key().is_empty() {
            return Err(anyhow!(
                "Translation API key is required for {} provider",
                provider.display_name()
            ));
        }
        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: "de".to_string(),
            target_language: "en".to_string(),
            include_articles: false,
            nlp: NlpConfig::default(),
            languages: LanguageProfile::defaults(),
            translation: TranslationConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    pub fn optimal_concurrent_requests(&self) -> usize {
        self.get_active_provider_config()
            .map(|p| p.concurrent_requests.max(1))
            .unwrap_or_else(default_concurrent_requests)
    }

    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        self.get_provider_config(&self.provider)
    }

    /// Get a specific provider configuration by type
    pub fn get_provider_config(&self, provider_type: &TranslationProvider) -> Option<&ProviderConfig> {
        let provider_str = provider_type.to_lowercase_string();
        self.available_providers.iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Mutable configuration of the active provider, created with defaults if missing
    pub fn active_provider_config_mut(&mut self) -> &mut ProviderConfig {
        let provider_str = self.provider.to_lowercase_string();
        let position = match self.available_providers.iter().position(|p| p.provider_type == provider_str) {
            Some(position) => position,
            None => {
                self.available_providers.push(ProviderConfig::new(self.provider.clone()));
                self.available_providers.len() - 1
            }
        };
        &mut self.available_providers[position]
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        self.get_active_provider_config()
            .map(|p| p.model.clone())
            .filter(|model| !model.is_empty())
            .unwrap_or_else(|| default_model(&self.provider))
    }

    /// Get the API key for the active provider
    pub fn get_api_key(&self) -> String {
        self.get_active_provider_config()
            .map(|p| p.api_key.clone())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        self.get_active_provider_config()
            .map(|p| p.endpoint.clone())
            .filter(|endpoint| !endpoint.is_empty())
            .unwrap_or_else(|| default_endpoint(&self.provider))
    }

    /// Get the request timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        self.get_active_provider_config()
            .map(|p| p.timeout_secs)
            .filter(|secs| *secs > 0)
            .unwrap_or_else(default_timeout_secs)
    }

    /// Get the rate limit for the active provider
    pub fn get_rate_limit(&self) -> Option<u32> {
        match self.get_active_provider_config() {
            Some(provider_config) => provider_config.rate_limit,
            None => default_rate_limit(&self.provider),
        }
    }

    /// Pricing of the active model.
    ///
    /// Local providers are free. For hosted models the longest configured
    /// name that prefixes the model wins, so "gpt-4o-mini-2024-07-18"
    /// resolves to "gpt-4o-mini" rather than "gpt-4o".
    pub fn pricing_for_active_model(&self) -> Option<ModelPricing> {
        let model = self.get_model();
        if self.provider.is_local() {
            return Some(ModelPricing::free(&model));
        }

        self.pricing
            .iter()
            .filter(|pricing| model.starts_with(&pricing.model))
            .max_by_key(|pricing| pricing.model.len())
            .cloned()
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            available_providers: vec![
                ProviderConfig::new(TranslationProvider::Ollama),
                ProviderConfig::new(TranslationProvider::OpenAI),
                ProviderConfig::new(TranslationProvider::Anthropic),
                ProviderConfig::new(TranslationProvider::LMStudio),
            ],
            common: TranslationCommonConfig::default(),
            pricing: default_pricing(),
        }
    }
}
