/*!
 * Tests for application configuration functionality
 */

use anyhow::Result;
use std::str::FromStr;
use vocabulator::app_config::{Config, TranslationProvider};
use crate::common;

/// Test the default configuration values
#[test]
fn test_default_config_shouldHaveExpectedValues() {
    let config = Config::default();

    assert_eq!(config.source_language, "de");
    assert_eq!(config.target_language, "en");
    assert!(!config.include_articles);
    assert_eq!(config.nlp.batch_size, 20);
    assert_eq!(config.translation.provider, TranslationProvider::OpenAI);
    assert_eq!(config.translation.get_model(), "gpt-4o-mini");
    assert_eq!(config.translation.common.batch_size, 20);
    assert!((config.translation.common.temperature - 0.7).abs() < f32::EPSILON);
    assert_eq!(config.languages.len(), 3);
    assert!(config.validate().is_ok());
}

/// Test that a missing config file is created with defaults
#[test]
fn test_loadOrCreate_missingFile_shouldWriteDefaults() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = dir.path().join("conf.json");

    let created = Config::load_or_create(&path)?;
    assert!(path.is_file());

    let reloaded = Config::load_or_create(&path)?;
    assert_eq!(reloaded.source_language, created.source_language);
    assert_eq!(reloaded.translation.get_model(), created.translation.get_model());
    Ok(())
}

/// Test that a partial config file gets defaults for missing fields
#[test]
fn test_loadOrCreate_partialFile_shouldFillDefaults() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        dir.path(),
        "conf.json",
        r#"{ "source_language": "fr", "target_language": "en", "include_articles": true }"#,
    )?;

    let config = Config::load_or_create(&path)?;

    assert_eq!(config.source_language, "fr");
    assert!(config.include_articles);
    assert_eq!(config.source_profile().map(|p| p.model.as_str()), Some("fr_core_news_sm"));
    assert_eq!(config.nlp.known_words_batch_size, 100);
    Ok(())
}

/// Test that an invalid file is reported instead of overwritten
#[test]
fn test_loadOrCreate_invalidJson_shouldFail() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = common::create_test_file(dir.path(), "conf.json", "{ not json")?;

    assert!(Config::load_or_create(&path).is_err());
    assert_eq!(std::fs::read_to_string(&path)?, "{ not json");
    Ok(())
}

/// Test validation failures
#[test]
fn test_validate_withInvalidValues_shouldFail() {
    let mut unsupported = Config::default();
    unsupported.source_language = "it".to_string();
    assert!(unsupported.validate().is_err());

    let mut bad_code = Config::default();
    bad_code.target_language = "xx".to_string();
    assert!(bad_code.validate().is_err());

    let mut zero_batch = Config::default();
    zero_batch.translation.common.batch_size = 0;
    assert!(zero_batch.validate().is_err());
}

/// Test the API key requirement for hosted providers
#[test]
fn test_validateForTranslation_hostedWithoutKey_shouldFail() {
    let mut config = Config::default();
    assert!(config.validate_for_translation().is_err());

    config.translation.active_provider_config_mut().api_key = "sk-test".to_string();
    assert!(config.validate_for_translation().is_ok());

    config.translation.provider = TranslationProvider::Ollama;
    config.translation.active_provider_config_mut().api_key.clear();
    assert!(config.validate_for_translation().is_ok());
}

/// Test provider parsing
#[test]
fn test_translationProvider_fromStr_shouldBeCaseInsensitive() {
    assert_eq!(TranslationProvider::from_str("OpenAI").unwrap(), TranslationProvider::OpenAI);
    assert_eq!(TranslationProvider::from_str("lmstudio").unwrap(), TranslationProvider::LMStudio);
    assert!(TranslationProvider::from_str("gemini").is_err());
    assert_eq!(TranslationProvider::Anthropic.to_string(), "anthropic");
}

/// Test pricing lookup
#[test]
fn test_pricingForActiveModel_shouldPreferLongestPrefix() {
    let mut config = Config::default();
    config.translation.active_provider_config_mut().model = "gpt-4o-mini-2024-07-18".to_string();
    let pricing = config.translation.pricing_for_active_model().unwrap();
    assert_eq!(pricing.model, "gpt-4o-mini");

    config.translation.active_provider_config_mut().model = "unknown-model".to_string();
    assert!(config.translation.pricing_for_active_model().is_none());

    config.translation.provider = TranslationProvider::Ollama;
    let free = config.translation.pricing_for_active_model().unwrap();
    assert_eq!(free.input_per_million, 0.0);
}
