/*!
 * Parsing of LLM answers for vocabulary augmentation.
 *
 * Models are asked for a raw JSON array but often wrap it in a markdown code
 * fence or add a sentence around it. `extract_json_array` strips those
 * artifacts; `parse_word_cards` then parses the array strictly.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::TranslationError;

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```[A-Za-z]*\s*(.*?)\s*```").unwrap()
});

/// One item of the LLM answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCard {
    /// The word as it was sent
    pub word: String,
    /// Example sentence in the source language
    pub sentence: String,
    /// Translated word
    pub translate_word: String,
    /// Translated example sentence
    pub translate_sentence: String,
}

/// Normalized merge key for a word
pub fn normalize_word(word: &str) -> String {
    word.trim().to_lowercase()
}

/// Cut the JSON array out of a raw answer
pub fn extract_json_array(response: &str) -> Result<&str, TranslationError> {
    let trimmed = response.trim();

    let inner = CODE_FENCE
        .captures(trimmed)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
        .unwrap_or(trimmed);

    match (inner.find('['), inner.rfind(']')) {
        (Some(start), Some(end)) if end > start => Ok(&inner[start..=end]),
        _ => Err(TranslationError::MalformedResponse(format!(
            "no JSON array found in response: {}",
            preview(trimmed)
        ))),
    }
}

/// Parse the answer into word cards; any item not matching the shape fails the whole answer
pub fn parse_word_cards(response: &str) -> Result<Vec<WordCard>, TranslationError> {
    let json = extract_json_array(response)?;
    serde_json::from_str::<Vec<WordCard>>(json)
        .map_err(|e| TranslationError::MalformedResponse(format!("{}: {}", e, preview(json))))
}

fn preview(text: &str) -> String {
    if text.chars().count() > 200 {
        format!("{}...", text.chars().take(200).collect::<String>())
    } else {
        text.to_string()
    }
}
