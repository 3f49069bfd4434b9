/*!
 * Prompt templates for vocabulary augmentation.
 *
 * The model is asked for a raw JSON array with one object per word; see
 * `translation::response` for how the answer is parsed.
 */

/// System prompt template
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// The default system prompt
    pub const DICTIONARY_ASSISTANT: &'static str =
        "You are a helpful dictionary assistant for {source_language} learners whose native language is {target_language}. You output strict JSON.";

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    pub fn dictionary_assistant() -> Self {
        Self::new(Self::DICTIONARY_ASSISTANT)
    }

    /// Render the template with the given variables.
    pub fn render(&self, source_language: &str, target_language: &str) -> String {
        self.template
            .replace("{source_language}", source_language)
            .replace("{target_language}", target_language)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::dictionary_assistant()
    }
}

/// Builds the user prompt for one batch of words
#[derive(Debug, Clone)]
pub struct VocabularyPromptBuilder {
    source_language: String,
    target_language: String,
    words: Vec<String>,
}

impl VocabularyPromptBuilder {
    /// Languages are human-readable names, e.g. "German"
    pub fn new(source_language: &str, target_language: &str) -> Self {
        Self {
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            words: Vec::new(),
        }
    }

    pub fn with_words<S: AsRef<str>>(mut self, words: &[S]) -> Self {
        self.words = words.iter().map(|w| w.as_ref().to_string()).collect();
        self
    }

    pub fn build(&self) -> String {
        let source = &self.source_language;
        let target = &self.target_language;

        format!(
            r#"You are a vocabulary assistant.
Source Language: {source}
Target Language: {target}

Word List: {words}

Task:
For each word in the list, provide:
1. An example sentence in the Source Language ({source}) containing the word.
2. The translation of the word in the Target Language ({target}).
3. The translation of the example sentence in the Target Language ({target}).

Return ONLY a raw JSON array of objects, one per word, in any order. Do not include markdown formatting.
Copy each word into "word" exactly as it appears in the list.
JSON Format:
[
  {{
    "word": "original_word",
    "sentence": "Example sentence in source language.",
    "translate_word": "Translated word",
    "translate_sentence": "Translated sentence."
  }}
]"#,
            words = self.words.join(", "),
        )
    }
}
