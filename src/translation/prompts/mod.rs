/*!
 * Prompts for vocabulary augmentation.
 *
 * - `PromptTemplate`: system prompt with `{source_language}` and
 *   `{target_language}` placeholders
 * - `VocabularyPromptBuilder`: the per-batch user prompt listing the words
 */

pub mod templates;

// Re-export main types
pub use templates::{PromptTemplate, VocabularyPromptBuilder};
