/*!
 * # Vocabulator - vocabulary lists from PDF documents
 *
 * A Rust library that turns the text of a PDF into a frequency-ranked
 * vocabulary table for language learners.
 *
 * ## Features
 *
 * - Lemmatize, POS-filter and count the words of every page
 * - Exclude a user-supplied list of known words (CSV or spreadsheet)
 * - Prefix nouns with their definite article (German, French, Spanish)
 * - Drop low-frequency words with a threshold
 * - Add example sentences and translations using various AI providers:
 *   - Ollama (local LLM)
 *   - OpenAI API
 *   - Anthropic API
 *   - LM Studio (OpenAI-compatible local server)
 * - Export to CSV or XLSX
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `app_controller`: Session controller owning the vocabulary table
 * - `nlp`: Tokenizer contract and the bundled lexicon tagger
 * - `pdf_source`: PDF text extraction
 * - `vocabulary`: Aggregation, known-words exclusion, threshold and export
 * - `translation`: LLM augmentation of a vocabulary table:
 *   - `translation::core`: Completion backend and provider dispatch
 *   - `translation::batch`: Batch orchestration and merge
 *   - `translation::cost`: Advisory cost estimate
 * - `providers`: Client implementations for various LLM providers
 * - `file_utils`: File system operations
 * - `language_utils`: ISO language code utilities and language profiles
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod nlp;
pub mod pdf_source;
pub mod providers;
pub mod translation;
pub mod vocabulary;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{AnalysisRequest, Controller, SessionEvent};
pub use errors::{AppError, NlpError, ProviderError, TranslationError};
pub use language_utils::{get_language_name, language_codes_match, normalize_to_part2t, LanguageProfile};
pub use translation::{TranslationService, VocabularyAugmenter};
pub use vocabulary::{VocabularyEntry, VocabularyTable};
