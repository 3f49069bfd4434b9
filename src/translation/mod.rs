/*!
 * Translation augmentation of vocabulary tables using AI providers.
 *
 * It is split into several submodules:
 *
 * - `core`: the `CompletionBackend` seam and the config-driven `TranslationService`
 * - `batch`: batch orchestration and merge (`VocabularyAugmenter`)
 * - `prompts`: system prompt template and per-batch user prompt
 * - `response`: extraction and strict parsing of the JSON answer
 * - `cost`: advisory token and price estimate
 */

// Re-export main types for easier usage
pub use self::batch::{AugmentationReport, BatchFailure, VocabularyAugmenter};
pub use self::core::{CompletionBackend, TokenUsageStats, TranslationService};
pub use self::cost::{estimate_cost, CostEstimate};

// Re-export prompt types
pub use self::prompts::{PromptTemplate, VocabularyPromptBuilder};

// Submodules
pub mod batch;
pub mod core;
pub mod cost;
pub mod prompts;
pub mod response;
