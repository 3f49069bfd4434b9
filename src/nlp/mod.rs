/*!
 * Tokenization adapter.
 *
 * The vocabulary pipeline only depends on the `Tokenizer` trait: given a
 * batch of texts, return one token sequence per text, in input order. Each
 * token carries a lemma, a coarse part-of-speech tag, alphabetic and
 * stopword flags and an optional morphological gender.
 *
 * - `token`: token, part-of-speech and gender types
 * - `lexicon`: the bundled lexicon-backed tagger
 */

use crate::errors::NlpError;

pub use self::lexicon::LexiconTagger;
pub use self::token::{Gender, PartOfSpeech, Token};

pub mod lexicon;
pub mod token;

/// Tokenizer/lemmatizer/POS-tagger contract consumed by the vocabulary pipeline
pub trait Tokenizer: Send + Sync {
    /// Tokenize every text of the batch
    ///
    /// # Returns
    /// * One token sequence per input text, in input order
    fn tokenize_batch(&self, texts: &[String]) -> Result<Vec<Vec<Token>>, NlpError>;

    /// Name of the underlying model, used in status messages
    fn model_name(&self) -> &str;
}
