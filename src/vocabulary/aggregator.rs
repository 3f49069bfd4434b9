use log::debug;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::errors::{AppError, NlpError};
use crate::language_utils::LanguageProfile;
use crate::nlp::{Gender, PartOfSpeech, Token, Tokenizer};

use super::known_words::KnownWordsSet;
use super::{VocabularyEntry, VocabularyTable};

/// Lemmas must be longer than this many characters to count
pub const MIN_LEMMA_CHARS: usize = 2;

/// Running total for one lemma
struct Tally {
    lemma: String,
    base_form: String,
    count: u64,
    pos: PartOfSpeech,
    gender: Option<Gender>,
}

/// Builds a ranked vocabulary table from per-page text
pub struct Aggregator<'a> {
    tokenizer: &'a dyn Tokenizer,
    batch_size: usize,
}

impl<'a> Aggregator<'a> {
    /// `batch_size` is the number of pages handed to the tokenizer at once
    pub fn new(tokenizer: &'a dyn Tokenizer, batch_size: usize) -> Self {
        Self { tokenizer, batch_size }
    }

    /// Count qualifying lemmas over all pages.
    ///
    /// A token qualifies when it is alphabetic, not a stopword, its lemma is
    /// longer than two characters and it is tagged NOUN, VERB, ADJ or ADV.
    /// Qualifying tokens whose lowercase lemma is a known word are dropped.
    /// With `include_articles`, the first noun occurrence reporting a gender
    /// fixes the lemma's gender, and the display word gets the profile's
    /// article for it.
    pub fn aggregate(
        &self,
        pages: &[String],
        known_words: &KnownWordsSet,
        include_articles: bool,
        profile: &LanguageProfile,
    ) -> Result<VocabularyTable, AppError> {
        if self.batch_size == 0 {
            return Err(AppError::Validation("Tokenizer batch size must be greater than 0".to_string()));
        }

        let mut index: HashMap<String, usize> = HashMap::new();
        let mut tallies: Vec<Tally> = Vec::new();
        let mut excluded = 0usize;

        for chunk in pages.chunks(self.batch_size) {
            let sequences = self.tokenizer.tokenize_batch(chunk)?;
            if sequences.len() != chunk.len() {
                return Err(NlpError::Tokenization(format!(
                    "{} returned {} token sequences for {} pages",
                    self.tokenizer.model_name(),
                    sequences.len(),
                    chunk.len()
                ))
                .into());
            }
            for tokens in sequences {
                for token in tokens.iter().filter(|token| qualifies(token)) {
                    let key = token.lemma.to_lowercase();
                    if known_words.contains(&key) {
                        excluded += 1;
                        continue;
                    }

                    let slot = match index.entry(key) {
                        Entry::Occupied(occupied) => *occupied.get(),
                        Entry::Vacant(vacant) => {
                            tallies.push(Tally {
                                lemma: vacant.key().clone(),
                                base_form: token.lemma.clone(),
                                count: 0,
                                pos: token.pos,
                                gender: None,
                            });
                            *vacant.insert(tallies.len() - 1)
                        }
                    };

                    let tally = &mut tallies[slot];
                    tally.count += 1;
                    if include_articles && token.pos == PartOfSpeech::Noun && tally.gender.is_none() {
                        tally.gender = token.gender;
                    }
                }
            }
        }

        debug!(
            "Aggregated {} lemmas from {} pages ({} known-word occurrences dropped)",
            tallies.len(),
            pages.len(),
            excluded
        );

        let entries = tallies
            .into_iter()
            .map(|tally| {
                let article = tally
                    .gender
                    .filter(|_| include_articles)
                    .and_then(|gender| profile.article_for(gender));
                let display_word = match article {
                    Some(article) => format!("{} {}", article, tally.base_form),
                    None => tally.base_form,
                };

                VocabularyEntry {
                    display_word,
                    gender: tally.gender,
                    ..VocabularyEntry::new(tally.lemma, tally.count, tally.pos)
                }
            })
            .collect();

        Ok(VocabularyTable::new(entries))
    }
}

fn qualifies(token: &Token) -> bool {
    token.is_alpha
        && !token.is_stop
        && token.lemma.chars().count() > MIN_LEMMA_CHARS
        && token.pos.is_content_word()
}
