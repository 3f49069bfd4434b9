/*!
 * Vocabulary extraction pipeline.
 *
 * - `known_words`: loads the optional exclusion list and lemmatizes it
 * - `aggregator`: turns page text into a ranked `VocabularyTable`
 * - `threshold`: post-hoc removal of low-frequency rows
 * - `export`: CSV / spreadsheet serialization of a table
 *
 * A `VocabularyTable` is always ordered by count, highest first. Ties keep
 * the order in which lemmas were first seen.
 */

use serde::{Deserialize, Serialize};

use crate::nlp::{Gender, PartOfSpeech};

pub mod aggregator;
pub mod export;
pub mod known_words;
pub mod threshold;

pub use aggregator::Aggregator;
pub use export::{export_table, ExportFormat};
pub use known_words::{build_known_words, select_word_column, KnownWordsSet};
pub use threshold::{apply_threshold, parse_threshold};

/// One row of the vocabulary table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    /// Canonical lowercase lemma, unique within a table
    pub lemma: String,

    /// Number of qualifying occurrences
    pub count: u64,

    /// Tag of the first occurrence
    pub part_of_speech: PartOfSpeech,

    /// Gender of the first noun occurrence reporting one
    pub gender: Option<Gender>,

    /// Lemma, optionally prefixed with its article
    pub display_word: String,

    /// Example sentence in the source language
    #[serde(default)]
    pub sentence: String,

    /// Translation of the word
    #[serde(default)]
    pub translated_word: String,

    /// Translation of the example sentence
    #[serde(default)]
    pub translated_sentence: String,
}

impl VocabularyEntry {
    pub fn new(lemma: impl Into<String>, count: u64, part_of_speech: PartOfSpeech) -> Self {
        let lemma = lemma.into();
        Self {
            display_word: lemma.clone(),
            lemma,
            count,
            part_of_speech,
            gender: None,
            sentence: String::new(),
            translated_word: String::new(),
            translated_sentence: String::new(),
        }
    }

    /// Whether the translation augmenter filled this row
    pub fn is_augmented(&self) -> bool {
        !self.sentence.is_empty() || !self.translated_word.is_empty() || !self.translated_sentence.is_empty()
    }
}

/// Ranked collection of vocabulary entries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VocabularyTable {
    entries: Vec<VocabularyEntry>,

    /// Set once the translation augmenter has run over this table
    #[serde(default)]
    pub augmented: bool,
}

impl VocabularyTable {
    /// Build a table, sorting entries by count descending.
    ///
    /// The sort is stable: entries with equal counts keep their input order.
    pub fn new(mut entries: Vec<VocabularyEntry>) -> Self {
        entries.sort_by(|a, b| b.count.cmp(&a.count));
        Self {
            entries,
            augmented: false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[VocabularyEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VocabularyEntry> {
        self.entries.iter()
    }

    /// Mutable access for column enrichment; rows cannot be added or removed
    pub fn entries_mut(&mut self) -> &mut [VocabularyEntry] {
        &mut self.entries
    }

    /// Look up an entry by its lemma
    pub fn get(&self, lemma: &str) -> Option<&VocabularyEntry> {
        self.entries.iter().find(|entry| entry.lemma == lemma)
    }

    /// Remove rows not matching the predicate, preserving order
    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&VocabularyEntry) -> bool,
    {
        self.entries.retain(keep);
    }

    /// The first `n` rows
    pub fn top(&self, n: usize) -> &[VocabularyEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    /// Counts in table order
    pub fn counts(&self) -> Vec<u64> {
        self.entries.iter().map(|entry| entry.count).collect()
    }

    /// Check the ordering invariant
    pub fn is_sorted_by_count(&self) -> bool {
        self.entries.windows(2).all(|pair| pair[0].count >= pair[1].count)
    }
}

impl<'a> IntoIterator for &'a VocabularyTable {
    type Item = &'a VocabularyEntry;
    type IntoIter = std::slice::Iter<'a, VocabularyEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
