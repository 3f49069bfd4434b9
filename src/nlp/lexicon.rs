use log::debug;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

use crate::errors::NlpError;
use super::token::{Gender, PartOfSpeech, Token};
use super::Tokenizer;

/// File holding `form<TAB>lemma<TAB>POS[<TAB>Gender]` lines
pub const LEXICON_FILE: &str = "lexicon.tsv";

/// Optional file holding one stopword per line
pub const STOPWORDS_FILE: &str = "stopwords.txt";

#[derive(Debug, Clone)]
struct LexiconEntry {
    lemma: String,
    pos: PartOfSpeech,
    gender: Option<Gender>,
}

/// Lexicon-backed tokenizer, lemmatizer and part-of-speech tagger.
///
/// A model is a directory `<model_dir>/<model>/` with a `lexicon.tsv` and an
/// optional `stopwords.txt`. Text is NFC-normalized and split with Unicode
/// word segmentation. Forms are looked up case-insensitively; unknown forms
/// keep their lowercase surface form as lemma and are tagged `X`.
#[derive(Debug)]
pub struct LexiconTagger {
    model: String,
    entries: HashMap<String, LexiconEntry>,
    stopwords: HashSet<String>,
}

impl LexiconTagger {
    /// Load a model from `<model_dir>/<model>/`
    pub fn load(model_dir: &Path, model: &str) -> Result<Self, NlpError> {
        let dir = model_dir.join(model);
        let lexicon_path = dir.join(LEXICON_FILE);

        if !lexicon_path.is_file() {
            return Err(NlpError::ModelUnavailable {
                model: model.to_string(),
                location: dir.display().to_string(),
            });
        }

        let lexicon = fs::read_to_string(&lexicon_path)
            .map_err(|e| NlpError::InvalidModel {
                model: model.to_string(),
                line: 0,
                reason: format!("cannot read {}: {}", lexicon_path.display(), e),
            })?;

        let stopwords_path = dir.join(STOPWORDS_FILE);
        let stopwords = if stopwords_path.is_file() {
            fs::read_to_string(&stopwords_path)
                .map_err(|e| NlpError::InvalidModel {
                    model: model.to_string(),
                    line: 0,
                    reason: format!("cannot read {}: {}", stopwords_path.display(), e),
                })?
        } else {
            String::new()
        };

        let tagger = Self::parse(model, &lexicon, &stopwords)?;
        debug!("Loaded model '{}' with {} forms and {} stopwords", model, tagger.entries.len(), tagger.stopwords.len());
        Ok(tagger)
    }

    /// Build a tagger from the contents of the lexicon and stopword files
    pub fn parse(model: &str, lexicon: &str, stopwords: &str) -> Result<Self, NlpError> {
        let mut entries = HashMap::new();

        for (idx, line) in lexicon.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let invalid = |reason: String| NlpError::InvalidModel {
                model: model.to_string(),
                line: idx + 1,
                reason,
            };

            let columns: Vec<&str> = line.split('\t').map(str::trim).collect();
            if columns.len() < 3 {
                return Err(invalid(format!("expected at least 3 tab-separated columns, found {}", columns.len())));
            }

            let pos = columns[2].parse::<PartOfSpeech>().map_err(invalid)?;
            let gender = match columns.get(3).filter(|g| !g.is_empty()) {
                Some(tag) => Some(Gender::from_tag(tag)
                    .ok_or_else(|| invalid(format!("unknown gender: {}", tag)))?),
                None => None,
            };

            entries
                .entry(normalize_form(columns[0]))
                .or_insert(LexiconEntry {
                    lemma: columns[1].to_string(),
                    pos,
                    gender,
                });
        }

        let stopwords = stopwords
            .lines()
            .map(normalize_form)
            .filter(|word| !word.is_empty() && !word.starts_with('#'))
            .collect();

        Ok(Self {
            model: model.to_string(),
            entries,
            stopwords,
        })
    }

    fn tokenize(&self, text: &str) -> Vec<Token> {
        let normalized: String = text.nfc().collect();

        normalized
            .unicode_words()
            .map(|word| {
                let key = normalize_form(word);
                let mut token = match self.entries.get(&key) {
                    Some(entry) => {
                        let mut token = Token::new(word, entry.lemma.clone(), entry.pos);
                        token.gender = entry.gender;
                        token
                    }
                    None => Token::new(word, key.clone(), PartOfSpeech::X),
                };
                token.is_stop = self.stopwords.contains(&key);
                token
            })
            .collect()
    }
}

impl Tokenizer for LexiconTagger {
    fn tokenize_batch(&self, texts: &[String]) -> Result<Vec<Vec<Token>>, NlpError> {
        Ok(texts.iter().map(|text| self.tokenize(text)).collect())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn normalize_form(form: &str) -> String {
    form.trim().nfc().collect::<String>().to_lowercase()
}
