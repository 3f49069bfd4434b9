use calamine::{open_workbook_auto, Data, Reader};
use log::{debug, info};
use std::collections::HashSet;
use std::path::Path;

use crate::errors::AppError;
use crate::file_utils::{FileManager, TabularKind};
use crate::nlp::Tokenizer;

/// Lemmas the learner already knows; excluded from aggregation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownWordsSet {
    lemmas: HashSet<String>,
}

impl KnownWordsSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-insensitive membership test
    pub fn contains(&self, lemma: &str) -> bool {
        self.lemmas.contains(&lemma.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.lemmas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lemmas.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for KnownWordsSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            lemmas: iter
                .into_iter()
                .map(|word| word.as_ref().trim().to_lowercase())
                .filter(|word| !word.is_empty())
                .collect(),
        }
    }
}

/// Pick the column holding the words.
///
/// The first header containing "word" (case-insensitive) wins; without one
/// the first column is used.
pub fn select_word_column<S: AsRef<str>>(headers: &[S]) -> usize {
    headers
        .iter()
        .position(|header| header.as_ref().to_lowercase().contains("word"))
        .unwrap_or(0)
}

/// Build the exclusion set from an optional tabular file.
///
/// Each cell of the word column is trimmed and lowercased, then run through
/// the tokenizer in batches of `batch_size`; the alphabetic lemmas of the
/// resulting tokens form the set. No path yields an empty set.
pub fn build_known_words(
    path: Option<&Path>,
    tokenizer: &dyn Tokenizer,
    batch_size: usize,
) -> Result<KnownWordsSet, AppError> {
    let Some(path) = path else {
        return Ok(KnownWordsSet::new());
    };

    if batch_size == 0 {
        return Err(AppError::Validation("Known-words batch size must be greater than 0".to_string()));
    }

    let raw_words = read_word_column(path)?;
    debug!("Read {} known-word cells from {}", raw_words.len(), path.display());

    let mut lemmas = HashSet::new();
    for chunk in raw_words.chunks(batch_size) {
        for tokens in tokenizer.tokenize_batch(chunk)? {
            lemmas.extend(
                tokens
                    .into_iter()
                    .filter(|token| token.is_alpha)
                    .map(|token| token.lemma.to_lowercase()),
            );
        }
    }

    info!("Loaded {} known words", lemmas.len());
    Ok(KnownWordsSet { lemmas })
}

/// Read the word column, normalized to trimmed lowercase, skipping blanks
fn read_word_column(path: &Path) -> Result<Vec<String>, AppError> {
    if !FileManager::file_exists(path) {
        return Err(AppError::FileFormat(format!("Known-words file not found: {}", path.display())));
    }

    let cells = match FileManager::tabular_kind(path) {
        TabularKind::Csv => read_delimited(path, b',')?,
        TabularKind::Tsv => read_delimited(path, b'\t')?,
        TabularKind::Spreadsheet => read_spreadsheet(path)?,
        other => {
            return Err(AppError::FileFormat(format!(
                "Unsupported known-words file type ({:?}): {}",
                other,
                path.display()
            )))
        }
    };

    let words: Vec<String> = cells
        .into_iter()
        .map(|cell| cell.trim().to_lowercase())
        .filter(|cell| !cell.is_empty())
        .collect();

    if words.is_empty() {
        return Err(AppError::FileFormat(format!("Known-words file is empty: {}", path.display())));
    }

    Ok(words)
}

fn read_delimited(path: &Path, delimiter: u8) -> Result<Vec<String>, AppError> {
    let format_error = |e: csv::Error| AppError::FileFormat(format!("Cannot parse {}: {}", path.display(), e));

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(format_error)?;

    let headers: Vec<String> = reader.headers().map_err(format_error)?.iter().map(str::to_string).collect();
    let column = select_word_column(&headers);

    let mut cells = Vec::new();
    for record in reader.records() {
        let record = record.map_err(format_error)?;
        if let Some(cell) = record.get(column) {
            cells.push(cell.to_string());
        }
    }

    Ok(cells)
}

fn read_spreadsheet(path: &Path) -> Result<Vec<String>, AppError> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| AppError::FileFormat(format!("Cannot open spreadsheet {}: {}", path.display(), e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::FileFormat(format!("Spreadsheet has no worksheets: {}", path.display())))?
        .map_err(|e| AppError::FileFormat(format!("Cannot read spreadsheet {}: {}", path.display(), e)))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row.iter().map(cell_to_string).collect(),
        None => return Ok(Vec::new()),
    };
    let column = select_word_column(&headers);

    Ok(rows
        .filter_map(|row| row.get(column))
        .map(cell_to_string)
        .collect())
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}
