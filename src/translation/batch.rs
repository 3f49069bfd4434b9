/*!
 * Batch augmentation of a vocabulary table.
 *
 * The table's words are split into fixed-size batches, one LLM request per
 * batch. Batches may run concurrently; each answer is matched back to the
 * rows of its own batch by normalized word, so the result does not depend on
 * the order in which batches finish. A failed batch leaves its rows blank
 * and is reported, it never aborts the run.
 */

use futures::stream::{self, StreamExt};
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::errors::{AppError, TranslationError};
use crate::vocabulary::VocabularyTable;

use super::core::CompletionBackend;
use super::prompts::{PromptTemplate, VocabularyPromptBuilder};
use super::response::{normalize_word, parse_word_cards, WordCard};

/// A word as sent to the model, with the lemma as a second merge key
#[derive(Debug, Clone)]
struct BatchWord {
    display: String,
    lemma: String,
}

/// Result of one batch; cards are keyed by position inside the batch
enum BatchOutcome {
    Filled(HashMap<usize, WordCard>),
    Failed(TranslationError),
    Skipped,
}

/// A batch that could not be merged
#[derive(Debug)]
pub struct BatchFailure {
    /// One-based batch number
    pub batch: usize,
    pub error: TranslationError,
}

/// Summary of an augmentation run
#[derive(Debug, Default)]
pub struct AugmentationReport {
    pub total_batches: usize,
    pub failures: Vec<BatchFailure>,
    /// Batches not sent because the run was cancelled
    pub skipped: usize,
    /// Rows that received a sentence and translations
    pub filled_rows: usize,
}

impl AugmentationReport {
    /// True when every batch was sent and merged
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.skipped == 0
    }
}

/// Enriches vocabulary tables with example sentences and translations
pub struct VocabularyAugmenter<C: CompletionBackend> {
    backend: C,
    system_prompt: PromptTemplate,
    batch_size: usize,
    concurrent_requests: usize,
    cancel: Arc<AtomicBool>,
}

impl<C: CompletionBackend> VocabularyAugmenter<C> {
    /// Create an augmenter sending `batch_size` words per request, one request at a time
    pub fn new(backend: C, batch_size: usize) -> Self {
        Self {
            backend,
            system_prompt: PromptTemplate::default(),
            batch_size,
            concurrent_requests: 1,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Allow up to `concurrent_requests` batches in flight
    pub fn with_concurrency(mut self, concurrent_requests: usize) -> Self {
        self.concurrent_requests = concurrent_requests.max(1);
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: PromptTemplate) -> Self {
        self.system_prompt = system_prompt;
        self
    }

    /// Flag that cancels the remaining batches when set
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn backend(&self) -> &C {
        &self.backend
    }

    /// Fill sentence and translation columns of `table`.
    ///
    /// Languages are human-readable names ("German"). `progress` receives
    /// (finished batches, total batches) after every batch.
    pub async fn augment<F>(
        &self,
        table: &mut VocabularyTable,
        source_language: &str,
        target_language: &str,
        progress: F,
    ) -> Result<AugmentationReport, AppError>
    where
        F: Fn(usize, usize) + Send + Sync,
    {
        if self.batch_size == 0 {
            return Err(AppError::Validation("Translation batch size must be greater than 0".to_string()));
        }

        let batch_size = self.batch_size;
        let words: Vec<BatchWord> = table
            .iter()
            .map(|entry| BatchWord {
                display: entry.display_word.clone(),
                lemma: entry.lemma.clone(),
            })
            .collect();
        let batches: Vec<&[BatchWord]> = words.chunks(batch_size).collect();
        let total_batches = batches.len();

        info!(
            "Augmenting {} words in {} batches ({} concurrent)",
            words.len(),
            total_batches,
            self.concurrent_requests
        );

        let system_prompt = self.system_prompt.render(source_language, target_language);
        let finished = AtomicUsize::new(0);
        let start_time = Instant::now();

        let mut outcomes: Vec<(usize, BatchOutcome)> = stream::iter(batches.into_iter().enumerate())
            .map(|(index, batch)| {
                let system_prompt = &system_prompt;
                let finished = &finished;
                let progress = &progress;

                async move {
                    let outcome = if self.cancel.load(Ordering::SeqCst) {
                        BatchOutcome::Skipped
                    } else {
                        info!("Processing batch {}/{}...", index + 1, total_batches);
                        match self
                            .process_batch(index + 1, batch, system_prompt, source_language, target_language)
                            .await
                        {
                            Ok(cards) => BatchOutcome::Filled(cards),
                            Err(e) => BatchOutcome::Failed(e),
                        }
                    };

                    let done = finished.fetch_add(1, Ordering::SeqCst) + 1;
                    progress(done, total_batches);
                    (index, outcome)
                }
            })
            .buffer_unordered(self.concurrent_requests)
            .collect()
            .await;

        outcomes.sort_by_key(|(index, _)| *index);

        let mut report = AugmentationReport {
            total_batches,
            ..AugmentationReport::default()
        };
        let rows = table.entries_mut();

        for (index, outcome) in outcomes {
            match outcome {
                BatchOutcome::Filled(cards) => {
                    for (position, card) in cards {
                        let row = &mut rows[index * batch_size + position];
                        row.sentence = card.sentence;
                        row.translated_word = card.translate_word;
                        row.translated_sentence = card.translate_sentence;
                        report.filled_rows += 1;
                    }
                }
                BatchOutcome::Failed(error) => {
                    error!("Batch {}/{} failed, its rows stay empty: {}", index + 1, total_batches, error);
                    report.failures.push(BatchFailure { batch: index + 1, error });
                }
                BatchOutcome::Skipped => report.skipped += 1,
            }
        }

        table.augmented = true;

        if report.skipped > 0 {
            warn!("Augmentation cancelled, {} of {} batches skipped", report.skipped, total_batches);
        }
        info!(
            "Augmentation finished in {:.1}s: {}/{} rows filled, {} failed batches",
            start_time.elapsed().as_secs_f64(),
            report.filled_rows,
            words.len(),
            report.failures.len()
        );

        Ok(report)
    }

    async fn process_batch(
        &self,
        batch_number: usize,
        batch: &[BatchWord],
        system_prompt: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<HashMap<usize, WordCard>, TranslationError> {
        let display_words: Vec<&str> = batch.iter().map(|word| word.display.as_str()).collect();
        let user_prompt = VocabularyPromptBuilder::new(source_language, target_language)
            .with_words(&display_words)
            .build();

        let response = self.backend.complete_prompt(system_prompt, &user_prompt).await?;
        let cards = parse_word_cards(&response)?;
        let received = cards.len();

        let lookup: HashMap<String, WordCard> = cards
            .into_iter()
            .map(|card| (normalize_word(&card.word), card))
            .collect();

        let matched: HashMap<usize, WordCard> = batch
            .iter()
            .enumerate()
            .filter_map(|(position, word)| {
                lookup
                    .get(&normalize_word(&word.display))
                    .or_else(|| lookup.get(&normalize_word(&word.lemma)))
                    .map(|card| (position, card.clone()))
            })
            .collect();

        if matched.is_empty() {
            return Err(TranslationError::Batch {
                batch: batch_number,
                message: format!("response matched none of the {} words ({} items received)", batch.len(), received),
            });
        }

        if matched.len() < batch.len() {
            warn!(
                "Batch {}: {} of {} words missing from the response",
                batch_number,
                batch.len() - matched.len(),
                batch.len()
            );
        }
        if received > matched.len() {
            debug!("Batch {}: ignored {} items not in the batch", batch_number, received - matched.len());
        }

        Ok(matched)
    }
}
