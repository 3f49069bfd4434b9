use log::{debug, info, warn};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::app_config::Config;
use crate::errors::AppError;
use crate::language_utils::{self, LanguageProfile};
use crate::nlp::{LexiconTagger, Tokenizer};
use crate::pdf_source::{LopdfPageSource, PageSource};
use crate::translation::{
    estimate_cost, AugmentationReport, CompletionBackend, CostEstimate, PromptTemplate,
    TranslationService, VocabularyAugmenter,
};
use crate::vocabulary::{self, build_known_words, export_table, Aggregator, VocabularyEntry, VocabularyTable};

// @module: Session controller for vocabulary extraction

/// Notifications posted while an operation runs
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Human readable step, e.g. "Reading PDF..."
    Status(String),
    /// Finished and total augmentation batches
    Progress { done: usize, total: usize },
    /// The operation finished
    Completed(String),
    /// The operation failed; the session is idle again
    Failed(String),
}

/// Parameters of one analysis run
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub pdf_path: PathBuf,
    pub known_words_path: Option<PathBuf>,
    /// ISO code of the document language
    pub language: String,
    pub include_articles: bool,
    /// Raw minimum-count filter; rows at or below it are dropped after aggregation
    pub min_count: Option<String>,
}

impl AnalysisRequest {
    /// Request using the language and article settings of the configuration
    pub fn from_config(config: &Config, pdf_path: impl Into<PathBuf>) -> Self {
        Self {
            pdf_path: pdf_path.into(),
            known_words_path: None,
            language: config.source_language.clone(),
            include_articles: config.include_articles,
            min_count: None,
        }
    }
}

/// The current table and the language it was built from
struct LoadedTable {
    table: VocabularyTable,
    language: String,
}

/// Clears the busy flag when the operation ends, however it ends
struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, AppError> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| AppError::Busy)?;
        Ok(Self { flag })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Owns the vocabulary table and runs one operation on it at a time
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Result of the last analysis
    current: Mutex<Option<LoadedTable>>,

    // @field: Set while an operation is in flight
    busy: AtomicBool,

    // @field: Event channel, when a host subscribed
    events: Option<UnboundedSender<SessionEvent>>,

    // @field: PDF text source
    page_source: Arc<dyn PageSource>,

    // @field: Loaded tokenizers by model name
    tokenizers: Mutex<HashMap<String, Arc<dyn Tokenizer>>>,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            current: Mutex::new(None),
            busy: AtomicBool::new(false),
            events: None,
            page_source: Arc::new(LopdfPageSource::new()),
            tokenizers: Mutex::new(HashMap::new()),
        }
    }

    // @method: Replace the PDF text source
    pub fn with_page_source(mut self, page_source: Arc<dyn PageSource>) -> Self {
        self.page_source = page_source;
        self
    }

    // @method: Use a preloaded tokenizer for a model instead of loading it from disk
    pub fn with_tokenizer(self, model: &str, tokenizer: Arc<dyn Tokenizer>) -> Self {
        self.tokenizers.lock().insert(model.to_string(), tokenizer);
        self
    }

    // @method: Receive session events from now on
    pub fn subscribe(&mut self) -> UnboundedReceiver<SessionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.events = Some(tx);
        rx
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Copy of the current table
    pub fn table(&self) -> Option<VocabularyTable> {
        self.current.lock().as_ref().map(|loaded| loaded.table.clone())
    }

    /// The top `rows` entries of the current table
    pub fn preview(&self, rows: usize) -> Vec<VocabularyEntry> {
        self.current.lock()
            .as_ref()
            .map(|loaded| loaded.table.top(rows).to_vec())
            .unwrap_or_default()
    }

    fn emit(&self, event: SessionEvent) {
        emit_to(self.events.as_ref(), event);
    }

    fn profile_for(&self, language: &str) -> Result<LanguageProfile, AppError> {
        language_utils::find_profile(&self.config.languages, language)
            .cloned()
            .ok_or_else(|| AppError::Validation(format!("Unsupported language: '{}'", language)))
    }

    /// Build the vocabulary table for a PDF.
    ///
    /// Input, including the minimum count, is checked before any work starts.
    /// Loading the model, the known words and the PDF, and aggregating, run on
    /// a blocking worker. The resulting table, minus rows at or below the
    /// minimum count, replaces the current one. Returns the number of rows.
    pub async fn run_analysis(&self, request: AnalysisRequest) -> Result<usize, AppError> {
        if request.pdf_path.as_os_str().is_empty() {
            return Err(AppError::Validation("Please select a PDF file".to_string()));
        }
        let profile = self.profile_for(&request.language)?;
        let min_count = request.min_count.as_deref().map(vocabulary::parse_threshold).transpose()?;
        let _guard = BusyGuard::acquire(&self.busy)?;

        let start_time = Instant::now();
        let model = profile.model.clone();
        let cached_tokenizer = self.tokenizers.lock().get(&model).cloned();
        let job = AnalysisJob {
            request: request.clone(),
            profile,
            min_count,
            model_dir: self.config.nlp.resolve_model_dir(),
            page_batch_size: self.config.nlp.batch_size,
            known_words_batch_size: self.config.nlp.known_words_batch_size,
            cached_tokenizer,
            page_source: Arc::clone(&self.page_source),
            events: self.events.clone(),
        };

        let outcome = tokio::task::spawn_blocking(move || job.run())
            .await
            .map_err(|e| AppError::Unknown(format!("Analysis worker failed: {}", e)))
            .and_then(|result| result);

        match outcome {
            Ok((table, tokenizer)) => {
                self.tokenizers.lock().insert(model, tokenizer);
                let rows = table.len();
                *self.current.lock() = Some(LoadedTable {
                    table,
                    language: request.language.clone(),
                });

                info!("Analysis complete: {} words in {:.1}s", rows, start_time.elapsed().as_secs_f64());
                self.emit(SessionEvent::Completed(format!("Analysis complete: {} words", rows)));
                Ok(rows)
            }
            Err(e) => {
                debug!("Analysis failed: {}", e);
                self.emit(SessionEvent::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    /// Remove rows with a count at or below the threshold; returns the number removed
    pub fn apply_threshold(&self, threshold: &str) -> Result<usize, AppError> {
        self.apply_min_count(vocabulary::parse_threshold(threshold)?)
    }

    /// Same as [`Controller::apply_threshold`] with an already parsed threshold
    pub fn apply_min_count(&self, threshold: i64) -> Result<usize, AppError> {
        let _guard = BusyGuard::acquire(&self.busy)?;

        let mut current = self.current.lock();
        let loaded = current.as_mut()
            .ok_or_else(|| AppError::Validation("No data to filter, run an analysis first".to_string()))?;

        let removed = vocabulary::apply_threshold(&mut loaded.table, threshold);
        drop(current);

        self.emit(SessionEvent::Completed(format!("Removed {} words with count <= {}", removed, threshold)));
        Ok(removed)
    }

    /// Advisory estimate for augmenting the current table with the configured provider
    pub fn estimate(&self) -> Option<CostEstimate> {
        let words = self.current.lock().as_ref().map(|loaded| loaded.table.len())?;
        let pricing = self.config.translation.pricing_for_active_model();
        Some(estimate_cost(words, self.config.translation.common.batch_size, pricing.as_ref()))
    }

    /// Check that the configured provider can be used, without contacting it
    pub fn check_translation_settings(&self) -> Result<(), AppError> {
        self.config.validate_for_translation()
            .map_err(|e| AppError::Validation(e.to_string()))
    }

    /// Augmenter for the configured provider
    pub fn build_augmenter(&self) -> Result<VocabularyAugmenter<TranslationService>, AppError> {
        self.check_translation_settings()?;

        let translation = &self.config.translation;
        let service = TranslationService::new(translation.clone())?;
        debug!("Using {} model {}", translation.provider.display_name(), translation.get_model());

        Ok(VocabularyAugmenter::new(service, translation.common.batch_size)
            .with_concurrency(translation.optimal_concurrent_requests())
            .with_system_prompt(PromptTemplate::new(&translation.common.system_prompt)))
    }

    /// Fill sentence and translation columns of the current table.
    ///
    /// Failed batches are logged and reported; they never fail the call.
    pub async fn augment_with<C: CompletionBackend>(
        &self,
        augmenter: &VocabularyAugmenter<C>,
        target_language: &str,
    ) -> Result<AugmentationReport, AppError> {
        let target_name = language_utils::get_language_name(target_language)
            .map_err(|e| AppError::Validation(e.to_string()))?;
        let _guard = BusyGuard::acquire(&self.busy)?;

        let (mut table, language) = {
            let current = self.current.lock();
            let loaded = current.as_ref()
                .ok_or_else(|| AppError::Validation("No data to translate, run an analysis first".to_string()))?;
            (loaded.table.clone(), loaded.language.clone())
        };
        let source_name = language_utils::get_language_name(&language)?;

        self.emit(SessionEvent::Status(format!(
            "Translating {} words from {} to {}...",
            table.len(),
            source_name,
            target_name
        )));

        let events = self.events.clone();
        let report = augmenter
            .augment(&mut table, &source_name, &target_name, move |done, total| {
                emit_to(events.as_ref(), SessionEvent::Progress { done, total });
                if done < total {
                    emit_to(events.as_ref(), SessionEvent::Status(format!("Processing batch {}/{}...", done + 1, total)));
                }
            })
            .await;

        let report = match report {
            Ok(report) => report,
            Err(e) => {
                debug!("Translation failed: {}", e);
                self.emit(SessionEvent::Failed(e.to_string()));
                return Err(e);
            }
        };

        if let Some(loaded) = self.current.lock().as_mut() {
            loaded.table = table;
        }

        if !report.failures.is_empty() {
            warn!(
                "{} of {} batches failed; their words have no translation",
                report.failures.len(),
                report.total_batches
            );
        }
        self.emit(SessionEvent::Completed(format!(
            "Translation complete: {} words filled, {} batches failed",
            report.filled_rows,
            report.failures.len()
        )));
        Ok(report)
    }

    /// Write the current table to a `.csv` or `.xlsx` file
    pub fn export(&self, path: &Path) -> Result<(), AppError> {
        let _guard = BusyGuard::acquire(&self.busy)?;
        let current = self.current.lock();
        let loaded = current.as_ref()
            .ok_or_else(|| AppError::Validation("No data to export".to_string()))?;

        export_table(&loaded.table, path)?;
        self.emit(SessionEvent::Completed(format!("Exported {} words to {}", loaded.table.len(), path.display())));
        Ok(())
    }
}

fn emit_to(events: Option<&UnboundedSender<SessionEvent>>, event: SessionEvent) {
    if let Some(tx) = events {
        if tx.send(event).is_err() {
            debug!("Session event receiver dropped");
        }
    }
}

/// Everything the blocking worker needs, owned
struct AnalysisJob {
    request: AnalysisRequest,
    profile: LanguageProfile,
    min_count: Option<i64>,
    model_dir: PathBuf,
    page_batch_size: usize,
    known_words_batch_size: usize,
    cached_tokenizer: Option<Arc<dyn Tokenizer>>,
    page_source: Arc<dyn PageSource>,
    events: Option<UnboundedSender<SessionEvent>>,
}

impl AnalysisJob {
    fn status(&self, message: &str) {
        debug!("{}", message);
        emit_to(self.events.as_ref(), SessionEvent::Status(message.to_string()));
    }

    fn run(self) -> Result<(VocabularyTable, Arc<dyn Tokenizer>), AppError> {
        self.status("Loading language model...");
        let tokenizer: Arc<dyn Tokenizer> = match &self.cached_tokenizer {
            Some(tokenizer) => Arc::clone(tokenizer),
            None => Arc::new(LexiconTagger::load(&self.model_dir, &self.profile.model)?),
        };

        self.status("Loading known words...");
        let known_words = build_known_words(
            self.request.known_words_path.as_deref(),
            tokenizer.as_ref(),
            self.known_words_batch_size,
        )?;

        self.status("Reading PDF...");
        let pages = self.page_source.read_pages(&self.request.pdf_path)?;

        self.status(&format!("Extracting words from {} pages...", pages.len()));
        let mut table = Aggregator::new(tokenizer.as_ref(), self.page_batch_size).aggregate(
            &pages,
            &known_words,
            self.request.include_articles,
            &self.profile,
        )?;

        if let Some(min_count) = self.min_count {
            vocabulary::apply_threshold(&mut table, min_count);
        }

        Ok((table, tokenizer))
    }
}
