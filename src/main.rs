// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{error, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

use vocabulator::app_config::{self, Config, TranslationProvider};
use vocabulator::app_controller::{AnalysisRequest, Controller, SessionEvent};
use vocabulator::translation::{estimate_cost, CostEstimate};
use vocabulator::vocabulary::VocabularyEntry;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Ollama,
    #[value(name = "openai")]
    OpenAI,
    Anthropic,
    #[value(name = "lmstudio")]
    LMStudio,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
            CliTranslationProvider::Anthropic => TranslationProvider::Anthropic,
            CliTranslationProvider::LMStudio => TranslationProvider::LMStudio,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract a ranked vocabulary table from a PDF
    Analyze(AnalyzeArgs),

    /// Estimate the cost of translating a number of words
    Estimate(EstimateArgs),

    /// Generate shell completions for vocabulator
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Provider selection shared by `analyze` and `estimate`
#[derive(Args, Debug, Clone)]
struct ProviderArgs {
    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    /// Anthropic API key
    #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    anthropic_api_key: Option<String>,
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// PDF document to analyze
    #[arg(value_name = "PDF")]
    pdf_path: PathBuf,

    /// Document language code (e.g., 'de', 'fr', 'es')
    #[arg(short, long)]
    language: Option<String>,

    /// CSV or spreadsheet of words to exclude
    #[arg(short, long, value_name = "FILE")]
    known_words: Option<PathBuf>,

    /// Prefix nouns with their definite article
    #[arg(short, long)]
    articles: bool,

    /// Drop words seen this many times or fewer
    #[arg(long, value_name = "N")]
    min_count: Option<String>,

    /// Add example sentences and translations with an LLM
    #[arg(long)]
    translate: bool,

    /// Language of the translations (e.g., 'en')
    #[arg(short, long, requires = "translate")]
    target_language: Option<String>,

    #[command(flatten)]
    provider: ProviderArgs,

    /// Skip the cost confirmation
    #[arg(short, long)]
    yes: bool,

    /// Write the table to a .csv or .xlsx file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Number of rows to print
    #[arg(long, value_name = "N", default_value_t = 50)]
    preview: usize,
}

#[derive(Args, Debug)]
struct EstimateArgs {
    /// Number of words to translate
    #[arg(short, long)]
    words: usize,

    #[command(flatten)]
    provider: ProviderArgs,
}

/// Vocabulator - vocabulary lists from PDF documents
///
/// Extracts lemmatized, frequency-ranked vocabulary from a PDF for language
/// learners, optionally augmented with AI-generated example sentences.
#[derive(Parser, Debug)]
#[command(name = "vocabulator")]
#[command(version)]
#[command(about = "Frequency-ranked vocabulary lists from PDF documents")]
#[command(long_about = "Vocabulator extracts the vocabulary of a PDF document: lemmatized, filtered to nouns,
verbs, adjectives and adverbs, ranked by frequency. Known words can be excluded, nouns can be
shown with their article, and an LLM can add example sentences and translations.

EXAMPLES:
    vocabulator analyze book.pdf                           # Top 50 words using default config
    vocabulator analyze book.pdf -l fr -a -o words.xlsx   # French, with articles, to a spreadsheet
    vocabulator analyze book.pdf -k known.csv --min-count 2
    vocabulator analyze book.pdf --translate -t en -p openai -m gpt-4o-mini
    vocabulator estimate --words 800 -p anthropic          # Cost of translating 800 words
    vocabulator completions bash > vocabulator.bash        # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.

LANGUAGE MODELS:
    Each language needs a model directory <model_dir>/<model>/ with lexicon.tsv
    (form, lemma, POS and optional gender, tab separated) and stopwords.txt.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config: PathBuf,

    /// Set logging level
    #[arg(long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        // The boxed logger accepts everything; `log::set_max_level` does the filtering
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Color and marker for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "❌"),
            Level::Warn => ("1;33", "🚧"),
            Level::Info => ("1;32", " "),
            Level::Debug => ("1;36", "🔍"),
            Level::Trace => ("1;35", "📋"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, marker) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\x1B[{}m{} {} {}\x1B[0m", color, now, marker, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Some(level) = &cli.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let result = match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "vocabulator", &mut std::io::stdout());
            Ok(())
        }
        Commands::Analyze(args) => match load_config(&cli.config, cli.log_level.clone(), &args.provider) {
            Ok(config) => run_analyze(config, args).await,
            Err(e) => Err(e),
        },
        Commands::Estimate(args) => {
            load_config(&cli.config, cli.log_level.clone(), &args.provider).map(|config| run_estimate(&config, args.words))
        }
    };

    if let Err(e) = &result {
        error!("{:#}", e);
    }
    result
}

/// Load the config file, apply CLI overrides, validate and apply the log level
fn load_config(path: &Path, log_level: Option<CliLogLevel>, provider: &ProviderArgs) -> Result<Config> {
    let mut config = Config::load_or_create(path)?;

    if let Some(provider) = &provider.provider {
        config.translation.provider = provider.clone().into();
    }
    if let Some(model) = &provider.model {
        config.translation.active_provider_config_mut().model = model.clone();
    }

    let api_key = match config.translation.provider {
        TranslationProvider::OpenAI => provider.openai_api_key.clone(),
        TranslationProvider::Anthropic => provider.anthropic_api_key.clone(),
        TranslationProvider::Ollama | TranslationProvider::LMStudio => None,
    };
    if let Some(api_key) = api_key.filter(|key| !key.trim().is_empty()) {
        config.translation.active_provider_config_mut().api_key = api_key;
    }

    if let Some(log_level) = log_level {
        config.log_level = log_level.into();
    }

    config.validate().context("Configuration validation failed")?;
    log::set_max_level(config.log_level.to_level_filter());
    Ok(config)
}

async fn run_analyze(mut config: Config, args: AnalyzeArgs) -> Result<()> {
    if let Some(language) = &args.language {
        config.source_language = language.clone();
    }
    if let Some(target_language) = &args.target_language {
        config.target_language = target_language.clone();
    }
    if args.articles {
        config.include_articles = true;
    }
    config.validate().context("Configuration validation failed")?;

    let target_language = config.target_language.clone();
    let mut request = AnalysisRequest::from_config(&config, args.pdf_path.clone());
    request.known_words_path = args.known_words.clone();
    request.min_count = args.min_count.clone();

    let mut controller = Controller::with_config(config);
    if args.translate {
        controller.check_translation_settings()?;
    }

    let progress_bar = new_progress_bar();
    let event_task = tokio::spawn(report_events(controller.subscribe(), progress_bar.clone()));

    let outcome = analyze_and_export(&controller, request, &args, &target_language, &progress_bar).await;

    drop(controller);
    join_reporter(event_task).await;
    outcome
}

async fn analyze_and_export(
    controller: &Controller,
    request: AnalysisRequest,
    args: &AnalyzeArgs,
    target_language: &str,
    progress_bar: &ProgressBar,
) -> Result<()> {
    let rows = controller.run_analysis(request).await?;
    info!("Found {} distinct words", rows);

    if args.translate {
        translate(controller, target_language, args.yes, progress_bar).await?;
    }

    print_preview(&controller.preview(args.preview), controller.table().is_some_and(|t| t.augmented));

    if let Some(output) = &args.output {
        controller.export(output)?;
        info!("Saved to {}", output.display());
    }
    Ok(())
}

async fn translate(controller: &Controller, target_language: &str, assume_yes: bool, progress_bar: &ProgressBar) -> Result<()> {
    let Some(estimate) = controller.estimate() else {
        return Err(anyhow!("No data to translate"));
    };
    if estimate.words == 0 {
        warn!("No words to translate");
        return Ok(());
    }

    let augmenter = controller.build_augmenter()?;
    augmenter.backend().test_connection().await
        .with_context(|| format!("Cannot reach {}", controller.config().translation.provider.display_name()))?;

    print_estimate(controller.config(), &estimate);
    if !assume_yes && !confirm("Proceed with translation? [y/N] ")? {
        info!("Translation skipped");
        return Ok(());
    }

    let cancel = augmenter.cancel_handle();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Cancelling, batches in flight will finish first");
            cancel.store(true, Ordering::SeqCst);
        }
    });

    progress_bar.set_length(estimate.batches as u64);
    progress_bar.set_position(0);
    progress_bar.set_draw_target(ProgressDrawTarget::stderr());

    let report = controller.augment_with(&augmenter, target_language).await;
    ctrl_c.abort();
    progress_bar.finish_and_clear();
    let report = report?;

    info!("{}", augmenter.backend().token_usage().summary());
    for failure in &report.failures {
        warn!("Batch {} has no translations: {}", failure.batch, failure.error);
    }
    Ok(())
}

fn run_estimate(config: &Config, words: usize) {
    let translation = &config.translation;
    let pricing = translation.pricing_for_active_model();
    let estimate = estimate_cost(words, translation.common.batch_size, pricing.as_ref());
    print_estimate(config, &estimate);
}

fn print_estimate(config: &Config, estimate: &CostEstimate) {
    println!(
        "{} words, {} batches, ~{} input + ~{} output tokens with {} {}: {}",
        estimate.words,
        estimate.batches,
        estimate.input_tokens,
        estimate.output_tokens,
        config.translation.provider.display_name(),
        config.translation.get_model(),
        estimate.display_cost()
    );
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{}", prompt);
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer).context("Failed to read answer")?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn new_progress_bar() -> ProgressBar {
    let progress_bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::hidden());
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} batches ({percent}%) {msg} {eta}")
        .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress_bar.set_style(style.progress_chars("█▓▒░"));
    progress_bar
}

async fn report_events(mut events: UnboundedReceiver<SessionEvent>, progress_bar: ProgressBar) {
    while let Some(event) = events.recv().await {
        match event {
            SessionEvent::Status(message) if progress_bar.is_hidden() => info!("{}", message),
            SessionEvent::Status(message) => progress_bar.set_message(message),
            SessionEvent::Progress { done, total } => {
                progress_bar.set_length(total as u64);
                progress_bar.set_position(done as u64);
            }
            SessionEvent::Completed(message) => info!("{}", message),
            SessionEvent::Failed(_) => progress_bar.abandon(),
        }
    }
}

/// Wait for the event reporter to drain; a panic in it is logged, not raised
async fn join_reporter(task: JoinHandle<()>) {
    if let Err(e) = task.await {
        warn!("Event reporter stopped abnormally: {}", e);
    }
}

fn print_preview(rows: &[VocabularyEntry], augmented: bool) {
    if rows.is_empty() {
        println!("(no words)");
        return;
    }

    println!("{:>4}  {:<28} {:>6}  {:<5}", "#", "word", "count", "pos");
    for (rank, entry) in rows.iter().enumerate() {
        let mut line = format!(
            "{:>4}  {:<28} {:>6}  {:<5}",
            rank + 1,
            entry.display_word,
            entry.count,
            entry.part_of_speech.as_tag()
        );
        if augmented && !entry.translated_word.is_empty() {
            line.push_str(&format!("  {}", entry.translated_word));
        }
        println!("{}", line);
    }
}
