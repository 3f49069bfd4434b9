/*!
 * Common test utilities for the vocabulator test suite
 */

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tempfile::TempDir;
use vocabulator::app_config::Config;
use vocabulator::app_controller::Controller;
use vocabulator::language_utils::LanguageProfile;
use vocabulator::nlp::{LexiconTagger, Tokenizer};
use vocabulator::pdf_source::StaticPageSource;

/// Small German lexicon covering the sample pages
pub const GERMAN_LEXICON: &str = "der\tder\tDET\tMasc\n\
    die\tdie\tDET\tFem\n\
    hund\tHund\tNOUN\tMasc\n\
    hunde\tHund\tNOUN\tMasc\n\
    katze\tKatze\tNOUN\tFem\n\
    haus\tHaus\tNOUN\tNeut\n\
    läuft\tlaufen\tVERB\n\
    laufen\tlaufen\tVERB\n\
    bellt\tbellen\tVERB\n\
    schläft\tschlafen\tVERB\n\
    schnell\tschnell\tADV\n\
    groß\tgroß\tADJ\n\
    und\tund\tCCONJ\n\
    im\tin\tADP\n";

pub const GERMAN_STOPWORDS: &str = "der\ndie\nund\nim\n";

/// The two pages of the reference document
pub fn sample_pages() -> Vec<String> {
    vec![
        "Der Hund läuft schnell.".to_string(),
        "Der Hund bellt.".to_string(),
    ]
}

/// Route log output through the test harness; safe to call from every test
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Tagger built from the in-memory German lexicon
pub fn german_tagger() -> LexiconTagger {
    LexiconTagger::parse("de_core_news_sm", GERMAN_LEXICON, GERMAN_STOPWORDS)
        .expect("test lexicon must parse")
}

/// Writes the German lexicon as a model directory and returns its parent
pub fn create_model_dir(dir: &Path) -> Result<PathBuf> {
    let models = dir.join("models");
    let model = models.join(LanguageProfile::german().model);
    fs::create_dir_all(&model)?;
    fs::write(model.join("lexicon.tsv"), GERMAN_LEXICON)?;
    fs::write(model.join("stopwords.txt"), GERMAN_STOPWORDS)?;
    Ok(models)
}

/// Controller reading the given pages, with the German tagger preloaded
pub fn test_controller(pages: Vec<String>) -> Controller {
    let tagger: Arc<dyn Tokenizer> = Arc::new(german_tagger());
    Controller::with_config(Config::default())
        .with_page_source(Arc::new(StaticPageSource::new(pages)))
        .with_tokenizer(&LanguageProfile::german().model, tagger)
}
