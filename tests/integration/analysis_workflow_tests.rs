/*!
 * Integration tests for the analysis workflow: pages in, vocabulary file out
 */

use anyhow::Result;
use std::sync::Arc;
use vocabulator::app_config::Config;
use vocabulator::app_controller::{AnalysisRequest, Controller, SessionEvent};
use vocabulator::errors::AppError;
use vocabulator::pdf_source::StaticPageSource;
use crate::common;

fn drain(events: &mut tokio::sync::mpsc::UnboundedReceiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut received = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }
    received
}

/// Test analysis, threshold and export on the reference document
#[tokio::test]
async fn test_analysis_withArticlesAndThreshold_shouldExportRankedCsv() -> Result<()> {
    common::init_logging();
    let dir = common::create_temp_dir()?;
    let controller = common::test_controller(common::sample_pages());

    let mut request = AnalysisRequest::from_config(controller.config(), "book.pdf");
    request.include_articles = true;
    let rows = controller.run_analysis(request).await?;
    assert_eq!(rows, 4);

    let preview = controller.preview(50);
    assert_eq!(preview[0].display_word, "der Hund");
    assert_eq!(preview[0].count, 2);

    let removed = controller.apply_threshold("1")?;
    assert_eq!(removed, 3);

    let path = dir.path().join("vocab.csv");
    controller.export(&path)?;
    let content = std::fs::read_to_string(&path)?;
    assert_eq!(content.lines().collect::<Vec<_>>(), vec!["word,count,pos", "der Hund,2,NOUN"]);
    Ok(())
}

/// Test that the known-words file is applied during analysis
#[tokio::test]
async fn test_analysis_withKnownWordsFile_shouldExcludeKnownLemmas() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let known = common::create_test_file(dir.path(), "known.csv", "word\nhund\n")?;
    let controller = common::test_controller(common::sample_pages());

    let mut request = AnalysisRequest::from_config(controller.config(), "book.pdf");
    request.known_words_path = Some(known);
    controller.run_analysis(request).await?;

    let table = controller.table().expect("table after analysis");
    let lemmas: Vec<&str> = table.iter().map(|entry| entry.lemma.as_str()).collect();
    assert_eq!(lemmas, vec!["laufen", "schnell", "bellen"]);
    Ok(())
}

/// Test loading the model from the configured model directory
#[tokio::test]
async fn test_analysis_withModelDirectory_shouldLoadLexiconFromDisk() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let mut config = Config::default();
    config.nlp.model_dir = common::create_model_dir(dir.path())?;
    config.include_articles = true;

    let mut controller = Controller::with_config(config)
        .with_page_source(Arc::new(StaticPageSource::new(common::sample_pages())));
    let mut events = controller.subscribe();

    let request = AnalysisRequest::from_config(controller.config(), "book.pdf");
    assert_eq!(controller.run_analysis(request).await?, 4);

    let statuses: Vec<String> = drain(&mut events)
        .into_iter()
        .filter_map(|event| match event {
            SessionEvent::Status(message) => Some(message),
            _ => None,
        })
        .collect();
    assert_eq!(
        statuses,
        vec![
            "Loading language model...",
            "Loading known words...",
            "Reading PDF...",
            "Extracting words from 2 pages...",
        ]
    );
    Ok(())
}

/// Test that a second analysis replaces the first table
#[test]
fn test_analysis_rerun_shouldReplaceTable() -> Result<()> {
    let controller = common::test_controller(common::sample_pages());
    let request = AnalysisRequest::from_config(controller.config(), "book.pdf");

    tokio_test::block_on(async {
        controller.run_analysis(request.clone()).await?;
        controller.apply_min_count(1)?;
        assert_eq!(controller.table().map(|t| t.len()), Some(1));

        controller.run_analysis(request).await?;
        assert_eq!(controller.table().map(|t| t.len()), Some(4));
        Ok::<(), anyhow::Error>(())
    })
}

/// Test unsupported languages and bad thresholds
#[tokio::test]
async fn test_analysis_invalidInput_shouldNotTouchTable() -> Result<()> {
    let controller = common::test_controller(common::sample_pages());

    let mut request = AnalysisRequest::from_config(controller.config(), "book.pdf");
    request.language = "it".to_string();
    assert!(matches!(controller.run_analysis(request).await, Err(AppError::Validation(_))));
    assert!(controller.table().is_none());

    let request = AnalysisRequest::from_config(controller.config(), "book.pdf");
    controller.run_analysis(request).await?;
    let before = controller.table();

    assert!(matches!(controller.apply_threshold("abc"), Err(AppError::Validation(_))));
    assert_eq!(controller.table(), before);
    assert!(!controller.is_busy());
    Ok(())
}

/// Test that a bad minimum count is rejected before the worker reports any step
#[tokio::test]
async fn test_analysis_nonNumericMinCount_shouldFailBeforeAnyStatus() {
    let mut controller = common::test_controller(common::sample_pages());
    let mut events = controller.subscribe();

    let mut request = AnalysisRequest::from_config(controller.config(), "/nonexistent/book.pdf");
    request.min_count = Some("abc".to_string());
    let result = controller.run_analysis(request).await;

    assert!(matches!(result, Err(AppError::Validation(message)) if message.contains("abc")));
    assert!(!drain(&mut events).iter().any(|event| matches!(event, SessionEvent::Status(_))));
    assert!(controller.table().is_none());
}

/// Test that the minimum count is applied as part of the analysis
#[tokio::test]
async fn test_analysis_withMinCount_shouldKeepFrequentWordsOnly() -> Result<()> {
    let controller = common::test_controller(common::sample_pages());

    let mut request = AnalysisRequest::from_config(controller.config(), "book.pdf");
    request.include_articles = true;
    request.min_count = Some(" 1 ".to_string());

    assert_eq!(controller.run_analysis(request).await?, 1);
    let table = controller.table().expect("table after analysis");
    assert_eq!(table.iter().map(|entry| entry.display_word.as_str()).collect::<Vec<_>>(), vec!["der Hund"]);
    Ok(())
}

/// Test that a failed export leaves the table in place
#[tokio::test]
async fn test_export_unsupportedExtension_shouldKeepTable() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let controller = common::test_controller(common::sample_pages());
    let request = AnalysisRequest::from_config(controller.config(), "book.pdf");
    controller.run_analysis(request).await?;

    let result = controller.export(&dir.path().join("vocab.txt"));

    assert!(matches!(result, Err(AppError::Export(_))));
    assert_eq!(controller.table().map(|t| t.len()), Some(4));
    Ok(())
}
