/*!
 * Integration tests for translating a vocabulary table through the controller
 */

use anyhow::Result;
use std::time::Duration;
use vocabulator::app_config::TranslationProvider;
use vocabulator::app_controller::{AnalysisRequest, Controller, SessionEvent};
use vocabulator::errors::AppError;
use vocabulator::providers::mock::MockProvider;
use vocabulator::translation::VocabularyAugmenter;
use crate::common;

async fn analyzed_controller() -> Result<Controller> {
    let controller = common::test_controller(common::sample_pages());
    let mut request = AnalysisRequest::from_config(controller.config(), "book.pdf");
    request.include_articles = true;
    controller.run_analysis(request).await?;
    Ok(controller)
}

/// Test the full flow: analyze, translate, export with six columns
#[tokio::test]
async fn test_augmentWith_workingMock_shouldExportTranslatedColumns() -> Result<()> {
    common::init_logging();
    let dir = common::create_temp_dir()?;
    let mut controller = analyzed_controller().await?;
    let mut events = controller.subscribe();
    let augmenter = VocabularyAugmenter::new(MockProvider::working(), 2);

    let report = controller.augment_with(&augmenter, "en").await?;
    assert!(report.is_complete());
    assert_eq!(report.total_batches, 2);

    let mut progress = Vec::new();
    let mut completed = false;
    while let Ok(event) = events.try_recv() {
        match event {
            SessionEvent::Progress { done, total } => progress.push((done, total)),
            SessionEvent::Completed(_) => completed = true,
            _ => {}
        }
    }
    assert_eq!(progress, vec![(1, 2), (2, 2)]);
    assert!(completed);

    let path = dir.path().join("vocab.csv");
    controller.export(&path)?;
    let mut reader = csv::Reader::from_path(&path)?;
    assert_eq!(
        reader.headers()?.iter().collect::<Vec<_>>(),
        vec!["word", "count", "pos", "sentence", "translate_word", "translate_sentence"]
    );
    let first = reader.records().next().expect("one row")?;
    assert_eq!(&first[0], "der Hund");
    assert_eq!(&first[4], "der Hund (translated)");
    Ok(())
}

/// Test that a failing provider keeps the rows and reports every batch
#[tokio::test]
async fn test_augmentWith_failingMock_shouldKeepRowsUntranslated() -> Result<()> {
    let controller = analyzed_controller().await?;
    let augmenter = VocabularyAugmenter::new(MockProvider::failing(), 20);

    let report = controller.augment_with(&augmenter, "en").await?;

    assert_eq!(report.failures.len(), 1);
    let table = controller.table().expect("table kept");
    assert_eq!(table.len(), 4);
    assert!(table.iter().all(|entry| !entry.is_augmented()));
    Ok(())
}

/// Test that other operations are rejected while a translation runs
#[tokio::test]
async fn test_augmentWith_inFlight_shouldRejectConcurrentExport() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let controller = analyzed_controller().await?;
    let augmenter = VocabularyAugmenter::new(MockProvider::slow(200), 20);
    let path = dir.path().join("vocab.csv");

    let (report, export) = tokio::join!(controller.augment_with(&augmenter, "en"), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        let busy = controller.is_busy();
        (busy, controller.export(&path), controller.apply_threshold("1"))
    });

    let (was_busy, export_result, threshold_result) = export;
    assert!(was_busy);
    assert!(matches!(export_result, Err(AppError::Busy)));
    assert!(matches!(threshold_result, Err(AppError::Busy)));
    assert!(report?.is_complete());
    assert!(!controller.is_busy());
    assert!(!path.exists());
    Ok(())
}

/// Test translation without an analysis
#[tokio::test]
async fn test_augmentWith_noTable_shouldBeValidationError() {
    let controller = common::test_controller(common::sample_pages());
    let augmenter = VocabularyAugmenter::new(MockProvider::working(), 20);

    let result = controller.augment_with(&augmenter, "en").await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(!controller.is_busy());
}

/// Test that a hosted provider without an API key is rejected up front
#[tokio::test]
async fn test_buildAugmenter_missingApiKey_shouldBeValidationError() -> Result<()> {
    let controller = analyzed_controller().await?;
    assert_eq!(controller.config().translation.provider, TranslationProvider::OpenAI);

    let result = controller.build_augmenter();

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(controller.estimate().is_some());
    Ok(())
}

/// Test that translation settings can be rejected before any analysis starts
#[tokio::test]
async fn test_checkTranslationSettings_missingApiKey_shouldFailWithoutEvents() {
    let mut controller = common::test_controller(common::sample_pages());
    let mut events = controller.subscribe();

    let result = controller.check_translation_settings();

    assert!(matches!(result, Err(AppError::Validation(message)) if message.contains("API key")));
    assert!(events.try_recv().is_err());
    assert!(controller.table().is_none());
}
