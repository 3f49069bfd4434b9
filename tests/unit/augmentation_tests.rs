/*!
 * Tests for augmenting aggregated tables with mock providers
 */

use vocabulator::app_config::ModelPricing;
use vocabulator::errors::TranslationError;
use vocabulator::language_utils::LanguageProfile;
use vocabulator::providers::mock::MockProvider;
use vocabulator::translation::{estimate_cost, PromptTemplate, VocabularyAugmenter};
use vocabulator::vocabulary::{Aggregator, KnownWordsSet, VocabularyTable};
use crate::common;

fn aggregated_table() -> VocabularyTable {
    let tagger = common::german_tagger();
    let pages = vec![
        "Der Hund läuft schnell. Die Katze schläft im Haus.".to_string(),
        "Der Hund bellt. Die Katze ist groß.".to_string(),
    ];
    Aggregator::new(&tagger, 20)
        .aggregate(&pages, &KnownWordsSet::new(), true, &LanguageProfile::german())
        .unwrap()
}

/// Test that display words with articles are sent and merged back
#[tokio::test]
async fn test_augment_aggregatedTable_shouldSendDisplayWords() {
    let mock = MockProvider::working();
    let mut table = aggregated_table();
    let augmenter = VocabularyAugmenter::new(mock.clone(), 20);

    let report = augmenter.augment(&mut table, "German", "English", |_, _| {}).await.unwrap();

    let sent = mock.word_lists();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0][0], "der Hund");
    assert!(sent[0].contains(&"die Katze".to_string()));
    assert_eq!(report.filled_rows, table.len());
    assert!(table.iter().all(|entry| entry.is_augmented()));

    let hund = table.get("hund").unwrap();
    assert_eq!(hund.sentence, "Ein Satz mit der Hund.");
    assert_eq!(hund.translated_word, "der Hund (translated)");
}

/// Test that fenced JSON is accepted
#[tokio::test]
async fn test_augment_fencedResponse_shouldBeParsed() {
    let mut table = aggregated_table();
    let augmenter = VocabularyAugmenter::new(MockProvider::fenced(), 3);

    let report = augmenter.augment(&mut table, "German", "English", |_, _| {}).await.unwrap();

    assert!(report.is_complete());
    assert_eq!(report.filled_rows, table.len());
}

/// Test that failing batches only blank their own rows
#[tokio::test]
async fn test_augment_intermittentFailures_shouldReportFailedBatches() {
    let mut table = aggregated_table();
    let rows = table.len();
    let augmenter = VocabularyAugmenter::new(MockProvider::intermittent(2), 2);

    let report = augmenter.augment(&mut table, "German", "English", |_, _| {}).await.unwrap();

    let failed: Vec<usize> = report.failures.iter().map(|failure| failure.batch).collect();
    assert_eq!(failed, vec![2, 4]);
    assert!(failed.iter().all(|batch| *batch <= report.total_batches));

    for (index, entry) in table.iter().enumerate() {
        let batch = index / 2 + 1;
        assert_eq!(entry.is_augmented(), !failed.contains(&batch), "row {}", index);
    }
    assert_eq!(report.filled_rows, rows - table.iter().filter(|e| !e.is_augmented()).count());
    assert!(matches!(report.failures[0].error, TranslationError::Provider(_)));
}

/// Test that concurrency does not change the merged table
#[tokio::test]
async fn test_augment_slowConcurrentBatches_shouldMatchSerialResult() {
    let mut serial = aggregated_table();
    let mut concurrent = aggregated_table();

    VocabularyAugmenter::new(MockProvider::working(), 2)
        .augment(&mut serial, "German", "English", |_, _| {})
        .await
        .unwrap();
    VocabularyAugmenter::new(MockProvider::slow(20), 2)
        .with_concurrency(4)
        .augment(&mut concurrent, "German", "English", |_, _| {})
        .await
        .unwrap();

    assert_eq!(serial, concurrent);
}

/// Test that an empty answer fails the batch instead of the run
#[tokio::test]
async fn test_augment_emptyResponse_shouldLeaveTableUnfilled() {
    let mut table = aggregated_table();
    let augmenter = VocabularyAugmenter::new(MockProvider::empty(), 20);

    let report = augmenter.augment(&mut table, "German", "English", |_, _| {}).await.unwrap();

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.filled_rows, 0);
    assert!(table.iter().all(|entry| !entry.is_augmented()));
    assert!(table.augmented);
}

/// Test that the system prompt names both languages
#[test]
fn test_promptTemplate_render_shouldFillLanguages() {
    let prompt = PromptTemplate::dictionary_assistant().render("German", "English");

    assert!(prompt.contains("German"));
    assert!(prompt.contains("English"));
    assert!(!prompt.contains("{source_language}"));
}

/// Test the estimate for the aggregated table
#[test]
fn test_estimateCost_aggregatedTable_shouldCountBatches() {
    let table = aggregated_table();
    let pricing = ModelPricing::new("gpt-4o-mini", 0.15, 0.60);

    let estimate = estimate_cost(table.len(), 2, Some(&pricing));

    assert_eq!(estimate.words, table.len());
    assert_eq!(estimate.batches, table.len().div_ceil(2));
    assert!(estimate.cost_usd.unwrap() > 0.0);
    assert_eq!(estimate_cost(table.len(), 2, None).display_cost(), "unknown");
}
