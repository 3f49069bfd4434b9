/*!
 * Tests for frequency threshold filtering
 */

use vocabulator::errors::AppError;
use vocabulator::nlp::PartOfSpeech;
use vocabulator::vocabulary::{apply_threshold, parse_threshold, VocabularyEntry, VocabularyTable};

fn table(counts: &[u64]) -> VocabularyTable {
    VocabularyTable::new(
        counts
            .iter()
            .enumerate()
            .map(|(i, count)| VocabularyEntry::new(format!("wort{}", i), *count, PartOfSpeech::Noun))
            .collect(),
    )
}

/// Test that rows equal to the threshold are removed
#[test]
fn test_applyThreshold_withOne_shouldKeepCountsAboveOne() {
    let mut table = table(&[5, 2, 1, 1]);

    let removed = apply_threshold(&mut table, 1);

    assert_eq!(removed, 2);
    assert_eq!(table.counts(), vec![5, 2]);
    assert!(table.is_sorted_by_count());
}

/// Test that zero and negative thresholds keep everything
#[test]
fn test_applyThreshold_withNonPositive_shouldKeepAllRows() {
    let mut zero = table(&[3, 1]);
    let mut negative = table(&[3, 1]);

    assert_eq!(apply_threshold(&mut zero, 0), 0);
    assert_eq!(apply_threshold(&mut negative, -5), 0);
    assert_eq!(zero.len(), 2);
    assert_eq!(negative.len(), 2);
}

/// Test that applying the same threshold twice changes nothing more
#[test]
fn test_applyThreshold_twice_shouldBeIdempotent() {
    let mut once = table(&[9, 4, 4, 2, 1]);
    apply_threshold(&mut once, 2);
    let snapshot = once.clone();

    assert_eq!(apply_threshold(&mut once, 2), 0);
    assert_eq!(once, snapshot);
}

/// Test a threshold above every count
#[test]
fn test_applyThreshold_aboveMax_shouldEmptyTable() {
    let mut table = table(&[3, 2]);
    assert_eq!(apply_threshold(&mut table, 3), 2);
    assert!(table.is_empty());
}

/// Test parsing of user input
#[test]
fn test_parseThreshold_shouldAcceptIntegersOnly() {
    assert_eq!(parse_threshold("1").unwrap(), 1);
    assert_eq!(parse_threshold(" 12 ").unwrap(), 12);
    assert_eq!(parse_threshold("-3").unwrap(), -3);

    for input in ["", "abc", "1.5", "2x"] {
        assert!(matches!(parse_threshold(input), Err(AppError::Validation(_))), "input {:?}", input);
    }
}
