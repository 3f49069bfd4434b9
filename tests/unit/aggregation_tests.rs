/*!
 * Tests for word counting and ranking
 */

use vocabulator::language_utils::LanguageProfile;
use vocabulator::nlp::PartOfSpeech;
use vocabulator::vocabulary::{Aggregator, KnownWordsSet, VocabularyTable};
use crate::common;

fn aggregate(pages: &[String], known: &KnownWordsSet, include_articles: bool) -> VocabularyTable {
    let tagger = common::german_tagger();
    Aggregator::new(&tagger, 20)
        .aggregate(pages, known, include_articles, &LanguageProfile::german())
        .unwrap()
}

fn words(table: &VocabularyTable) -> Vec<(&str, u64)> {
    table.iter().map(|entry| (entry.display_word.as_str(), entry.count)).collect()
}

/// Test the reference document with articles
#[test]
fn test_aggregate_withArticles_shouldPrefixNounsAndRankByCount() {
    let table = aggregate(&common::sample_pages(), &KnownWordsSet::new(), true);

    assert_eq!(
        words(&table),
        vec![("der Hund", 2), ("laufen", 1), ("schnell", 1), ("bellen", 1)]
    );
    assert_eq!(table.entries()[0].part_of_speech, PartOfSpeech::Noun);
    assert_eq!(table.entries()[1].part_of_speech, PartOfSpeech::Verb);
    assert_eq!(table.entries()[2].part_of_speech, PartOfSpeech::Adv);
}

/// Test that articles are left out when not requested
#[test]
fn test_aggregate_withoutArticles_shouldUseBareLemma() {
    let table = aggregate(&common::sample_pages(), &KnownWordsSet::new(), false);

    assert_eq!(table.entries()[0].display_word, "Hund");
    assert_eq!(table.entries()[0].gender, None);
}

/// Test exclusion of known words
#[test]
fn test_aggregate_withKnownWord_shouldExcludeItEverywhere() {
    let known: KnownWordsSet = ["hund"].into_iter().collect();
    let table = aggregate(&common::sample_pages(), &known, true);

    assert_eq!(words(&table), vec![("laufen", 1), ("schnell", 1), ("bellen", 1)]);
    assert!(table.get("hund").is_none());
}

/// Test that inflected forms share one row
#[test]
fn test_aggregate_withInflectedForms_shouldCountOneLemma() {
    let pages = vec!["Die Hunde laufen. Der Hund läuft.".to_string()];
    let table = aggregate(&pages, &KnownWordsSet::new(), true);

    assert_eq!(words(&table), vec![("der Hund", 2), ("laufen", 2)]);
}

/// Test that stopwords, short lemmas and function words never count
#[test]
fn test_aggregate_withFunctionWords_shouldSkipThem() {
    let pages = vec!["Die Katze und der Hund schläft im Haus 42".to_string()];
    let table = aggregate(&pages, &KnownWordsSet::new(), true);

    assert_eq!(
        words(&table),
        vec![("die Katze", 1), ("der Hund", 1), ("schlafen", 1), ("das Haus", 1)]
    );
}

/// Test that the page order does not change the counts
#[test]
fn test_aggregate_pageOrder_shouldNotChangeCounts() {
    let pages = vec![
        "Der Hund bellt. Die Katze schläft.".to_string(),
        "Der Hund läuft schnell.".to_string(),
        "Die Katze läuft. Der Hund bellt.".to_string(),
    ];
    let mut reversed = pages.clone();
    reversed.reverse();

    let forward = aggregate(&pages, &KnownWordsSet::new(), true);
    let backward = aggregate(&reversed, &KnownWordsSet::new(), true);

    let mut forward_counts: Vec<(String, u64)> =
        forward.iter().map(|e| (e.lemma.clone(), e.count)).collect();
    let mut backward_counts: Vec<(String, u64)> =
        backward.iter().map(|e| (e.lemma.clone(), e.count)).collect();
    forward_counts.sort();
    backward_counts.sort();

    assert_eq!(forward_counts, backward_counts);
    assert!(forward.is_sorted_by_count());
    assert!(backward.is_sorted_by_count());
}

/// Test that the page batch size has no effect on the result
#[test]
fn test_aggregate_pageBatchSize_shouldNotChangeResult() {
    let tagger = common::german_tagger();
    let pages: Vec<String> = (0..7)
        .map(|i| if i % 2 == 0 { "Der Hund bellt.".to_string() } else { "Die Katze läuft.".to_string() })
        .collect();

    let profile = LanguageProfile::german();
    let one = Aggregator::new(&tagger, 1)
        .aggregate(&pages, &KnownWordsSet::new(), true, &profile)
        .unwrap();
    let many = Aggregator::new(&tagger, 20)
        .aggregate(&pages, &KnownWordsSet::new(), true, &profile)
        .unwrap();

    assert_eq!(one, many);
    assert_eq!(one.get("hund").map(|e| e.count), Some(4));
}

/// Test that excluding the same words twice is the same as once
#[test]
fn test_aggregate_knownWordsSubset_shouldOnlyDropListedLemmas() {
    let full = aggregate(&common::sample_pages(), &KnownWordsSet::new(), true);
    let known: KnownWordsSet = ["laufen", "bellen"].into_iter().collect();
    let filtered = aggregate(&common::sample_pages(), &known, true);

    let expected: Vec<_> = full
        .iter()
        .filter(|entry| !known.contains(&entry.lemma))
        .cloned()
        .collect();
    assert_eq!(filtered.entries(), expected.as_slice());
}

/// Test the empty document
#[test]
fn test_aggregate_noPages_shouldReturnEmptyTable() {
    let table = aggregate(&[], &KnownWordsSet::new(), true);
    assert!(table.is_empty());
}
