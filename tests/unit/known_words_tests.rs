/*!
 * Tests for loading the known-words list
 */

use anyhow::Result;
use vocabulator::errors::AppError;
use vocabulator::nlp::PartOfSpeech;
use vocabulator::vocabulary::{build_known_words, export_table, VocabularyEntry, VocabularyTable};
use crate::common;

/// Test a CSV file with a "word" column
#[test]
fn test_buildKnownWords_withCsvWordColumn_shouldLemmatizeCells() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = common::create_test_file(dir.path(), "known.csv", "id,word\n1,Hunde\n2, LÄUFT \n3,\n")?;

    let known = build_known_words(Some(&path), &common::german_tagger(), 100)?;

    assert!(known.contains("hund"));
    assert!(known.contains("laufen"));
    assert_eq!(known.len(), 2);
    Ok(())
}

/// Test that the first column is used without a "word" header
#[test]
fn test_buildKnownWords_withoutWordHeader_shouldUseFirstColumn() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = common::create_test_file(dir.path(), "known.tsv", "lemma\tnote\nKatze\tcat\nbellt\tbarks\n")?;

    let known = build_known_words(Some(&path), &common::german_tagger(), 1)?;

    assert!(known.contains("katze"));
    assert!(known.contains("bellen"));
    assert!(!known.contains("cat"));
    Ok(())
}

/// Test reading a spreadsheet written by the exporter
#[test]
fn test_buildKnownWords_withXlsxFile_shouldReadFirstSheet() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = dir.path().join("known.xlsx");
    let table = VocabularyTable::new(vec![
        VocabularyEntry::new("hund", 3, PartOfSpeech::Noun),
        VocabularyEntry::new("schnell", 1, PartOfSpeech::Adv),
    ]);
    export_table(&table, &path)?;

    let known = build_known_words(Some(&path), &common::german_tagger(), 100)?;

    assert!(known.contains("hund"));
    assert!(known.contains("schnell"));
    Ok(())
}

/// Test that a header-only file is rejected
#[test]
fn test_buildKnownWords_withEmptyColumn_shouldBeFileFormatError() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = common::create_test_file(dir.path(), "known.csv", "word\n\n")?;

    let result = build_known_words(Some(&path), &common::german_tagger(), 100);
    assert!(matches!(result, Err(AppError::FileFormat(_))));
    Ok(())
}

/// Test unsupported and missing files
#[test]
fn test_buildKnownWords_withBadPath_shouldBeFileFormatError() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let text = common::create_test_file(dir.path(), "known.txt", "hund\n")?;
    let missing = dir.path().join("missing.csv");

    let tagger = common::german_tagger();
    assert!(matches!(build_known_words(Some(&text), &tagger, 100), Err(AppError::FileFormat(_))));
    assert!(matches!(build_known_words(Some(&missing), &tagger, 100), Err(AppError::FileFormat(_))));
    Ok(())
}
