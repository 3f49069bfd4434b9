use log::info;

use crate::errors::AppError;

use super::VocabularyTable;

/// Parse a user-supplied threshold; anything but an integer is rejected
pub fn parse_threshold(input: &str) -> Result<i64, AppError> {
    let trimmed = input.trim();
    trimmed
        .parse::<i64>()
        .map_err(|_| AppError::Validation(format!("Threshold must be an integer, got '{}'", trimmed)))
}

/// Remove every row whose count is less than or equal to `min_count_exclusive`.
///
/// Rows with a count exactly equal to the threshold are removed. Row order is
/// preserved, so the table stays sorted. Returns the number of removed rows.
pub fn apply_threshold(table: &mut VocabularyTable, min_count_exclusive: i64) -> usize {
    let before = table.len();
    table.retain(|entry| i128::from(entry.count) > i128::from(min_count_exclusive));
    let removed = before - table.len();

    info!("Threshold {} removed {} of {} words", min_count_exclusive, removed, before);
    removed
}
