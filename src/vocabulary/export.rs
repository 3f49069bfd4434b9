use log::info;
use rust_xlsxwriter::Workbook;
use std::path::Path;

use crate::errors::AppError;
use crate::file_utils::FileManager;

use super::{VocabularyEntry, VocabularyTable};

const BASE_COLUMNS: [&str; 3] = ["word", "count", "pos"];
const TRANSLATION_COLUMNS: [&str; 3] = ["sentence", "translate_word", "translate_sentence"];

/// Tabular output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    /// Pick the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            _ => Err(AppError::Export(format!(
                "Unsupported export format '{}', use .csv or .xlsx",
                path.display()
            ))),
        }
    }
}

/// Header row for a table
pub fn column_names(table: &VocabularyTable) -> Vec<&'static str> {
    let mut columns = BASE_COLUMNS.to_vec();
    if table.augmented {
        columns.extend(TRANSLATION_COLUMNS);
    }
    columns
}

fn row_cells(entry: &VocabularyEntry, augmented: bool) -> Vec<String> {
    let mut cells = vec![
        entry.display_word.clone(),
        entry.count.to_string(),
        entry.part_of_speech.to_string(),
    ];
    if augmented {
        cells.push(entry.sentence.clone());
        cells.push(entry.translated_word.clone());
        cells.push(entry.translated_sentence.clone());
    }
    cells
}

/// Write the table to `path` as CSV or xlsx, depending on the extension.
///
/// Missing parent directories are created. The table itself is never
/// modified, whether or not the write succeeds.
pub fn export_table(table: &VocabularyTable, path: &Path) -> Result<(), AppError> {
    let format = ExportFormat::from_path(path)?;

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        FileManager::ensure_dir(parent)
            .map_err(|e| AppError::Export(format!("Cannot create {}: {}", parent.display(), e)))?;
    }

    match format {
        ExportFormat::Csv => write_csv(table, path)?,
        ExportFormat::Xlsx => write_xlsx(table, path)?,
    }

    info!("Exported {} words to {}", table.len(), path.display());
    Ok(())
}

fn write_csv(table: &VocabularyTable, path: &Path) -> Result<(), AppError> {
    let export_error = |e: csv::Error| AppError::Export(format!("Cannot write {}: {}", path.display(), e));

    let mut writer = csv::Writer::from_path(path).map_err(export_error)?;
    writer.write_record(column_names(table)).map_err(export_error)?;
    for entry in table {
        writer.write_record(row_cells(entry, table.augmented)).map_err(export_error)?;
    }
    writer
        .flush()
        .map_err(|e| AppError::Export(format!("Cannot write {}: {}", path.display(), e)))
}

fn write_xlsx(table: &VocabularyTable, path: &Path) -> Result<(), AppError> {
    let export_error = |e: rust_xlsxwriter::XlsxError| AppError::Export(format!("Cannot write {}: {}", path.display(), e));

    let mut workbook = Workbook::new();
    {
        let worksheet = workbook.add_worksheet();
        for (col, name) in column_names(table).into_iter().enumerate() {
            worksheet.write_string(0, col as u16, name).map_err(export_error)?;
        }

        for (idx, entry) in table.iter().enumerate() {
            let row = (idx + 1) as u32;
            for (col, cell) in row_cells(entry, table.augmented).into_iter().enumerate() {
                // count is the only numeric column
                if col == 1 {
                    worksheet.write_number(row, col as u16, entry.count as f64).map_err(export_error)?;
                } else {
                    worksheet.write_string(row, col as u16, &cell).map_err(export_error)?;
                }
            }
        }
    }

    workbook.save(path).map_err(export_error)
}
