use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    /// Write a string to a file, creating parent directories
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        if let Some(parent) = path.as_ref().parent().filter(|p| !p.as_os_str().is_empty()) {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))
    }

    /// Classify a file by its extension
    pub fn tabular_kind<P: AsRef<Path>>(path: P) -> TabularKind {
        let extension = path
            .as_ref()
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => TabularKind::Csv,
            "tsv" | "tab" => TabularKind::Tsv,
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => TabularKind::Spreadsheet,
            "pdf" => TabularKind::Pdf,
            _ => TabularKind::Unknown,
        }
    }
}

/// File kinds the pipeline reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabularKind {
    /// Comma-separated values
    Csv,
    /// Tab-separated values
    Tsv,
    /// Excel or OpenDocument workbook
    Spreadsheet,
    /// PDF document
    Pdf,
    /// Anything else
    Unknown,
}
