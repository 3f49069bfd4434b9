/*!
 * PDF text source.
 *
 * Turns a PDF file into an ordered list of per-page plain-text strings.
 * The vocabulary pipeline only sees the `PageSource` trait so hosts and
 * tests can supply text from elsewhere.
 */

use log::{debug, warn};
use lopdf::Document;
use std::path::Path;

use crate::errors::AppError;

/// Source of per-page plain text for a document
pub trait PageSource: Send + Sync {
    /// Read every page of the document, in page order
    fn read_pages(&self, path: &Path) -> Result<Vec<String>, AppError>;
}

/// `PageSource` backed by lopdf
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfPageSource;

impl LopdfPageSource {
    pub fn new() -> Self {
        Self
    }
}

impl PageSource for LopdfPageSource {
    fn read_pages(&self, path: &Path) -> Result<Vec<String>, AppError> {
        if !path.is_file() {
            return Err(AppError::FileFormat(format!("PDF file not found: {}", path.display())));
        }

        let document = Document::load(path)
            .map_err(|e| AppError::FileFormat(format!("Cannot open PDF {}: {}", path.display(), e)))?;

        // get_pages() is keyed by page number, so iteration is in page order
        let pages = document.get_pages();
        debug!("PDF {} has {} pages", path.display(), pages.len());

        let mut texts = Vec::with_capacity(pages.len());
        for page_number in pages.keys() {
            match document.extract_text(&[*page_number]) {
                Ok(text) => texts.push(text),
                Err(e) => {
                    // Pages without a text layer still count as (empty) pages
                    warn!("No text extracted from page {} of {}: {}", page_number, path.display(), e);
                    texts.push(String::new());
                }
            }
        }

        Ok(texts)
    }
}

/// `PageSource` over pages that are already in memory
#[derive(Debug, Default, Clone)]
pub struct StaticPageSource {
    pages: Vec<String>,
}

impl StaticPageSource {
    pub fn new(pages: Vec<String>) -> Self {
        Self { pages }
    }
}

impl PageSource for StaticPageSource {
    fn read_pages(&self, _path: &Path) -> Result<Vec<String>, AppError> {
        Ok(self.pages.clone())
    }
}
