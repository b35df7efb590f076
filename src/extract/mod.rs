//! Per-page text extraction
//!
//! Two paths produce text: the document's embedded text layer, read first,
//! and optical recognition over a rasterized page when the embedded layer is
//! missing or blank. Whatever a path produces is persisted per page, so
//! extraction runs at most once per page across all runs.

mod ocr;

pub use ocr::{OcrEngine, OcrError, TesseractOcr, DEFAULT_OCR_DPI};

use crate::store::{DocumentHandle, StorageLayout};
use lopdf::Document;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("document is not readable: {0}")]
    Document(#[from] lopdf::Error),
    #[error(transparent)]
    Ocr(#[from] OcrError),
}

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// What to do when a page fails both extraction paths while collecting a
/// whole document's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageFailure {
    /// One unreadable page makes the whole document unreadable.
    #[default]
    FailDocument,
    /// Unreadable pages contribute no text; the rest of the document stands.
    SkipPage,
}

/// Extracts and caches per-page text for stored documents.
pub struct TextExtractor {
    layout: StorageLayout,
    ocr: Arc<dyn OcrEngine>,
    page_failure: PageFailure,
}

impl TextExtractor {
    pub fn new(layout: StorageLayout, ocr: Arc<dyn OcrEngine>) -> Self {
        Self {
            layout,
            ocr,
            page_failure: PageFailure::default(),
        }
    }

    pub fn with_page_failure(mut self, policy: PageFailure) -> Self {
        self.page_failure = policy;
        self
    }

    /// Number of pages in the stored document; 0 for a placeholder.
    pub fn page_count(&self, handle: &DocumentHandle) -> ExtractResult<usize> {
        if handle.is_empty() {
            return Ok(0);
        }
        let doc = Document::load(handle.path())?;
        Ok(doc.get_pages().len())
    }

    /// Text of one zero-based page, extracting it on first use.
    pub async fn page_text(&self, handle: &DocumentHandle, page: usize) -> ExtractResult<String> {
        let text_path = self.layout.page_text_path(handle.id(), page);
        if text_path.exists() {
            return Ok(tokio::fs::read_to_string(&text_path).await?);
        }
        let doc = Document::load(handle.path())?;
        self.extract_page(&doc, handle, page).await
    }

    /// Ordered per-page text for the whole document.
    ///
    /// A placeholder document yields an empty sequence — the signal that
    /// there genuinely was nothing to scan. A page failing both extraction
    /// paths is handled per the configured [`PageFailure`] policy.
    pub async fn all_pages_text(&self, handle: &DocumentHandle) -> ExtractResult<Vec<String>> {
        if handle.is_empty() {
            return Ok(Vec::new());
        }
        let doc = Document::load(handle.path())?;
        let count = doc.get_pages().len();
        let mut pages = Vec::with_capacity(count);
        for page in 0..count {
            let text_path = self.layout.page_text_path(handle.id(), page);
            let result = if text_path.exists() {
                tokio::fs::read_to_string(&text_path)
                    .await
                    .map_err(ExtractError::from)
            } else {
                self.extract_page(&doc, handle, page).await
            };
            match result {
                Ok(text) => pages.push(text),
                Err(e) => match self.page_failure {
                    PageFailure::FailDocument => return Err(e),
                    PageFailure::SkipPage => {
                        warn!(id = %handle.id(), page, error = %e, "skipping unreadable page");
                    }
                },
            }
        }
        Ok(pages)
    }

    /// Run the embedded-text path, then the recognition fallback, persisting
    /// whichever succeeds. Blank embedded text counts as a miss: scanned
    /// documents often carry an empty text layer.
    async fn extract_page(
        &self,
        doc: &Document,
        handle: &DocumentHandle,
        page: usize,
    ) -> ExtractResult<String> {
        let text_path = self.layout.page_text_path(handle.id(), page);

        match doc.extract_text(&[(page + 1) as u32]) {
            Ok(text) if !text.trim().is_empty() => {
                tokio::fs::write(&text_path, &text).await?;
                return Ok(text);
            }
            Ok(_) => {
                debug!(id = %handle.id(), page, "embedded text layer is blank");
            }
            Err(e) => {
                debug!(id = %handle.id(), page, error = %e, "embedded text extraction failed");
            }
        }

        debug!(id = %handle.id(), page, "falling back to optical recognition");
        let text = self.ocr.recognize(handle.path(), page).await?;
        tokio::fs::write(&text_path, &text).await?;
        Ok(text)
    }
}
