//! Pipeline configuration

use crate::extract::{PageFailure, DEFAULT_OCR_DPI};
use std::path::PathBuf;
use std::time::Duration;

/// Tunables for a discovery run.
///
/// Defaults suit an unattended run against the slow public source: a shared
/// data directory under the platform data dir, a per-location fetch timeout,
/// and a small worker pool per breadth-first level.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Root under which documents, page text, predicate lists, and catalog
    /// archives are persisted.
    pub data_dir: PathBuf,
    /// Timeout for each candidate-location fetch attempt.
    pub fetch_timeout: Duration,
    /// Rasterization resolution for the recognition fallback.
    pub ocr_dpi: u32,
    /// Worker-pool width within one breadth-first level.
    pub concurrency: usize,
    /// Whole-document handling of a page that fails both extraction paths.
    pub page_failure: PageFailure,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            fetch_timeout: Duration::from_secs(60),
            ocr_dpi: DEFAULT_OCR_DPI,
            concurrency: 4,
            page_failure: PageFailure::default(),
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_ocr_dpi(mut self, dpi: u32) -> Self {
        self.ocr_dpi = dpi;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_page_failure(mut self, policy: PageFailure) -> Self {
        self.page_failure = policy;
        self
    }

    /// Where per-number document state lives.
    pub fn document_root(&self) -> PathBuf {
        self.data_dir.join("documents")
    }

    /// Where bulk catalog archives are cached.
    pub fn catalog_root(&self) -> PathBuf {
        self.data_dir.join("db").join("510k")
    }
}

/// The default data directory (`<platform data dir>/lineage`).
pub fn default_data_dir() -> PathBuf {
    let base = dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"));
    base.join("lineage")
}
