//! The per-number discovery pipeline
//!
//! One endpoint computes a number's predicate set: fetch the document,
//! extract its pages, scan for citations, persist. Every step is cached, so
//! the endpoint is idempotent — a second call for the same number touches
//! neither the network nor the extractor.
//!
//! The graph builder consumes the pipeline through [`PredicateSource`],
//! which folds the three possible outcomes into a tagged [`Expansion`]
//! instead of exception-style control flow: a document-level failure is data
//! the builder turns into a dead-end edge, not an abort.

use crate::approval::ApprovalId;
use crate::config::PipelineConfig;
use crate::extract::{ExtractError, TesseractOcr, TextExtractor};
use crate::parse::PredicateParser;
use crate::store::{DocumentStore, FetchError, HttpFetcher, StorageLayout, StoreError};
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not build HTTP client: {0}")]
    Client(#[from] FetchError),
}

/// Result type for discovery operations.
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

/// Outcome of expanding one number.
#[derive(Debug, Clone)]
pub enum Expansion {
    /// The document cites these predicates.
    Cited(BTreeSet<ApprovalId>),
    /// The document exists (or provably does not) and cites nothing.
    DeadEnd,
    /// The document could not be read end to end.
    Failed(String),
}

/// Anything that can expand a number into its predicate set.
///
/// The production implementation is [`DiscoveryPipeline`]; graph-builder
/// tests substitute synthetic citation relations.
#[async_trait]
pub trait PredicateSource: Send + Sync {
    async fn expand(&self, id: &ApprovalId) -> Expansion;
}

/// Wires store, extractor, and parser over one shared data directory.
pub struct DiscoveryPipeline {
    store: DocumentStore,
    extractor: TextExtractor,
    parser: PredicateParser,
    /// Serializes pipeline work per number so concurrent expansions of the
    /// same number cannot duplicate fetch or extraction work. Distinct
    /// numbers proceed in parallel.
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl DiscoveryPipeline {
    pub fn new(store: DocumentStore, extractor: TextExtractor, parser: PredicateParser) -> Self {
        Self {
            store,
            extractor,
            parser,
            locks: DashMap::new(),
        }
    }

    /// Assemble the production pipeline from configuration: HTTPS fetcher,
    /// command-line recognition engine, shared document layout.
    pub fn from_config(config: &PipelineConfig) -> DiscoveryResult<Self> {
        let layout = StorageLayout::new(config.document_root());
        let fetcher = Arc::new(HttpFetcher::new(config.fetch_timeout)?);
        let ocr = Arc::new(TesseractOcr::new().with_dpi(config.ocr_dpi));
        let store = DocumentStore::new(layout.clone(), fetcher);
        let extractor =
            TextExtractor::new(layout.clone(), ocr).with_page_failure(config.page_failure);
        let parser = PredicateParser::new(layout);
        Ok(Self::new(store, extractor, parser))
    }

    /// The predicate set of `id`, computed on first call and cached on disk.
    pub async fn predicates_of(&self, id: &ApprovalId) -> DiscoveryResult<BTreeSet<ApprovalId>> {
        let lock = self
            .locks
            .entry(id.as_str().to_string())
            .or_default()
            .clone();
        let _guard = lock.lock().await;

        if let Some(cached) = self.parser.cached(id)? {
            debug!(id = %id, predicates = cached.len(), "predicate set already on disk");
            return Ok(cached);
        }

        let handle = self.store.fetch(id).await?;
        let pages = self.extractor.all_pages_text(&handle).await?;
        let predicates = PredicateParser::scan(id, &pages);
        self.parser.persist(id, &predicates)?;
        debug!(id = %id, pages = pages.len(), predicates = predicates.len(), "scanned document");
        Ok(predicates)
    }
}

#[async_trait]
impl PredicateSource for DiscoveryPipeline {
    async fn expand(&self, id: &ApprovalId) -> Expansion {
        match self.predicates_of(id).await {
            Ok(predicates) if predicates.is_empty() => Expansion::DeadEnd,
            Ok(predicates) => Expansion::Cited(predicates),
            Err(e) => {
                warn!(id = %id, error = %e, "expansion failed; treating as dead end");
                Expansion::Failed(e.to_string())
            }
        }
    }
}
