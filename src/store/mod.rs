//! Document acquisition and on-disk layout
//!
//! Every expensive pipeline step persists its output under a directory keyed
//! by the clearance number's (kind, year, sequence) triple. The store itself
//! handles acquisition: each number has a fixed list of candidate locations,
//! tried in priority order, and a number confirmed unavailable is remembered
//! as a zero-length placeholder so it is never fetched again.

mod http;

pub use http::{DocumentFetcher, FetchError, HttpFetcher};

use crate::approval::ApprovalId;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors raised by local store operations.
///
/// Remote failures are not represented here: a location that cannot be
/// reached just means "try the next one", and total exhaustion is recorded
/// as a placeholder rather than surfaced as an error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Derives the on-disk location of everything persisted for one number.
///
/// Layout under the root: `<kind>/<yy>/<seq>/` holding the document file,
/// one text file per page, and the predicate list.
#[derive(Debug, Clone)]
pub struct StorageLayout {
    root: PathBuf,
}

impl StorageLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding all persisted state for `id`.
    pub fn document_dir(&self, id: &ApprovalId) -> PathBuf {
        self.root
            .join(id.kind())
            .join(id.year_digits())
            .join(id.sequence_digits())
    }

    /// Path of the source document (possibly a zero-length placeholder).
    pub fn document_path(&self, id: &ApprovalId) -> PathBuf {
        self.document_dir(id).join(format!("{}.pdf", id))
    }

    /// Path of the extracted text for one zero-based page number.
    pub fn page_text_path(&self, id: &ApprovalId, page: usize) -> PathBuf {
        self.document_dir(id).join(format!("page_{:03}.txt", page))
    }

    /// Path of the persisted predicate list.
    pub fn predicates_path(&self, id: &ApprovalId) -> PathBuf {
        self.document_dir(id).join("predicates")
    }

    /// Create the identifier's directory if missing.
    pub fn ensure_dir(&self, id: &ApprovalId) -> StoreResult<PathBuf> {
        let dir = self.document_dir(id);
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

/// A document in one of its two fetched states.
#[derive(Debug, Clone)]
pub struct DocumentHandle {
    id: ApprovalId,
    path: PathBuf,
    empty: bool,
}

impl DocumentHandle {
    /// The number this document belongs to.
    pub fn id(&self) -> &ApprovalId {
        &self.id
    }

    /// Where the document lives on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True when the document is a placeholder: confirmed unavailable.
    pub fn is_empty(&self) -> bool {
        self.empty
    }
}

/// Candidate remote locations for a number's document, in priority order.
fn candidate_urls(id: &ApprovalId) -> Vec<String> {
    vec![
        format!(
            "https://www.accessdata.fda.gov/cdrh_docs/pdf{}/{}.pdf",
            id.year_digits(),
            id
        ),
        format!("https://www.accessdata.fda.gov/cdrh_docs/pdf/{}.pdf", id),
    ]
}

/// Fetches and caches source documents.
pub struct DocumentStore {
    layout: StorageLayout,
    fetcher: Arc<dyn DocumentFetcher>,
}

impl DocumentStore {
    pub fn new(layout: StorageLayout, fetcher: Arc<dyn DocumentFetcher>) -> Self {
        Self { layout, fetcher }
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    /// Return the document for `id`, fetching it on first use.
    ///
    /// A file already on disk — real or placeholder — is returned without any
    /// network access. Otherwise each candidate location is tried in order;
    /// the first that yields content is persisted. When every location fails,
    /// a zero-length placeholder is written so the miss is remembered, and an
    /// empty handle is returned. Exhaustion is an expected outcome, not an
    /// error.
    pub async fn fetch(&self, id: &ApprovalId) -> StoreResult<DocumentHandle> {
        self.layout.ensure_dir(id)?;
        let path = self.layout.document_path(id);

        if let Ok(meta) = tokio::fs::metadata(&path).await {
            debug!(id = %id, "document already on disk");
            return Ok(DocumentHandle {
                id: id.clone(),
                path,
                empty: meta.len() == 0,
            });
        }

        // The terminal sentinel has no document anywhere; resolve it straight
        // to a placeholder.
        if !id.is_terminal() {
            for url in candidate_urls(id) {
                match self.fetcher.fetch(&url).await {
                    Ok(bytes) if !bytes.is_empty() => {
                        tokio::fs::write(&path, &bytes).await?;
                        info!(id = %id, url = %url, bytes = bytes.len(), "downloaded document");
                        return Ok(DocumentHandle {
                            id: id.clone(),
                            path,
                            empty: false,
                        });
                    }
                    Ok(_) => {
                        debug!(id = %id, url = %url, "location returned an empty body");
                    }
                    Err(e) => {
                        debug!(id = %id, url = %url, error = %e, "location failed");
                    }
                }
            }
            warn!(id = %id, "no public document found; writing placeholder");
        }

        tokio::fs::write(&path, b"").await?;
        Ok(DocumentHandle {
            id: id.clone(),
            path,
            empty: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Serves canned bodies by URL and counts every fetch attempt.
    struct CannedFetcher {
        bodies: Mutex<HashMap<String, Vec<u8>>>,
        calls: AtomicUsize,
    }

    impl CannedFetcher {
        fn new() -> Self {
            Self {
                bodies: Mutex::new(HashMap::new()),
                calls: AtomicUsize::new(0),
            }
        }

        fn serve(self, url: &str, body: &[u8]) -> Self {
            self.bodies
                .lock()
                .unwrap()
                .insert(url.to_string(), body.to_vec());
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DocumentFetcher for CannedFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.bodies
                .lock()
                .unwrap()
                .get(url)
                .cloned()
                .ok_or(FetchError::Status {
                    status: 404,
                    url: url.to_string(),
                })
        }
    }

    fn store_with(fetcher: CannedFetcher) -> (tempfile::TempDir, DocumentStore, Arc<CannedFetcher>) {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(fetcher);
        let store = DocumentStore::new(StorageLayout::new(dir.path()), fetcher.clone());
        (dir, store, fetcher)
    }

    #[test]
    fn layout_keys_by_kind_year_sequence() {
        let layout = StorageLayout::new("/data");
        let id = ApprovalId::parse("K173585").unwrap();
        assert_eq!(
            layout.document_path(&id),
            PathBuf::from("/data/K/17/3585/K173585.pdf")
        );
        assert_eq!(
            layout.page_text_path(&id, 4),
            PathBuf::from("/data/K/17/3585/page_004.txt")
        );
        assert_eq!(
            layout.predicates_path(&id),
            PathBuf::from("/data/K/17/3585/predicates")
        );
    }

    #[tokio::test]
    async fn fetch_prefers_year_specific_location() {
        let id = ApprovalId::parse("K173585").unwrap();
        let fetcher = CannedFetcher::new()
            .serve(
                "https://www.accessdata.fda.gov/cdrh_docs/pdf17/K173585.pdf",
                b"%PDF-year",
            )
            .serve(
                "https://www.accessdata.fda.gov/cdrh_docs/pdf/K173585.pdf",
                b"%PDF-flat",
            );
        let (_dir, store, fetcher) = store_with(fetcher);

        let handle = store.fetch(&id).await.unwrap();
        assert!(!handle.is_empty());
        assert_eq!(std::fs::read(handle.path()).unwrap(), b"%PDF-year");
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn fetch_falls_back_to_next_location() {
        let id = ApprovalId::parse("K173585").unwrap();
        let fetcher = CannedFetcher::new().serve(
            "https://www.accessdata.fda.gov/cdrh_docs/pdf/K173585.pdf",
            b"%PDF-flat",
        );
        let (_dir, store, fetcher) = store_with(fetcher);

        let handle = store.fetch(&id).await.unwrap();
        assert!(!handle.is_empty());
        assert_eq!(std::fs::read(handle.path()).unwrap(), b"%PDF-flat");
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn exhaustion_writes_placeholder_and_never_retries() {
        let id = ApprovalId::parse("K990001").unwrap();
        let (_dir, store, fetcher) = store_with(CannedFetcher::new());

        let handle = store.fetch(&id).await.unwrap();
        assert!(handle.is_empty());
        assert_eq!(std::fs::metadata(handle.path()).unwrap().len(), 0);
        assert_eq!(fetcher.calls(), 2);

        // The placeholder is a cache hit: no further network activity.
        let again = store.fetch(&id).await.unwrap();
        assert!(again.is_empty());
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn cache_hit_skips_network() {
        let id = ApprovalId::parse("K173585").unwrap();
        let fetcher = CannedFetcher::new().serve(
            "https://www.accessdata.fda.gov/cdrh_docs/pdf17/K173585.pdf",
            b"%PDF-year",
        );
        let (_dir, store, fetcher) = store_with(fetcher);

        store.fetch(&id).await.unwrap();
        store.fetch(&id).await.unwrap();
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn terminal_resolves_to_placeholder_without_network() {
        let (_dir, store, fetcher) = store_with(CannedFetcher::new());

        let handle = store.fetch(&ApprovalId::terminal()).await.unwrap();
        assert!(handle.is_empty());
        assert_eq!(fetcher.calls(), 0);
    }
}
