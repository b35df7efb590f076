//! Shared fixtures for pipeline integration tests
//!
//! Provides an in-memory document source, a counting recognition stub, and a
//! tiny PDF builder so tests can exercise the full fetch → extract → scan →
//! build chain against a temporary data directory, without the network or
//! the external recognition tools.

use async_trait::async_trait;
use lineage::{
    DiscoveryPipeline, DocumentFetcher, DocumentStore, FetchError, OcrEngine, PredicateParser,
    StorageLayout, TextExtractor,
};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Build a PDF whose pages each carry one embedded text string. An empty
/// string produces a page with no text layer.
pub fn pdf_with_pages(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
        ];
        if !text.is_empty() {
            operations.push(Operation::new("Tj", vec![Object::string_literal(*text)]));
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("content stream encodes"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("document serializes");
    bytes
}

/// In-memory document source keyed by URL, counting every attempt.
pub struct CannedFetcher {
    bodies: Mutex<HashMap<String, Vec<u8>>>,
    calls: AtomicUsize,
}

impl Default for CannedFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl CannedFetcher {
    pub fn new() -> Self {
        Self {
            bodies: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Serve `body` for the year-keyed location of `number`.
    pub fn serve_document(self, number: &str, year_digits: &str, body: Vec<u8>) -> Self {
        let url = format!(
            "https://www.accessdata.fda.gov/cdrh_docs/pdf{}/{}.pdf",
            year_digits, number
        );
        self.bodies.lock().unwrap().insert(url, body);
        self
    }

    pub fn calls(&self) -> usize {
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

/// Recognition stub returning one fixed text, counting invocations.
pub struct CountingOcr {
    text: String,
    calls: AtomicUsize,
}

impl CountingOcr {
    pub fn recognizing(text: &str) -> Self {
        Self {
            text: text.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OcrEngine for CountingOcr {
    async fn recognize(
        &self,
        _document: &Path,
        _page: usize,
    ) -> Result<String, lineage::extract::OcrError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.clone())
    }
}

/// A full discovery pipeline over `root`, wired to the given stubs.
pub fn pipeline_over(
    root: &Path,
    fetcher: Arc<CannedFetcher>,
    ocr: Arc<CountingOcr>,
) -> DiscoveryPipeline {
    let layout = StorageLayout::new(root);
    let store = DocumentStore::new(layout.clone(), fetcher);
    let extractor = TextExtractor::new(layout.clone(), ocr);
    let parser = PredicateParser::new(layout);
    DiscoveryPipeline::new(store, extractor, parser)
}
