//! Lineage: Predicate Lineage Graph Builder
//!
//! Reconstructs the predicate lineage of medical-device clearances: each
//! clearance document cites the earlier devices it claims substantial
//! equivalence to, and those citations — buried in scanned PDF text — form a
//! directed graph that can be walked transitively from any seed device.
//!
//! # Core Concepts
//!
//! - **Numbers**: typed clearance identifiers (`K173585`) parsed out of text
//! - **Discovery**: fetch → extract (with OCR fallback) → scan, cached per
//!   number so repeated runs are cheap
//! - **Graph**: breadth-first expansion into a shared arena of citation
//!   edges, with dead ends marked by a terminal sentinel
//!
//! # Example
//!
//! ```no_run
//! use lineage::{ApprovalId, DiscoveryPipeline, GraphBuilder, LineageGraph, PipelineConfig};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PipelineConfig::new();
//! let pipeline = Arc::new(DiscoveryPipeline::from_config(&config)?);
//! let builder = GraphBuilder::new(pipeline);
//!
//! let seed = ApprovalId::parse("K173585")?;
//! let mut graph = LineageGraph::new();
//! let outcome = builder.populate(&mut graph, &seed, Some(100)).await;
//! println!("{} edges, complete: {}", graph.edge_count(), outcome.complete());
//! # Ok(())
//! # }
//! ```

pub mod approval;
pub mod catalog;
pub mod config;
pub mod discovery;
pub mod extract;
pub mod graph;
pub mod parse;
pub mod render;
pub mod store;

pub use approval::{ApprovalId, ParseError};
pub use catalog::{Catalog, CatalogError, CatalogRecord};
pub use config::PipelineConfig;
pub use discovery::{DiscoveryError, DiscoveryPipeline, Expansion, PredicateSource};
pub use extract::{ExtractError, OcrEngine, PageFailure, TesseractOcr, TextExtractor};
pub use graph::{BuildOutcome, CancellationToken, GraphBuilder, LineageGraph};
pub use parse::PredicateParser;
pub use store::{
    DocumentFetcher, DocumentHandle, DocumentStore, FetchError, HttpFetcher, StorageLayout,
    StoreError,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
