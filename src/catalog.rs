//! The bulk clearance catalog
//!
//! The regulator publishes the full premarket-notification listing as a
//! handful of zip archives of pipe-delimited text, refreshed monthly. The
//! catalog caches each archive on disk next to the document store and turns
//! the listings into a de-duplicated set of clearance numbers — the feed for
//! whole-corpus discovery runs.

use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Published archive locations, newest listing first.
pub const LISTING_ARCHIVES: [&str; 6] = [
    "https://www.accessdata.fda.gov/premarket/ftparea/pmnlstmn.zip",
    "https://www.accessdata.fda.gov/premarket/ftparea/pmn96cur.zip",
    "https://www.accessdata.fda.gov/premarket/ftparea/pmn9195.zip",
    "https://www.accessdata.fda.gov/premarket/ftparea/pmn8690.zip",
    "https://www.accessdata.fda.gov/premarket/ftparea/pmn8185.zip",
    "https://www.accessdata.fda.gov/premarket/ftparea/pmn7680.zip",
];

/// Unlike document discovery, a catalog refresh has no graceful degradation:
/// an archive that cannot be fetched or read fails the whole call.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} returned status {status}")]
    Status { status: u16, url: String },
    #[error("archive is not readable: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("listing is not parseable: {0}")]
    Listing(#[from] csv::Error),
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// One row of the published listing. Only the columns the pipeline consumes
/// are kept; the listings carry a few dozen more.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogRecord {
    #[serde(rename = "KNUMBER")]
    pub number: String,
    #[serde(rename = "APPLICANT", default)]
    pub applicant: Option<String>,
    #[serde(rename = "DEVICENAME", default)]
    pub device_name: Option<String>,
    #[serde(rename = "DECISIONDATE", default)]
    decision_date: Option<String>,
}

impl CatalogRecord {
    /// The decision date, when present and well-formed (`MM/DD/YYYY`).
    pub fn decided_on(&self) -> Option<NaiveDate> {
        self.decision_date
            .as_deref()
            .and_then(|raw| NaiveDate::parse_from_str(raw.trim(), "%m/%d/%Y").ok())
    }
}

/// Downloads, caches, and parses the published listing archives.
pub struct Catalog {
    client: reqwest::Client,
    root: PathBuf,
    archives: Vec<String>,
}

impl Catalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            client: reqwest::Client::new(),
            root: root.into(),
            archives: LISTING_ARCHIVES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Override the archive list (tests, mirrors).
    pub fn with_archives(mut self, archives: Vec<String>) -> Self {
        self.archives = archives;
        self
    }

    /// Every listing row across all archives, in archive order.
    pub async fn records(&self) -> CatalogResult<Vec<CatalogRecord>> {
        let mut records = Vec::new();
        for url in &self.archives {
            let path = self.ensure_archive(url).await?;
            records.extend(read_archive(&path)?);
        }
        Ok(records)
    }

    /// The de-duplicated, ordered set of known clearance numbers.
    pub async fn known_numbers(&self) -> CatalogResult<BTreeSet<String>> {
        let records = self.records().await?;
        Ok(records
            .into_iter()
            .map(|record| record.number.trim().to_string())
            .filter(|number| !number.is_empty())
            .collect())
    }

    /// Download an archive unless it is already cached.
    async fn ensure_archive(&self, url: &str) -> CatalogResult<PathBuf> {
        tokio::fs::create_dir_all(&self.root).await?;
        let name = url.rsplit('/').next().unwrap_or("listing.zip");
        let path = self.root.join(name);
        if path.exists() {
            debug!(archive = name, "listing archive already cached");
            return Ok(path);
        }

        info!(url = %url, "downloading listing archive");
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = resp.bytes().await?;
        tokio::fs::write(&path, &body).await?;
        Ok(path)
    }
}

/// Parse every listing inside one cached archive.
fn read_archive(path: &Path) -> CatalogResult<Vec<CatalogRecord>> {
    let file = std::fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)?;
    let mut records = Vec::new();
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let mut raw = Vec::new();
        entry.read_to_end(&mut raw)?;
        records.extend(parse_listing(&raw)?);
    }
    Ok(records)
}

/// Parse one pipe-delimited listing.
///
/// The vendor files are Latin-encoded; the decode is lossy since every
/// column consumed here is plain ASCII.
pub fn parse_listing(raw: &[u8]) -> CatalogResult<Vec<CatalogRecord>> {
    let text = String::from_utf8_lossy(raw);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'|')
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }
    Ok(records)
}
