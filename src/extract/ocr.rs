//! Optical character recognition over rasterized pages
//!
//! Scanned clearance documents have no embedded text layer. The fallback
//! path renders the failing page to an image with `pdftoppm` and recognizes
//! it with `tesseract`, both invoked as external commands. The intermediate
//! image is discarded once the text is captured.

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Default rasterization resolution. High enough that small-print citation
/// lists in scanned summaries stay legible to the recognizer.
pub const DEFAULT_OCR_DPI: u32 = 600;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{program} exited with {status} on page {page}: {detail}")]
    CommandFailed {
        program: &'static str,
        status: i32,
        page: usize,
        detail: String,
    },
}

/// Produces text from one page of a stored document image.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Recognize the zero-based `page` of the document at `document`.
    async fn recognize(&self, document: &Path, page: usize) -> Result<String, OcrError>;
}

/// [`OcrEngine`] backed by the `pdftoppm` and `tesseract` command-line tools.
pub struct TesseractOcr {
    dpi: u32,
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new()
    }
}

impl TesseractOcr {
    pub fn new() -> Self {
        Self {
            dpi: DEFAULT_OCR_DPI,
        }
    }

    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }
}

#[async_trait]
impl OcrEngine for TesseractOcr {
    async fn recognize(&self, document: &Path, page: usize) -> Result<String, OcrError> {
        let dir = document.parent().unwrap_or_else(|| Path::new("."));
        let prefix = dir.join(format!("page_{:03}", page));
        let image = dir.join(format!("page_{:03}.png", page));
        let page_arg = (page + 1).to_string();

        debug!(document = %document.display(), page, dpi = self.dpi, "rasterizing page");
        let render = Command::new("pdftoppm")
            .args(["-png", "-singlefile"])
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg("-f")
            .arg(&page_arg)
            .arg("-l")
            .arg(&page_arg)
            .arg(document)
            .arg(&prefix)
            .output()
            .await?;
        if !render.status.success() {
            return Err(OcrError::CommandFailed {
                program: "pdftoppm",
                status: render.status.code().unwrap_or(-1),
                page,
                detail: String::from_utf8_lossy(&render.stderr).trim().to_string(),
            });
        }

        let recognized = Command::new("tesseract")
            .arg(&image)
            .arg("stdout")
            .output()
            .await;
        // The image is scratch state either way.
        let _ = tokio::fs::remove_file(&image).await;

        let recognized = recognized?;
        if !recognized.status.success() {
            return Err(OcrError::CommandFailed {
                program: "tesseract",
                status: recognized.status.code().unwrap_or(-1),
                page,
                detail: String::from_utf8_lossy(&recognized.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&recognized.stdout).into_owned())
    }
}
