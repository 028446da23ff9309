//! Plain-text extraction from uploaded documents.
//!
//! The extractor dispatches on the file extension:
//!
//! - `pdf` – embedded text layer via `lopdf`; scanned PDFs without a text layer fall back to
//!   OCR of rasterized pages. Fallback failures are logged and yield empty text.
//! - `png`, `jpg`, `jpeg` – OCR.
//! - `docx` – body paragraph text via `docx-rs`.
//! - `txt` – strict UTF-8.
//!
//! Extraction is blocking (file I/O, PDF decoding, external OCR processes); async callers should
//! run it on a blocking thread.

mod docx;
mod ocr;
mod pdf;

pub use ocr::TesseractOcr;

use crate::config::OcrConfig;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Extensions accepted for upload, lower-case.
pub const ALLOWED_EXTENSIONS: [&str; 6] = ["pdf", "png", "jpg", "jpeg", "docx", "txt"];

/// Errors raised while turning a document into text.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Extension is missing or not in the allow-list.
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),
    /// The document could not be read from disk.
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        /// File that failed to load.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The PDF could not be parsed.
    #[error("Error extracting text from PDF: {0}")]
    Pdf(String),
    /// The Word document could not be parsed.
    #[error("Error extracting text from DOCX: {0}")]
    Docx(String),
    /// A plain-text upload was not valid UTF-8.
    #[error("Error extracting text from TXT: file is not valid UTF-8")]
    Encoding,
    /// The OCR engine failed or is not installed.
    #[error("Error extracting text from image: {0}")]
    Ocr(String),
}

/// Document formats understood by the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Portable Document Format.
    Pdf,
    /// Raster image (`png`, `jpg`, `jpeg`).
    Image,
    /// Office Open XML word-processing document.
    Docx,
    /// UTF-8 plain text.
    Text,
}

impl DocumentKind {
    /// Map a lower- or mixed-case extension to a document kind.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "png" | "jpg" | "jpeg" => Some(Self::Image),
            "docx" => Some(Self::Docx),
            "txt" => Some(Self::Text),
            _ => None,
        }
    }

    /// Infer the kind from the text after the last `.` of a file name.
    pub fn from_filename(filename: &str) -> Result<Self, ExtractionError> {
        let (_, extension) = filename
            .rsplit_once('.')
            .ok_or_else(|| ExtractionError::UnsupportedFormat(filename.to_string()))?;
        Self::from_extension(extension)
            .ok_or_else(|| ExtractionError::UnsupportedFormat(extension.to_ascii_lowercase()))
    }
}

/// OCR backend used for images and for scanned PDFs.
pub trait OcrEngine: Send + Sync {
    /// Recognize the text of a single image file.
    fn image_to_text(&self, image: &Path) -> Result<String, ExtractionError>;
    /// Rasterize every page of a PDF and recognize the text of each page, in page order.
    fn pdf_to_text(&self, pdf: &Path) -> Result<String, ExtractionError>;
}

/// Extension-dispatching text extractor.
#[derive(Clone)]
pub struct DocumentExtractor {
    ocr: Arc<dyn OcrEngine>,
}

impl DocumentExtractor {
    /// Build an extractor around an OCR engine.
    pub fn new(ocr: Arc<dyn OcrEngine>) -> Self {
        Self { ocr }
    }

    /// Build an extractor using the external `tesseract`/`pdftoppm` tools.
    pub fn from_config(config: &OcrConfig) -> Self {
        Self::new(Arc::new(TesseractOcr::new(config.clone())))
    }

    /// Extract trimmed plain text from the document at `path`.
    pub fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let kind = DocumentKind::from_filename(&filename)?;
        tracing::debug!(path = %path.display(), ?kind, "Extracting document text");

        let text = match kind {
            DocumentKind::Pdf => self.extract_pdf(path)?,
            DocumentKind::Image => self.ocr.image_to_text(path)?,
            DocumentKind::Docx => docx::paragraph_text(&read_file(path)?)?,
            DocumentKind::Text => {
                String::from_utf8(read_file(path)?).map_err(|_| ExtractionError::Encoding)?
            }
        };
        Ok(text.trim().to_string())
    }

    fn extract_pdf(&self, path: &Path) -> Result<String, ExtractionError> {
        let text = pdf::text_layer(&read_file(path)?)?;
        if !text.trim().is_empty() {
            return Ok(text);
        }

        tracing::info!(path = %path.display(), "PDF has no text layer; running OCR");
        match self.ocr.pdf_to_text(path) {
            Ok(text) => Ok(text),
            Err(error) => {
                tracing::warn!(path = %path.display(), error = %error, "PDF OCR fallback failed");
                Ok(String::new())
            }
        }
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, ExtractionError> {
    std::fs::read(path).map_err(|source| ExtractionError::Io {
        path: path.to_path_buf(),
        source,
    })
}
