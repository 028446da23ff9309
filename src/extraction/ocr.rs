use super::{ExtractionError, OcrEngine};
use crate::config::OcrConfig;
use std::path::{Path, PathBuf};
use std::process::Command;

/// OCR through the `tesseract` CLI, with `pdftoppm` rasterizing scanned PDFs.
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    config: OcrConfig,
}

impl TesseractOcr {
    /// Use the binaries, language and resolution from `config`.
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    fn run(&self, program: &str, command: &mut Command) -> Result<Vec<u8>, ExtractionError> {
        let output = command
            .output()
            .map_err(|error| ExtractionError::Ocr(format!("failed to run {program}: {error}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractionError::Ocr(format!(
                "{program} exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(output.stdout)
    }

    fn rasterize(&self, pdf: &Path, out_dir: &Path) -> Result<Vec<PathBuf>, ExtractionError> {
        let prefix = out_dir.join("page");
        self.run(
            &self.config.pdftoppm_cmd,
            Command::new(&self.config.pdftoppm_cmd)
                .arg("-png")
                .arg("-r")
                .arg(self.config.dpi.to_string())
                .arg(pdf)
                .arg(&prefix),
        )?;

        let mut pages: Vec<PathBuf> = std::fs::read_dir(out_dir)
            .map_err(|error| ExtractionError::Ocr(format!("failed to list rendered pages: {error}")))?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "png"))
            .collect();
        // pdftoppm zero-pads page numbers to a common width, so lexical order is page order
        pages.sort();
        Ok(pages)
    }
}

impl OcrEngine for TesseractOcr {
    fn image_to_text(&self, image: &Path) -> Result<String, ExtractionError> {
        let stdout = self.run(
            &self.config.tesseract_cmd,
            Command::new(&self.config.tesseract_cmd)
                .arg(image)
                .arg("stdout")
                .arg("-l")
                .arg(&self.config.language),
        )?;
        Ok(String::from_utf8_lossy(&stdout).trim().to_string())
    }

    fn pdf_to_text(&self, pdf: &Path) -> Result<String, ExtractionError> {
        let scratch = tempfile::tempdir()
            .map_err(|error| ExtractionError::Ocr(format!("failed to create temp dir: {error}")))?;
        let pages = self.rasterize(pdf, scratch.path())?;
        tracing::debug!(pages = pages.len(), "Rasterized PDF for OCR");

        let mut text = String::new();
        for page in &pages {
            text.push_str(&self.image_to_text(page)?);
            text.push('\n');
        }
        Ok(text.trim().to_string())
    }
}
