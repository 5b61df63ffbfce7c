pub mod image;
pub mod ocr;
pub mod pdf;
pub mod text;

use std::path::Path;
use std::sync::Arc;

use crate::config::schema::{DocumentFormat, OcrConfig};
use crate::error::ProcessError;

pub use ocr::{OcrEngine, TesseractOcr};
pub use pdf::{extract_pages, PageSource};

pub trait DocumentProcessor: Send + Sync {
    /// Extracted text, possibly empty. Errors only when the file cannot be
    /// read or decoded at all.
    fn extract(&self, path: &Path) -> Result<String, ProcessError>;
    fn supports(&self, format: DocumentFormat) -> bool;
}

/// Routes a document to the processor for its format.
pub struct TextExtractor {
    processors: Vec<Box<dyn DocumentProcessor>>,
}

impl TextExtractor {
    pub fn new(config: &OcrConfig) -> Self {
        let ocr: Arc<dyn OcrEngine> = Arc::new(TesseractOcr::new(&config.languages));
        Self::with_ocr(ocr, config.dpi, config.max_pages)
    }

    /// Builds the processor set around a caller-supplied OCR engine.
    pub fn with_ocr(ocr: Arc<dyn OcrEngine>, dpi: u32, max_pages: usize) -> Self {
        let processors: Vec<Box<dyn DocumentProcessor>> = vec![
            Box::new(text::TextProcessor::new()),
            Box::new(image::ImageProcessor::new(ocr.clone())),
            Box::new(pdf::PdfProcessor::new(ocr, dpi, max_pages)),
        ];

        Self { processors }
    }

    pub fn extract(&self, path: &Path) -> Result<String, ProcessError> {
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let format = DocumentFormat::from_extension(extension)
            .ok_or_else(|| ProcessError::UnsupportedFormat(extension.to_string()))?;

        for processor in &self.processors {
            if processor.supports(format) {
                return processor.extract(path);
            }
        }

        Err(ProcessError::UnsupportedFormat(extension.to_string()))
    }
}
