use std::path::Path;
use std::sync::Arc;

use crate::config::schema::DocumentFormat;
use crate::error::ProcessError;
use crate::processor::ocr::OcrEngine;
use crate::processor::DocumentProcessor;

/// Single images are OCRed whole, without paging.
pub struct ImageProcessor {
    ocr: Arc<dyn OcrEngine>,
}

impl ImageProcessor {
    pub fn new(ocr: Arc<dyn OcrEngine>) -> Self {
        Self { ocr }
    }
}

impl DocumentProcessor for ImageProcessor {
    fn extract(&self, path: &Path) -> Result<String, ProcessError> {
        let _span = tracing::info_span!("processor.image").entered();

        let image_data = std::fs::read(path).map_err(|e| ProcessError::ReadDocument {
            path: path.to_path_buf(),
            source: e,
        })?;

        self.ocr.recognize(&image_data)
    }

    fn supports(&self, format: DocumentFormat) -> bool {
        matches!(format, DocumentFormat::Image)
    }
}
