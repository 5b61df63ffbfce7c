use std::path::Path;

use crate::config::schema::DocumentFormat;
use crate::error::ProcessError;
use crate::processor::DocumentProcessor;

/// Plain-text documents are passed through without OCR.
pub struct TextProcessor;

impl TextProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TextProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentProcessor for TextProcessor {
    fn extract(&self, path: &Path) -> Result<String, ProcessError> {
        let bytes = std::fs::read(path).map_err(|e| ProcessError::ReadDocument {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn supports(&self, format: DocumentFormat) -> bool {
        matches!(format, DocumentFormat::Text)
    }
}
