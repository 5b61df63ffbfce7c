use std::io::Cursor;

use image::ImageFormat;
use leptess::LepTess;

use crate::error::ProcessError;

/// Image-to-text engine. Implementations may return an empty string when
/// nothing legible is found; errors are reserved for unreadable input.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, image_data: &[u8]) -> Result<String, ProcessError>;
}

/// Tesseract via leptess. A fresh `LepTess` handle is created per call, so
/// the engine itself holds only the language string.
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    languages: String,
}

impl TesseractOcr {
    /// `languages` are Tesseract codes (`eng`, `deu`, ...); empty means `eng`.
    pub fn new(languages: &[String]) -> Self {
        let languages = match languages {
            [] => "eng".to_string(),
            langs => langs.join("+"),
        };
        Self { languages }
    }

    pub fn languages(&self) -> &str {
        &self.languages
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize(&self, image_data: &[u8]) -> Result<String, ProcessError> {
        let _span = tracing::info_span!("processor.ocr", languages = %self.languages).entered();

        let png = normalize_to_png(image_data)?;

        let mut tess = LepTess::new(None, &self.languages)
            .map_err(|e| ProcessError::OcrFailed(format!("tesseract init ({}): {}", self.languages, e)))?;
        tess.set_image_from_mem(&png)
            .map_err(|e| ProcessError::OcrFailed(format!("leptonica rejected image: {}", e)))?;
        let text = tess
            .get_utf8_text()
            .map_err(|e| ProcessError::OcrFailed(format!("recognition failed: {}", e)))?;

        tracing::debug!(chars = text.chars().count(), "OCR finished");
        Ok(text)
    }
}

/// Re-encodes any decodable image as PNG; Leptonica is not always built
/// with every codec.
fn normalize_to_png(image_data: &[u8]) -> Result<Vec<u8>, ProcessError> {
    let decoded = image::load_from_memory(image_data)
        .map_err(|e| ProcessError::OcrFailed(format!("cannot decode image: {}", e)))?;

    let mut png = Vec::new();
    decoded
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| ProcessError::OcrFailed(format!("cannot re-encode image: {}", e)))?;
    Ok(png)
}
