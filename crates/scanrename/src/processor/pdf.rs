use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::schema::DocumentFormat;
use crate::error::ProcessError;
use crate::processor::ocr::OcrEngine;
use crate::processor::DocumentProcessor;

/// Page-level access to a multi-page document container.
///
/// Page indices are zero-based and always below [`PageSource::page_count`].
pub trait PageSource {
    fn page_count(&self) -> usize;

    /// Text embedded in the page, or `None` when the page carries no usable
    /// text layer (scanned page, empty page, undecodable fonts).
    fn native_text(&self, index: usize) -> Option<String>;

    /// Rasterizes a single page to encoded image bytes for OCR.
    fn render_page(&self, index: usize) -> Result<Vec<u8>, ProcessError>;
}

/// Reads at most `max_pages` leading pages of `source`.
///
/// Each page contributes its native text when present; otherwise that page
/// alone is rasterized and passed through `ocr`. Page texts are concatenated
/// in page order exactly as produced.
pub fn extract_pages(
    source: &dyn PageSource,
    ocr: &dyn OcrEngine,
    max_pages: usize,
) -> Result<String, ProcessError> {
    let total = source.page_count();
    let pages = total.min(max_pages);
    debug!(total_pages = total, pages, "Extracting text from container");

    let mut text = String::new();

    for index in 0..pages {
        match source.native_text(index) {
            Some(page_text) if !page_text.trim().is_empty() => {
                debug!(page = index + 1, "Using native text layer");
                text.push_str(&page_text);
            }
            _ => {
                let _span =
                    tracing::info_span!("processor.ocr_fallback", page = index + 1).entered();
                let image = source.render_page(index)?;
                let page_text = ocr.recognize(&image)?;
                text.push_str(&page_text);
            }
        }
    }

    Ok(text)
}

pub struct PdfProcessor {
    ocr: Arc<dyn OcrEngine>,
    dpi: u32,
    max_pages: usize,
}

impl PdfProcessor {
    pub fn new(ocr: Arc<dyn OcrEngine>, dpi: u32, max_pages: usize) -> Self {
        Self {
            ocr,
            dpi,
            max_pages,
        }
    }
}

impl DocumentProcessor for PdfProcessor {
    fn extract(&self, path: &Path) -> Result<String, ProcessError> {
        let _span = tracing::info_span!("processor.pdf").entered();

        let pdf_bytes = std::fs::read(path).map_err(|e| ProcessError::ReadDocument {
            path: path.to_path_buf(),
            source: e,
        })?;

        let container = open_container(pdf_bytes, self.dpi)?;
        extract_pages(container.as_ref(), self.ocr.as_ref(), self.max_pages)
    }

    fn supports(&self, format: DocumentFormat) -> bool {
        matches!(format, DocumentFormat::Pdf)
    }
}

/// Opens PDF bytes with lopdf, falling back to poppler when lopdf cannot
/// parse the structure (e.g. a broken cross-reference table).
fn open_container(pdf_bytes: Vec<u8>, dpi: u32) -> Result<Box<dyn PageSource>, ProcessError> {
    match lopdf::Document::load_mem(&pdf_bytes) {
        Ok(doc) => Ok(Box::new(LopdfContainer::new(doc, pdf_bytes, dpi))),
        Err(e) => {
            warn!("lopdf failed to parse PDF: {}. Falling back to OCR of every page.", e);
            let container = PopplerContainer::new(pdf_bytes, dpi).map_err(|fallback| {
                ProcessError::PdfProcessing(format!(
                    "Failed to load PDF: {}. Fallback also failed: {}",
                    e, fallback
                ))
            })?;
            Ok(Box::new(container))
        }
    }
}

pub struct LopdfContainer {
    doc: lopdf::Document,
    pdf_bytes: Vec<u8>,
    page_numbers: Vec<u32>,
    dpi: u32,
}

impl LopdfContainer {
    pub fn new(doc: lopdf::Document, pdf_bytes: Vec<u8>, dpi: u32) -> Self {
        let page_numbers = doc.get_pages().keys().copied().collect();
        Self {
            doc,
            pdf_bytes,
            page_numbers,
            dpi,
        }
    }
}

impl PageSource for LopdfContainer {
    fn page_count(&self) -> usize {
        self.page_numbers.len()
    }

    fn native_text(&self, index: usize) -> Option<String> {
        let page_num = *self.page_numbers.get(index)?;
        match self.doc.extract_text(&[page_num]) {
            Ok(text) => usable_text(text),
            Err(e) => {
                debug!(page = page_num, "No text layer: {}", e);
                None
            }
        }
    }

    fn render_page(&self, index: usize) -> Result<Vec<u8>, ProcessError> {
        render_pdf_page_to_image(&self.pdf_bytes, index as u32 + 1, self.dpi)
    }
}

/// Container for PDFs lopdf cannot parse: no text layer is available, pages
/// are counted and rendered by poppler-utils.
pub struct PopplerContainer {
    pdf_bytes: Vec<u8>,
    page_count: usize,
    dpi: u32,
}

impl PopplerContainer {
    pub fn new(pdf_bytes: Vec<u8>, dpi: u32) -> Result<Self, ProcessError> {
        let page_count = count_pdf_pages(&pdf_bytes)?;
        Ok(Self {
            pdf_bytes,
            page_count,
            dpi,
        })
    }
}

impl PageSource for PopplerContainer {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn native_text(&self, _index: usize) -> Option<String> {
        None
    }

    fn render_page(&self, index: usize) -> Result<Vec<u8>, ProcessError> {
        render_pdf_page_to_image(&self.pdf_bytes, index as u32 + 1, self.dpi)
    }
}

/// Marker lopdf emits for glyphs in CID fonts it cannot decode.
const IDENTITY_H_PATTERN: &str = "?Identity-H Unimplemented?";

/// Text shorter than this is accepted regardless of character composition.
const MIN_TOTAL_CHARS: usize = 50;

/// Minimum share of alphanumeric characters for text to count as readable.
const MIN_ALPHANUMERIC_PERCENT: usize = 10;

/// Returns the text if it is worth keeping, `None` if the page should be OCRed.
fn usable_text(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.replace(IDENTITY_H_PATTERN, "").trim().is_empty() {
        return None;
    }

    let total = trimmed.chars().count();
    let alphanumeric = trimmed.chars().filter(|c| c.is_alphanumeric()).count();
    let garbled = total > MIN_TOTAL_CHARS && alphanumeric * 100 < total * MIN_ALPHANUMERIC_PERCENT;

    (!garbled).then_some(text)
}

/// Writes PDF bytes to a uniquely named temp file, removed on drop.
struct TempPdf {
    path: PathBuf,
}

impl TempPdf {
    fn write(pdf_bytes: &[u8], prefix: &str) -> Result<Self, ProcessError> {
        let path = std::env::temp_dir().join(format!("{}_{}.pdf", prefix, uuid::Uuid::new_v4()));
        std::fs::write(&path, pdf_bytes)
            .map_err(|e| ProcessError::PdfProcessing(format!("temp copy for poppler: {}", e)))?;
        Ok(Self { path })
    }
}

impl Drop for TempPdf {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Page count via `pdfinfo`.
fn count_pdf_pages(pdf_bytes: &[u8]) -> Result<usize, ProcessError> {
    let pdf = TempPdf::write(pdf_bytes, "scanrename_pagecount")?;

    let output = Command::new("pdfinfo").arg(&pdf.path).output().map_err(|e| {
        ProcessError::PdfProcessing(format!("pdfinfo not runnable (poppler-utils missing?): {}", e))
    })?;

    if !output.status.success() {
        return Err(ProcessError::PdfProcessing(format!(
            "pdfinfo exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr)
        )));
    }

    Ok(parse_page_count(&String::from_utf8_lossy(&output.stdout)))
}

fn parse_page_count(pdfinfo_output: &str) -> usize {
    pdfinfo_output
        .lines()
        .filter_map(|line| line.strip_prefix("Pages:"))
        .find_map(|count| count.trim().parse::<usize>().ok())
        .unwrap_or(1)
}

/// Renders one page (1-based) to PNG bytes with `pdftoppm`.
fn render_pdf_page_to_image(
    pdf_bytes: &[u8],
    page_num: u32,
    dpi: u32,
) -> Result<Vec<u8>, ProcessError> {
    let pdf = TempPdf::write(pdf_bytes, "scanrename_render")?;
    let output_prefix =
        std::env::temp_dir().join(format!("scanrename_page_{}", uuid::Uuid::new_v4()));
    let page = page_num.to_string();

    let output = Command::new("pdftoppm")
        .args(["-png", "-r", &dpi.to_string(), "-f", &page, "-l", &page])
        .arg(&pdf.path)
        .arg(&output_prefix)
        .output()
        .map_err(|e| {
            ProcessError::PdfProcessing(format!("pdftoppm not runnable (poppler-utils missing?): {}", e))
        })?;

    if !output.status.success() {
        return Err(ProcessError::PdfProcessing(format!(
            "pdftoppm exited with {} on page {}: {}",
            output.status,
            page_num,
            String::from_utf8_lossy(&output.stderr)
        )));
    }

    // pdftoppm zero-pads the page suffix depending on the document's page count
    let prefix = output_prefix.display();
    let candidates = [
        format!("{}-{}.png", prefix, page_num),
        format!("{}-{:02}.png", prefix, page_num),
        format!("{}-{:03}.png", prefix, page_num),
    ];
    let image_path = candidates
        .iter()
        .map(Path::new)
        .find(|p| p.exists())
        .ok_or_else(|| {
            ProcessError::PdfProcessing(format!("pdftoppm produced no image for page {}", page_num))
        })?;

    let image_data = std::fs::read(image_path).map_err(|e| {
        ProcessError::PdfProcessing(format!("rendered page {} unreadable: {}", page_num, e))
    })?;
    let _ = std::fs::remove_file(image_path);

    Ok(image_data)
}
