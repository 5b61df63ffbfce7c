//! Shared test utilities for scanrename integration tests.
//!
//! Provides scripted OCR and classifier stand-ins plus a `TestHarness`
//! that owns a scan directory and a ready-made pipeline.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use assert_fs::prelude::*;
use assert_fs::TempDir;

use scanrename::error::{ClassifyError, ProcessError};
use scanrename::processor::OcrEngine;
use scanrename::{ClassificationResult, Classifier, FileRenamer, FilenameBuilder, Pipeline};
use scanrename::TextExtractor;

/// Image bytes the scripted OCR refuses to read.
pub const CORRUPT_IMAGE: &[u8] = b"corrupt";

/// Maps raw image bytes to recognized text and counts invocations.
#[derive(Default)]
pub struct ScriptedOcr {
    pages: HashMap<Vec<u8>, String>,
    calls: AtomicUsize,
}

impl ScriptedOcr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, image: &[u8], text: &str) -> Self {
        self.pages.insert(image.to_vec(), text.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl OcrEngine for ScriptedOcr {
    fn recognize(&self, image_data: &[u8]) -> Result<String, ProcessError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if image_data == CORRUPT_IMAGE {
            return Err(ProcessError::OcrFailed("unreadable image".to_string()));
        }
        Ok(self.pages.get(image_data).cloned().unwrap_or_default())
    }
}

/// Answers with the first result whose key occurs in the document text.
#[derive(Default)]
pub struct ScriptedClassifier {
    answers: Vec<(String, ClassificationResult)>,
    seen: Mutex<Vec<String>>,
}

impl ScriptedClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, key: &str, result: ClassificationResult) -> Self {
        self.answers.push((key.to_string(), result));
        self
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

impl Classifier for ScriptedClassifier {
    fn classify(&self, text: &str) -> Result<ClassificationResult, ClassifyError> {
        self.seen.lock().unwrap().push(text.to_string());
        self.answers
            .iter()
            .find(|(key, _)| text.contains(key.as_str()))
            .map(|(_, result)| result.clone())
            .ok_or_else(|| ClassifyError::SchemaViolation("no scripted answer".to_string()))
    }
}

/// Lets the harness keep a handle on the classifier the pipeline owns.
struct SharedClassifier(Arc<ScriptedClassifier>);

impl Classifier for SharedClassifier {
    fn classify(&self, text: &str) -> Result<ClassificationResult, ClassifyError> {
        self.0.classify(text)
    }
}

pub fn receipt(
    merchant: &str,
    place: Option<&str>,
    date: &str,
    total: f64,
    currency: &str,
) -> ClassificationResult {
    ClassificationResult {
        document_type: "receipt".to_string(),
        merchant: Some(merchant.to_string()),
        place: place.map(str::to_string),
        date: Some(date.to_string()),
        total: Some(total),
        currency: Some(currency.to_string()),
        summary: format!("Purchase at {}", merchant),
        short_description: "store receipt".to_string(),
    }
}

pub fn document(doc_type: &str, date: Option<&str>, short_description: &str) -> ClassificationResult {
    ClassificationResult {
        document_type: doc_type.to_string(),
        merchant: None,
        place: None,
        date: date.map(str::to_string),
        total: None,
        currency: None,
        summary: format!("A {}", doc_type),
        short_description: short_description.to_string(),
    }
}

/// Isolated scan directory plus a pipeline built from scripted components.
pub struct TestHarness {
    temp_dir: TempDir,
    pub ocr: Arc<ScriptedOcr>,
    pub classifier: Arc<ScriptedClassifier>,
    pub pipeline: Pipeline,
}

impl TestHarness {
    pub fn new(ocr: ScriptedOcr, classifier: ScriptedClassifier) -> Self {
        Self::with_max_pages(ocr, classifier, 3)
    }

    pub fn with_max_pages(ocr: ScriptedOcr, classifier: ScriptedClassifier, max_pages: usize) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let ocr = Arc::new(ocr);
        let classifier = Arc::new(classifier);

        let pipeline = Pipeline::new(
            TextExtractor::with_ocr(ocr.clone(), 300, max_pages),
            Box::new(SharedClassifier(classifier.clone())),
            FilenameBuilder::default(),
            FileRenamer::new(),
        );

        Self {
            temp_dir,
            ocr,
            classifier,
            pipeline,
        }
    }

    pub fn dir(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn write(&self, name: &str, contents: &[u8]) -> PathBuf {
        let child = self.temp_dir.child(name);
        child.write_binary(contents).expect("Failed to write fixture");
        child.path().to_path_buf()
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// File names currently in the scan directory, sorted.
    pub fn listing(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.dir())
            .expect("Failed to read scan directory")
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

/// Single-page PDF whose content stream draws `content` in a standard font,
/// so it carries a native text layer.
pub fn text_pdf(content: &str) -> Vec<u8> {
    use lopdf::{dictionary, Document, Object, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let stream = format!("BT /F1 11 Tf 72 720 Td ({}) Tj ET", content);
    let content_id = doc.add_object(Stream::new(dictionary! {}, stream.into_bytes()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Resources" => resources_id,
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("Failed to serialize PDF");
    bytes
}
