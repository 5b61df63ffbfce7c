//! Error types, one enum per concern. Per-document failures are wrapped
//! again by `pipeline::PipelineError`.

use std::path::PathBuf;

use thiserror::Error;

/// Startup-level error: anything that prevents building the pipeline.
/// Extraction and rename failures only happen per document and surface
/// through `PipelineError` instead.
#[derive(Error, Debug)]
pub enum ScanRenameError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("classifier setup: {0}")]
    Classify(#[from] ClassifyError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config is not valid JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("invalid config: {message}")]
    Validation { message: String },

    #[error("API key not found: environment variable '{0}' is not set")]
    MissingApiKey(String),
}

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("no extractor for extension '{0}'")]
    UnsupportedFormat(String),

    #[error("cannot read {}: {source}", path.display())]
    ReadDocument {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("PDF unreadable: {0}")]
    PdfProcessing(String),

    #[error("OCR failed: {0}")]
    OcrFailed(String),
}

#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("Failed to build HTTP client: {0}")]
    ClientInit(String),

    #[error("Request to classifier endpoint failed: {0}")]
    Request(String),

    #[error("Classifier endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Classifier refused the request: {0}")]
    Refused(String),

    #[error("Classifier response was empty")]
    EmptyResponse,

    #[error("Classifier response is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("Classifier response does not match schema: {0}")]
    SchemaViolation(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("cannot rename {} to {}: {source}", from.display(), to.display())]
    MoveFile {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ScanRenameError>;
