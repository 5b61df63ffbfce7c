use std::path::PathBuf;

use thiserror::Error;

use crate::error::{ClassifyError, ProcessError, StorageError};

/// Why a single document could not be renamed. A destination conflict is
/// not an error; it is reported as `RenameOutcome::SkippedConflict`.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Could not extract text: {0}")]
    Extraction(#[from] ProcessError),

    #[error("Classification failed: {0}")]
    Classification(#[from] ClassifyError),

    #[error("Rename failed: {0}")]
    Rename(#[from] StorageError),
}
