pub mod classifier;
pub mod config;
pub mod error;
pub mod naming;
pub mod pipeline;
pub mod processor;
pub mod sanitize;
pub mod storage;

pub use classifier::{ClassificationResult, Classifier, OpenAiClassifier};
pub use config::{load_config, Config};
pub use error::{ClassifyError, ConfigError, ProcessError, Result, ScanRenameError, StorageError};
pub use naming::FilenameBuilder;
pub use pipeline::{BatchRunner, BatchSummary, Pipeline, PipelineError};
pub use processor::TextExtractor;
pub use storage::{FileRenamer, RenameOutcome};
