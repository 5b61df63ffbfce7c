use std::path::Path;

use tracing::{info_span, warn};

use crate::classifier::{Classifier, OpenAiClassifier};
use crate::config::{resolve_api_key, Config};
use crate::naming::{extension_of, FilenameBuilder};
use crate::processor::TextExtractor;
use crate::sanitize;
use crate::storage::{FileRenamer, RenameOutcome};

use super::error::PipelineError;
use super::progress::{Phase, ProgressEvent, ProgressReporter};

/// Extract → classify → name → rename, for one document at a time.
pub struct Pipeline {
    extractor: TextExtractor,
    classifier: Box<dyn Classifier>,
    builder: FilenameBuilder,
    renamer: FileRenamer,
}

impl Pipeline {
    /// Production constructor: Tesseract OCR and the configured LLM endpoint.
    ///
    /// Fails when the API key is missing or the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        let api_key = resolve_api_key(config)?;
        let classifier = OpenAiClassifier::new(&config.llm, api_key)?;

        Ok(Self {
            extractor: TextExtractor::new(&config.ocr),
            classifier: Box::new(classifier),
            builder: FilenameBuilder::new(&config.naming),
            renamer: FileRenamer::new(),
        })
    }

    /// Assembles a pipeline from caller-supplied components.
    pub fn new(
        extractor: TextExtractor,
        classifier: Box<dyn Classifier>,
        builder: FilenameBuilder,
        renamer: FileRenamer,
    ) -> Self {
        Self {
            extractor,
            classifier,
            builder,
            renamer,
        }
    }

    /// Runs every stage for `path`. The original file is only touched by a
    /// successful, non-conflicting rename.
    pub fn run(
        &self,
        path: &Path,
        progress: &dyn ProgressReporter,
    ) -> Result<RenameOutcome, PipelineError> {
        let filename = sanitize::redact_path(path);
        let _pipeline_span = info_span!("pipeline", filename = %filename).entered();

        let result = self.run_stages(path, progress);
        match &result {
            Ok(outcome) => progress.report(
                path,
                ProgressEvent::Completed {
                    outcome: outcome.clone(),
                },
            ),
            Err(e) => progress.report(
                path,
                ProgressEvent::Failed {
                    error: e.to_string(),
                },
            ),
        }
        result
    }

    fn run_stages(
        &self,
        path: &Path,
        progress: &dyn ProgressReporter,
    ) -> Result<RenameOutcome, PipelineError> {
        if !path.is_file() {
            return Err(PipelineError::FileNotFound(path.to_path_buf()));
        }

        let text = {
            let _step = info_span!("extract").entered();
            progress.report(path, ProgressEvent::Phase(Phase::Extracting));
            self.extractor.extract(path)?
        };
        progress.report(path, ProgressEvent::Extracted { text: text.clone() });

        let classification = {
            let _step = info_span!("classify").entered();
            progress.report(path, ProgressEvent::Phase(Phase::Classifying));
            self.classifier.classify(&text)?
        };
        if classification.date.is_some() && !classification.has_valid_date() {
            warn!(
                date = classification.date.as_deref().unwrap_or_default(),
                "Classifier returned a date not in YYYY-MM-DD form, using it as-is"
            );
        }
        let new_name = self.builder.build(&classification, &extension_of(path));
        progress.report(
            path,
            ProgressEvent::Classified {
                result: classification,
            },
        );
        progress.report(
            path,
            ProgressEvent::NameBuilt {
                name: new_name.clone(),
            },
        );

        let _step = info_span!("rename").entered();
        progress.report(path, ProgressEvent::Phase(Phase::Renaming));
        Ok(self.renamer.rename(path, &new_name)?)
    }
}
