use std::path::{Path, PathBuf};

use tracing::info;

use crate::storage::RenameOutcome;

use super::error::PipelineError;
use super::progress::ProgressReporter;
use super::runner::Pipeline;

/// Drives a [`Pipeline`] over a list of paths, strictly in order and one
/// document at a time. A failure never stops the remaining documents.
pub struct BatchRunner<'a> {
    pipeline: &'a Pipeline,
    progress: &'a dyn ProgressReporter,
}

impl<'a> BatchRunner<'a> {
    pub fn new(pipeline: &'a Pipeline, progress: &'a dyn ProgressReporter) -> Self {
        Self { pipeline, progress }
    }

    pub fn run<P: AsRef<Path>>(&self, paths: &[P]) -> BatchSummary {
        let mut summary = BatchSummary::default();

        for path in paths {
            let path = path.as_ref();
            match self.pipeline.run(path, self.progress) {
                Ok(outcome) => summary.outcomes.push(outcome),
                // The pipeline already reported the failure to `progress`.
                Err(e) => summary.failures.push((path.to_path_buf(), e)),
            }
        }

        info!(
            renamed = summary.renamed(),
            conflicts = summary.conflicts(),
            skipped = summary.skipped_no_name(),
            failed = summary.failed(),
            "Batch finished"
        );
        summary
    }
}

#[derive(Debug, Default)]
pub struct BatchSummary {
    pub outcomes: Vec<RenameOutcome>,
    pub failures: Vec<(PathBuf, PipelineError)>,
}

impl BatchSummary {
    pub fn renamed(&self) -> usize {
        self.count(|o| matches!(o, RenameOutcome::Renamed { .. }))
    }

    pub fn conflicts(&self) -> usize {
        self.count(|o| matches!(o, RenameOutcome::SkippedConflict { .. }))
    }

    pub fn skipped_no_name(&self) -> usize {
        self.count(|o| matches!(o, RenameOutcome::SkippedNoName { .. }))
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// True when every document was renamed or cleanly skipped.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Process exit status: 0 on success, 1 if any document failed.
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }

    fn count(&self, pred: impl Fn(&RenameOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o)).count()
    }
}
