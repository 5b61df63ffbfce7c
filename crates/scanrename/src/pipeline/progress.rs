use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::classifier::ClassificationResult;
use crate::sanitize;
use crate::storage::RenameOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Extracting,
    Classifying,
    Renaming,
}

/// Events emitted by the pipeline while processing one document.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Phase(Phase),
    Extracted { text: String },
    Classified { result: ClassificationResult },
    NameBuilt { name: String },
    Completed { outcome: RenameOutcome },
    Failed { error: String },
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, source: &Path, event: ProgressEvent);
}

/// No-op reporter for unit tests.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _source: &Path, _event: ProgressEvent) {}
}

/// Forwards events to `tracing`.
pub struct TracingProgress;

impl ProgressReporter for TracingProgress {
    fn report(&self, source: &Path, event: ProgressEvent) {
        let file = sanitize::redact_path(source);
        match event {
            ProgressEvent::Phase(phase) => tracing::debug!(%file, ?phase, "phase"),
            ProgressEvent::Extracted { text } => {
                tracing::info!(%file, chars = text.chars().count(), "Text extracted");
                tracing::debug!(%file, "Extracted text:\n{}", text);
            }
            ProgressEvent::Classified { result } => {
                tracing::info!(
                    %file,
                    document_type = %result.document_type,
                    summary = %result.summary,
                    "Classified"
                );
            }
            ProgressEvent::NameBuilt { name } => tracing::debug!(%file, %name, "Name built"),
            ProgressEvent::Completed { outcome } => match outcome {
                RenameOutcome::Renamed { to, .. } => {
                    tracing::info!(%file, to = %to.display(), "Renamed")
                }
                RenameOutcome::SkippedConflict { to, .. } => {
                    tracing::warn!(%file, to = %to.display(), "Destination exists, skipped")
                }
                RenameOutcome::SkippedNoName { .. } => {
                    tracing::warn!(%file, "No file name, skipped")
                }
            },
            ProgressEvent::Failed { error } => tracing::error!(%file, %error, "Failed"),
        }
    }
}

/// Keeps every event in memory, in arrival order.
#[derive(Default)]
pub struct CapturingProgress {
    events: Mutex<Vec<(PathBuf, ProgressEvent)>>,
}

impl CapturingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(PathBuf, ProgressEvent)> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn events_for(&self, source: &Path) -> Vec<ProgressEvent> {
        self.events()
            .into_iter()
            .filter(|(path, _)| path == source)
            .map(|(_, event)| event)
            .collect()
    }
}

impl ProgressReporter for CapturingProgress {
    fn report(&self, source: &Path, event: ProgressEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push((source.to_path_buf(), event));
        }
    }
}
