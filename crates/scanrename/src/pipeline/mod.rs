pub mod batch;
pub mod error;
pub mod progress;
pub mod runner;

pub use batch::{BatchRunner, BatchSummary};
pub use error::PipelineError;
pub use progress::{
    CapturingProgress, NoopProgress, Phase, ProgressEvent, ProgressReporter, TracingProgress,
};
pub use runner::Pipeline;
