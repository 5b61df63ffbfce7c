//! Document classification: text in, [`ClassificationResult`] out.

pub mod openai;
pub mod schema;

pub use openai::OpenAiClassifier;
pub use schema::{ClassificationResult, FieldKind, FieldSpec, ResponseValidator, FIELDS};

use crate::error::ClassifyError;

/// Maps extracted document text to a structured classification.
///
/// Implementations either return a result that satisfies the field schema
/// or fail; they never hand back partially populated required fields.
pub trait Classifier: Send + Sync {
    fn classify(&self, text: &str) -> Result<ClassificationResult, ClassifyError>;
}
