//! Field schema for classification results.
//!
//! The schema is declared once as data ([`FIELDS`]) and rendered two ways:
//! as the strict JSON Schema sent to the model as its output contract, and
//! as the validation schema applied to whatever comes back.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::ClassifyError;

/// Structured description of a scanned document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    #[serde(rename = "type")]
    pub document_type: String,
    #[serde(default)]
    pub merchant: Option<String>,
    #[serde(default)]
    pub place: Option<String>,
    /// `YYYY-MM-DD` when well formed; taken as-is otherwise.
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub total: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    pub summary: String,
    pub short_description: String,
}

impl ClassificationResult {
    pub fn is_receipt(&self) -> bool {
        self.document_type == "receipt"
    }

    /// True when `date` is present and parses as `YYYY-MM-DD`.
    pub fn has_valid_date(&self) -> bool {
        self.date
            .as_deref()
            .is_some_and(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").is_ok())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Number,
}

impl FieldKind {
    fn json_type(self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Number => "number",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub description: &'static str,
}

pub const FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "type",
        kind: FieldKind::String,
        required: true,
        description: "type of the document: contract, application, receipt, mail, bill",
    },
    FieldSpec {
        name: "merchant",
        kind: FieldKind::String,
        required: false,
        description: "For receipts and bills include the merchant name",
    },
    FieldSpec {
        name: "place",
        kind: FieldKind::String,
        required: false,
        description: "Place where this document was created, if presented",
    },
    FieldSpec {
        name: "date",
        kind: FieldKind::String,
        required: false,
        description: "Date in format YYYY-MM-DD when this document was created",
    },
    FieldSpec {
        name: "total",
        kind: FieldKind::Number,
        required: false,
        description: "Total amount of the receipt",
    },
    FieldSpec {
        name: "summary",
        kind: FieldKind::String,
        required: true,
        description: "short summary of the document",
    },
    FieldSpec {
        name: "short_description",
        kind: FieldKind::String,
        required: true,
        description: "short 3 words description of the document",
    },
    FieldSpec {
        name: "currency",
        kind: FieldKind::String,
        required: false,
        description: "Currency code (USD, EUR, RUB, etc.) that was used in the document",
    },
];

fn properties() -> Map<String, Value> {
    FIELDS
        .iter()
        .map(|field| {
            let ty = if field.required {
                json!(field.kind.json_type())
            } else {
                json!([field.kind.json_type(), "null"])
            };
            (
                field.name.to_string(),
                json!({ "type": ty, "description": field.description }),
            )
        })
        .collect()
}

/// Output contract for structured-output endpoints.
///
/// Strict mode requires every key to be listed; optional fields are
/// expressed as nullable instead.
pub fn output_schema() -> Value {
    let required: Vec<&str> = FIELDS.iter().map(|f| f.name).collect();
    json!({
        "type": "object",
        "properties": properties(),
        "required": required,
        "additionalProperties": false,
    })
}

/// Schema a response must satisfy: required keys present and non-null,
/// optional keys absent, null, or of the declared type.
pub fn validation_schema() -> Value {
    let required: Vec<&str> = FIELDS
        .iter()
        .filter(|f| f.required)
        .map(|f| f.name)
        .collect();
    json!({
        "type": "object",
        "properties": properties(),
        "required": required,
    })
}

/// Compiled [`validation_schema`].
pub struct ResponseValidator {
    validator: jsonschema::Validator,
}

impl ResponseValidator {
    pub fn new() -> Result<Self, ClassifyError> {
        let validator = jsonschema::validator_for(&validation_schema())
            .map_err(|e| ClassifyError::SchemaViolation(format!("invalid schema: {}", e)))?;
        Ok(Self { validator })
    }

    pub fn validate(&self, value: Value) -> Result<ClassificationResult, ClassifyError> {
        let errors: Vec<String> = self
            .validator
            .iter_errors(&value)
            .map(|e| e.to_string())
            .collect();
        if !errors.is_empty() {
            return Err(ClassifyError::SchemaViolation(errors.join("; ")));
        }

        serde_json::from_value(value).map_err(|e| ClassifyError::SchemaViolation(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt_json() -> Value {
        json!({
            "type": "receipt",
            "merchant": "Acme Store",
            "place": null,
            "date": "2023-04-01",
            "total": 12.5,
            "currency": "USD",
            "summary": "Grocery purchase",
            "short_description": "grocery store receipt"
        })
    }

    #[test]
    fn test_output_schema_lists_every_field_as_required() {
        let schema = output_schema();
        let required = schema["required"].as_array().unwrap();
        assert_eq!(required.len(), FIELDS.len());
        assert_eq!(schema["additionalProperties"], json!(false));
        assert_eq!(schema["properties"]["total"]["type"], json!(["number", "null"]));
        assert_eq!(schema["properties"]["type"]["type"], json!("string"));
    }

    #[test]
    fn test_validation_schema_requires_only_required_fields() {
        let schema = validation_schema();
        assert_eq!(
            schema["required"],
            json!(["type", "summary", "short_description"])
        );
    }

    #[test]
    fn test_validate_full_receipt() {
        let validator = ResponseValidator::new().unwrap();
        let result = validator.validate(receipt_json()).unwrap();

        assert_eq!(result.document_type, "receipt");
        assert_eq!(result.merchant.as_deref(), Some("Acme Store"));
        assert_eq!(result.place, None);
        assert_eq!(result.total, Some(12.5));
        assert!(result.is_receipt());
        assert!(result.has_valid_date());
    }

    #[test]
    fn test_validate_omitted_optional_fields() {
        let validator = ResponseValidator::new().unwrap();
        let result = validator
            .validate(json!({
                "type": "contract",
                "summary": "Apartment lease",
                "short_description": "apartment lease contract"
            }))
            .unwrap();

        assert_eq!(result.merchant, None);
        assert_eq!(result.date, None);
        assert!(!result.has_valid_date());
    }

    #[test]
    fn test_missing_required_field_rejected() {
        let validator = ResponseValidator::new().unwrap();
        let mut value = receipt_json();
        value.as_object_mut().unwrap().remove("summary");

        match validator.validate(value) {
            Err(ClassifyError::SchemaViolation(msg)) => assert!(msg.contains("summary")),
            other => panic!("Expected SchemaViolation, got {:?}", other),
        }
    }

    #[test]
    fn test_wrong_type_rejected() {
        let validator = ResponseValidator::new().unwrap();
        let mut value = receipt_json();
        value["total"] = json!("12.50");

        assert!(matches!(
            validator.validate(value),
            Err(ClassifyError::SchemaViolation(_))
        ));
    }

    #[test]
    fn test_null_required_field_rejected() {
        let validator = ResponseValidator::new().unwrap();
        let mut value = receipt_json();
        value["type"] = Value::Null;

        assert!(validator.validate(value).is_err());
    }

    #[test]
    fn test_malformed_date_is_kept() {
        let validator = ResponseValidator::new().unwrap();
        let mut value = receipt_json();
        value["date"] = json!("April 1st");

        let result = validator.validate(value).unwrap();
        assert_eq!(result.date.as_deref(), Some("April 1st"));
        assert!(!result.has_valid_date());
    }
}
