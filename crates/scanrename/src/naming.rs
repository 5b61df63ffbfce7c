//! File name construction from a classification result.
//!
//! Receipts: `{date}_{type}_{merchant}_{place}_{total}{currency}{ext}`.
//! Everything else: `{date}_{type}_{short_description}{ext}`.
//!
//! A missing or blank field renders as the placeholder token so every
//! segment keeps its position.

use std::path::Path;

use crate::classifier::ClassificationResult;
use crate::config::schema::NamingConfig;

#[derive(Debug, Clone)]
pub struct FilenameBuilder {
    placeholder: String,
    sanitize: bool,
}

impl FilenameBuilder {
    pub fn new(config: &NamingConfig) -> Self {
        Self {
            placeholder: config.placeholder.clone(),
            sanitize: config.sanitize,
        }
    }

    /// `extension` is appended verbatim and includes its leading dot, or is
    /// empty (see [`extension_of`]).
    pub fn build(&self, result: &ClassificationResult, extension: &str) -> String {
        let date = self.fragment(result.date.as_deref());
        let doc_type = self.fragment(Some(&result.document_type));

        if result.is_receipt() {
            let merchant = self.fragment(result.merchant.as_deref());
            let place = self.fragment(result.place.as_deref());
            let total = match result.total {
                Some(total) => format_total(total),
                None => self.placeholder.clone(),
            };
            let currency = self.fragment(result.currency.as_deref());
            format!(
                "{}_{}_{}_{}_{}{}{}",
                date, doc_type, merchant, place, total, currency, extension
            )
        } else {
            let description = self.fragment(Some(&result.short_description));
            format!("{}_{}_{}{}", date, doc_type, description, extension)
        }
    }

    fn fragment(&self, value: Option<&str>) -> String {
        let value = match value {
            Some(v) if !v.trim().is_empty() => v,
            _ => return self.placeholder.clone(),
        };

        if !self.sanitize {
            return value.to_string();
        }

        let cleaned = sanitize_fragment(value);
        if cleaned.is_empty() {
            self.placeholder.clone()
        } else {
            cleaned
        }
    }
}

impl Default for FilenameBuilder {
    fn default() -> Self {
        Self::new(&NamingConfig::default())
    }
}

/// Upper bound on one sanitized fragment, in bytes. Five free-text
/// fragments plus total, separators and extension stay under the common
/// 255-byte file name limit.
const MAX_FRAGMENT_BYTES: usize = 40;

/// Replaces path separators with `-`, control characters with spaces,
/// collapses whitespace runs and caps the length at a char boundary.
fn sanitize_fragment(value: &str) -> String {
    let replaced: String = value
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '-',
            c if c.is_control() => ' ',
            c => c,
        })
        .collect();

    let collapsed = replaced.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.len() <= MAX_FRAGMENT_BYTES {
        return collapsed;
    }

    let mut end = MAX_FRAGMENT_BYTES;
    while !collapsed.is_char_boundary(end) {
        end -= 1;
    }
    collapsed[..end].trim_end().to_string()
}

/// Shortest round-trip form, keeping one decimal for whole amounts
/// (`12.5` → `12.5`, `12` → `12.0`).
fn format_total(total: f64) -> String {
    if total.is_finite() && total.fract() == 0.0 && total.abs() < 1e16 {
        format!("{:.1}", total)
    } else {
        format!("{}", total)
    }
}

/// Extension of `path` with its leading dot, or an empty string.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}
