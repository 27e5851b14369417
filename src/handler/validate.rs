//! Regex validation driven by the `validate` annotation.

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::value::{FieldDescriptor, Value};

/// Annotation key holding the pattern.
pub const VALIDATE_KEY: &str = "validate";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ValidateError {
    #[error("invalid pattern on field '{field}': {source}")]
    InvalidPattern { field: String, source: regex::Error },

    #[error("validation failed for field ({type_name}::{field}): '{value}' does not match '{pattern}'")]
    Mismatch {
        field: String,
        type_name: String,
        value: String,
        pattern: String,
    },
}

/// Checks `value` against the field's `validate` pattern, if it has one.
///
/// The value is rendered with its canonical display string and matched
/// unanchored; patterns that need whole-string matches must carry `^`/`$`.
pub fn validate(value: &Value, field: &FieldDescriptor) -> Result<(), ValidateError> {
    let Some(pattern) = field.annotation(VALIDATE_KEY) else {
        return Ok(());
    };

    let re = Regex::new(pattern).map_err(|source| ValidateError::InvalidPattern {
        field: field.name.clone(),
        source,
    })?;

    let rendered = value.to_string();
    if re.is_match(&rendered) {
        debug!(field = %field.name, value = %rendered, "validated");
        Ok(())
    } else {
        Err(ValidateError::Mismatch {
            field: field.name.clone(),
            type_name: field.type_name.clone(),
            value: rendered,
            pattern: pattern.to_string(),
        })
    }
}
