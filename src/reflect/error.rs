use thiserror::Error;

use crate::annotation::AnnotationError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReflectError {
    #[error("failed to serialize value: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("failed to deserialize value: {0}")]
    Deserialize(#[from] toml::de::Error),

    #[error("field '{0}' is declared but missing from the value")]
    MissingField(String),

    #[error("field '{0}' is present in the value but not declared in the schema")]
    UndeclaredField(String),

    #[error("'{path}' does not match declared type {expected}")]
    ShapeMismatch { path: String, expected: String },

    #[error("malformed annotation on field '{field}': {source}")]
    Annotation {
        field: String,
        source: AnnotationError,
    },

    #[error("'{path}' cannot be represented: {reason}")]
    Unrepresentable { path: String, reason: &'static str },
}
