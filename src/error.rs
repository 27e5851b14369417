use crate::annotation::AnnotationError;
use crate::handler::{ConfError, ValidateError};
use crate::reflect::ReflectError;
use crate::source::SourceError;
use thiserror::Error;

/// Top-level error type for the tagwalk library.
///
/// [`walk`](fn@crate::walk) itself returns the handler's own error unchanged;
/// this type is what the typed helpers in [`reflect`](crate::reflect) return.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Validate(#[from] ValidateError),

    #[error(transparent)]
    Conf(#[from] ConfError),

    #[error("reflection error: {0}")]
    Reflect(#[from] ReflectError),

    #[error("variable source error: {0}")]
    Source(#[from] SourceError),

    #[error("annotation error: {0}")]
    Annotation(#[from] AnnotationError),
}
