use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SourceError {
    #[error("required variable file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read variable file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse variable file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("variable '{key}' in '{path}' is not a scalar")]
    NonScalarValue { path: PathBuf, key: String },
}
