//! File-based variable source.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use toml::Value;

use super::{SourceError, VarSource};

/// Variables loaded from a flat TOML file.
///
/// Every top-level key must hold a scalar; it is exposed as its string form
/// (`port = 8080` reads back as `"8080"`). Missing optional files load as an
/// empty source.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    vars: HashMap<String, String>,
}

impl FileSource {
    /// Loads `path`.
    ///
    /// If `required` is true, a missing file is an error.
    pub fn load(path: impl AsRef<Path>, required: bool) -> Result<Self, SourceError> {
        let path = path.as_ref().to_path_buf();
        let vars = match load_var_file(&path, required)? {
            Some(table) => flatten(&path, table)?,
            None => HashMap::new(),
        };
        Ok(Self { path, vars })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of variables loaded.
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl VarSource for FileSource {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// Loads and parses a TOML variable file.
///
/// Returns `Ok(None)` if the file doesn't exist and `required` is false.
fn load_var_file(path: &Path, required: bool) -> Result<Option<toml::Table>, SourceError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let table = toml::from_str(&contents).map_err(|e| SourceError::ParseError {
                path: path.to_path_buf(),
                source: e,
            })?;
            Ok(Some(table))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if required {
                Err(SourceError::FileNotFound(path.to_path_buf()))
            } else {
                Ok(None)
            }
        }
        Err(e) => Err(SourceError::ReadError {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

fn flatten(path: &Path, table: toml::Table) -> Result<HashMap<String, String>, SourceError> {
    table
        .into_iter()
        .map(|(key, value)| {
            let rendered = match value {
                Value::String(s) => s,
                Value::Integer(i) => i.to_string(),
                Value::Float(f) => f.to_string(),
                Value::Boolean(b) => b.to_string(),
                Value::Datetime(dt) => dt.to_string(),
                Value::Array(_) | Value::Table(_) => {
                    return Err(SourceError::NonScalarValue {
                        path: path.to_path_buf(),
                        key,
                    })
                }
            };
            Ok((key, rendered))
        })
        .collect()
}
