//! Named-variable lookup used by the `conf` handler.
//!
//! A [`VarSource`] answers `name -> Option<String>`. The process environment
//! is the usual source; files and in-memory maps can be layered over it with
//! [`Sources`].

mod builder;
mod env;
mod error;
mod file;

use std::collections::HashMap;

pub use builder::{Layered, Sources};
pub use env::ProcessEnv;
pub use error::SourceError;
pub use file::FileSource;

pub trait VarSource: Send + Sync + std::fmt::Debug {
    /// Returns the value of `name`, or `None` when it is unset.
    fn var(&self, name: &str) -> Option<String>;
}

/// A fixed set of variables held in memory.
#[derive(Debug, Clone, Default)]
pub struct MapSource {
    vars: HashMap<String, String>,
}

impl MapSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapSource {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl VarSource for MapSource {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}
