use std::path::{Path, PathBuf};

use tracing::debug;

use super::{FileSource, MapSource, ProcessEnv, SourceError, VarSource};

/// A source in the lookup pipeline, resolved at build time.
#[derive(Debug)]
enum PendingSource {
    File { path: PathBuf, required: bool },
    Env,
    Map(MapSource),
}

/// Builder for layering several variable sources.
///
/// Sources are consulted in reverse registration order, so later sources
/// override earlier ones.
///
/// ## Example
///
/// ```no_run
/// use tagwalk::source::{Sources, VarSource};
///
/// // file defaults -> environment overrides -> local file overrides env
/// let vars = Sources::builder()
///     .with_file("config/defaults.toml", true)
///     .with_env()
///     .with_file("config/local.toml", false)
///     .build()?;
///
/// let host = vars.var("ELASTICSEARCH_HOST");
/// # Ok::<(), tagwalk::source::SourceError>(())
/// ```
#[derive(Debug, Default)]
#[must_use = "builders do nothing until .build() is called"]
pub struct Sources {
    sources: Vec<PendingSource>,
}

impl Sources {
    pub fn builder() -> Self {
        Self::default()
    }

    /// Adds a flat TOML variable file.
    ///
    /// If `required` is `true`, the build will fail if the file doesn't exist.
    /// Optional files that are missing are silently skipped.
    pub fn with_file(mut self, path: impl AsRef<Path>, required: bool) -> Self {
        self.sources.push(PendingSource::File {
            path: path.as_ref().to_path_buf(),
            required,
        });
        self
    }

    /// Adds the process environment.
    pub fn with_env(mut self) -> Self {
        self.sources.push(PendingSource::Env);
        self
    }

    /// Adds a fixed in-memory set of variables.
    pub fn with_map(mut self, map: MapSource) -> Self {
        self.sources.push(PendingSource::Map(map));
        self
    }

    /// Loads every registered file and returns the layered source.
    pub fn build(self) -> Result<Layered, SourceError> {
        let mut layers: Vec<Box<dyn VarSource>> = Vec::with_capacity(self.sources.len());

        for source in self.sources {
            match source {
                PendingSource::File { path, required } => {
                    let file = FileSource::load(&path, required)?;
                    debug!(
                        path = %file.path().display(),
                        required,
                        vars = file.len(),
                        "loaded variable file"
                    );
                    layers.push(Box::new(file));
                }
                PendingSource::Env => layers.push(Box::new(ProcessEnv)),
                PendingSource::Map(map) => layers.push(Box::new(map)),
            }
        }

        Ok(Layered { layers })
    }
}

/// Variable sources stacked by [`Sources`]; the last layer wins.
#[derive(Debug)]
pub struct Layered {
    layers: Vec<Box<dyn VarSource>>,
}

impl VarSource for Layered {
    fn var(&self, name: &str) -> Option<String> {
        self.layers.iter().rev().find_map(|layer| layer.var(name))
    }
}
