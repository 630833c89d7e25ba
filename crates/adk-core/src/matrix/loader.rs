//! Matrix loading with a modification-time cache.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::SystemTime;

use tracing::debug;

use super::error::ConfigurationError;
use super::schema::{build_matrix, parse_document};
use crate::domain::CompatibilityMatrix;

struct CacheSlot {
    modified: SystemTime,
    matrix: Arc<CompatibilityMatrix>,
}

/// Loaded matrices keyed by path.
///
/// A slot is only ever replaced whole, so a reader sees either the previous
/// snapshot or the new one.
#[derive(Default)]
pub struct MatrixCache {
    slots: RwLock<HashMap<PathBuf, CacheSlot>>,
}

impl MatrixCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lookup(&self, path: &Path, modified: SystemTime) -> Option<Arc<CompatibilityMatrix>> {
        let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
        slots
            .get(path)
            .filter(|slot| slot.modified == modified)
            .map(|slot| Arc::clone(&slot.matrix))
    }

    fn store(&self, path: PathBuf, modified: SystemTime, matrix: Arc<CompatibilityMatrix>) {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        slots.insert(path, CacheSlot { modified, matrix });
    }

    /// Drop the slot for `path`. Returns whether one was present.
    pub fn invalidate(&self, path: &Path) -> bool {
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        slots.remove(path).is_some()
    }

    pub fn clear(&self) {
        self.slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn len(&self) -> usize {
        self.slots.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for MatrixCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatrixCache").field("slots", &self.len()).finish()
    }
}

/// Loads compatibility matrices from YAML or JSON files.
///
/// ```ignore
/// let loader = MatrixLoader::new();
/// let matrix = loader.load(Path::new("data/compatibility.yaml"))?;
/// let again = loader.load(Path::new("data/compatibility.yaml"))?;
/// assert!(Arc::ptr_eq(&matrix, &again));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MatrixLoader {
    cache: Arc<MatrixCache>,
}

impl MatrixLoader {
    /// Create a loader with its own empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a loader that shares `cache` with other loaders.
    pub const fn with_cache(cache: Arc<MatrixCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &Arc<MatrixCache> {
        &self.cache
    }

    /// Load the matrix at `path`.
    ///
    /// Returns the cached snapshot when the file's modification time is
    /// unchanged since the last successful load.
    pub fn load(&self, path: &Path) -> Result<Arc<CompatibilityMatrix>, ConfigurationError> {
        let metadata = fs::metadata(path).map_err(|e| io_error(path, e))?;
        let modified = metadata.modified().map_err(|e| io_error(path, e))?;

        if let Some(matrix) = self.cache.lookup(path, modified) {
            debug!(path = %path.display(), "Compatibility matrix cache hit");
            return Ok(matrix);
        }

        let text = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
        let matrix = Arc::new(Self::build(&text, &path.display().to_string())?);
        debug!(
            path = %path.display(),
            entries = matrix.len(),
            warnings = matrix.warnings().len(),
            "Loaded compatibility matrix"
        );

        self.cache.store(path.to_path_buf(), modified, Arc::clone(&matrix));
        Ok(matrix)
    }

    /// Build a matrix from in-memory text. Not cached.
    pub fn parse_str(text: &str) -> Result<CompatibilityMatrix, ConfigurationError> {
        Self::build(text, "<inline>")
    }

    /// Forget the cached snapshot for `path`.
    pub fn invalidate(&self, path: &Path) -> bool {
        self.cache.invalidate(path)
    }

    /// Forget every cached snapshot.
    pub fn clear(&self) {
        self.cache.clear();
    }

    fn build(text: &str, origin: &str) -> Result<CompatibilityMatrix, ConfigurationError> {
        build_matrix(parse_document(text, origin)?)
    }
}

fn io_error(path: &Path, source: std::io::Error) -> ConfigurationError {
    if source.kind() == ErrorKind::NotFound {
        ConfigurationError::NotFound {
            path: path.to_path_buf(),
        }
    } else {
        ConfigurationError::Read {
            path: path.to_path_buf(),
            source,
        }
    }
}
