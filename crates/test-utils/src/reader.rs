//! In-memory array-file reader.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use argo_common::{ArgoError, ArgoResult, ArrayFileReader, Dataset};

/// Serves registered datasets by path and counts every open attempt.
///
/// Paths that were never registered fail with `FileNotFound`, like a
/// missing file on disk.
#[derive(Default)]
pub struct MemoryReader {
    files: RwLock<HashMap<PathBuf, Dataset>>,
    opens: AtomicUsize,
}

impl MemoryReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<PathBuf>, ds: Dataset) {
        self.files
            .write()
            .expect("reader lock poisoned")
            .insert(path.into(), ds);
    }

    /// Builder form of [`MemoryReader::insert`].
    pub fn with_file(self, path: impl Into<PathBuf>, ds: Dataset) -> Self {
        self.insert(path, ds);
        self
    }

    /// Number of `open` calls so far, successful or not.
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

impl ArrayFileReader for MemoryReader {
    fn open(&self, path: &Path) -> ArgoResult<Dataset> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        let files = self.files.read().expect("reader lock poisoned");
        match files.get(path) {
            Some(ds) => {
                let mut ds = ds.clone();
                ds.source = Some(path.to_path_buf());
                Ok(ds)
            }
            None => Err(ArgoError::FileNotFound(path.display().to_string())),
        }
    }
}
