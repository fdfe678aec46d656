//! Seams to the array-file library.

use std::path::Path;

use crate::dataset::Dataset;
use crate::error::ArgoResult;

/// Opens an array file and materializes it in memory.
///
/// Implementations decode CF calendar times and must not keep the file
/// handle open past `open`.
pub trait ArrayFileReader: Send + Sync {
    fn open(&self, path: &Path) -> ArgoResult<Dataset>;
}

/// Coerces variables to the types their conventions call for.
pub trait TypeCaster: Send + Sync {
    fn cast(&self, ds: Dataset) -> ArgoResult<Dataset>;
}

/// Leaves the dataset untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCaster;

impl TypeCaster for NoopCaster {
    fn cast(&self, ds: Dataset) -> ArgoResult<Dataset> {
        Ok(ds)
    }
}
