//! Local GDAC mirror options.

use std::path::{Path, PathBuf};

use argo_common::{ArgoError, ArgoResult, DatasetKind};
use serde::{Deserialize, Serialize};

/// Where the mirror lives and how results are produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalFtpOptions {
    /// Directory holding the `<dac>/<wmo>/` folders
    pub root: PathBuf,
    #[serde(default)]
    pub dataset: DatasetKind,
    /// Enables the on-disk dataset cache when set
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

impl LocalFtpOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            dataset: DatasetKind::default(),
            cache_dir: None,
        }
    }

    pub fn with_dataset(mut self, dataset: DatasetKind) -> Self {
        self.dataset = dataset;
        self
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The root must be an existing directory.
    pub fn validate(&self) -> ArgoResult<()> {
        if !self.root.is_dir() {
            return Err(ArgoError::invalid(
                "local_ftp",
                format!("{} is not a directory", self.root.display()),
            ));
        }
        Ok(())
    }
}
