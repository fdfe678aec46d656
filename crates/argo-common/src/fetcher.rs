//! Capability shared by every data fetcher.

use serde::{Deserialize, Serialize};

use crate::ids::DatasetKind;
use crate::naming::NameMode;

/// What to do when a requested file cannot be found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorMode {
    /// Fail with `FileNotFound`
    #[default]
    Raise,
    /// Skip the file silently
    Ignore,
}

/// A configured request against one data source.
pub trait ArgoFetcher {
    /// Short description of the source.
    fn definition(&self) -> &str;

    fn dataset(&self) -> DatasetKind;

    /// Unique string identifying the request.
    fn cname(&self, mode: NameMode) -> String;

    fn describe(&self) -> String {
        format!(
            "<datafetcher '{}'>\nDomain: {}",
            self.definition(),
            self.cname(NameMode::Display)
        )
    }
}
