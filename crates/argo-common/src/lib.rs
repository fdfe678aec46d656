//! Common types and utilities shared across the Argo data fetchers.

pub mod dataset;
pub mod error;
pub mod fetcher;
pub mod ids;
pub mod naming;
pub mod reader;
pub mod region;
pub mod variables;

pub use dataset::{AttrValue, Dataset, Values, Variable};
pub use error::{ArgoError, ArgoResult};
pub use fetcher::{ArgoFetcher, ErrorMode};
pub use ids::{CycleList, DataMode, DatasetKind, FloatRequest, ProfileId};
pub use naming::{canonical_name, NameMode};
pub use reader::{ArrayFileReader, NoopCaster, TypeCaster};
pub use region::{PressureRange, Region, Shape};
