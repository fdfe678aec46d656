//! Argo data fetchers for a local copy of the GDAC FTP tree.
//!
//! Files are located by globbing the `<dac>/<wmo>/` layout or through a
//! scanned index of every multi-profile file, then flattened into point
//! collections and merged.

pub mod cache;
pub mod config;
pub mod fetcher;
pub mod filter;
pub mod index;
pub mod loader;
pub mod mapper;
pub mod merge;
pub mod resolve;

pub use cache::DatasetCache;
pub use config::LocalFtpOptions;
pub use fetcher::{LocalBoxFetcher, LocalWmoFetcher};
pub use filter::{filter_data_mode, filter_qc, filter_variables, VariableSelection};
pub use index::{sample_entries, FloatEntry, FloatIndex};
pub use loader::{fetched_by, LoadVariant, Loader, ARGO_DOI};
pub use mapper::{LoadFn, ParallelMapper, RayonMapper, SequentialMapper};
pub use merge::{merge_collections, merge_floats, MergeOptions};
pub use resolve::{file_path_pattern, resolve_path};
