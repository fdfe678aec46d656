//! netCDF access for Argo multi-profile files.
//!
//! [`NetCdfReader`] implements the shared [`argo_common::ArrayFileReader`]
//! seam on top of libnetcdf and decodes CF calendar times.
//! [`ArgoTypeCaster`] is the Argo-specific [`argo_common::TypeCaster`].
//!
//! System requirements: libhdf5-dev libnetcdf-dev

pub mod cast;
pub mod decode;
pub mod error;
pub mod native;

pub use cast::ArgoTypeCaster;
pub use decode::TimeUnits;
pub use error::{NetCdfError, NetCdfResult};
pub use native::{silence_hdf5_errors, NetCdfReader};
