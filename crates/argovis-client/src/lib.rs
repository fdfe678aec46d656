//! Argovis REST API adapter.
//!
//! Builds Argovis query URLs, issues them through a [`JsonGetter`] and
//! turns the returned profile documents into tables or point collections.
//! Remote failures come back as [`RemoteError`] values; nothing here panics
//! on a bad status.
//!
//! # Example
//!
//! ```ignore
//! use argovis_client::{ArgovisClient, ClientConfig};
//!
//! let client = ArgovisClient::new(ClientConfig::default())?;
//! let profiles = client.get_platform_profiles(3900737).await?;
//! let table = argovis_client::to_table(&profiles, "measurements");
//! ```

pub mod client;
pub mod error;
pub mod fetcher;
pub mod filter;
pub mod http;
pub mod query;
pub mod table;

pub use client::{ArgovisClient, Profile};
pub use error::{RemoteError, RemoteResult};
pub use fetcher::{RemoteRegionFetcher, RemoteWmoFetcher, WmoQuery};
pub use filter::{filter_data_mode, filter_qc, filter_variables};
pub use http::{ClientConfig, JsonGetter, ReqwestGetter, DEFAULT_BASE_URL};
pub use table::{to_dataset, to_table, ProfileTable, MEASUREMENT_KEY};
