//! Merging per-float point collections.

use argo_common::dataset::POINT_DIM;
use argo_common::{ArgoResult, Dataset};
use tracing::{instrument, warn};

use crate::index::{sample_entries, FloatIndex};
use crate::loader::{LoadVariant, Loader};
use crate::mapper::{ParallelMapper, SequentialMapper};

/// Attributes that only make sense for a single float.
const HOUSEKEEPING_ATTRS: [&str; 2] = ["DAC", "WMO"];

/// Concatenate non-empty collections along the point index.
///
/// Housekeeping attributes are dropped, rows are sorted by `TIME` and the
/// index is renumbered from zero. Returns `None` with a warning when every
/// collection is empty.
pub fn merge_collections(collections: Vec<Dataset>) -> ArgoResult<Option<Dataset>> {
    let collections: Vec<Dataset> = collections
        .into_iter()
        .filter(|ds| ds.point_count() > 0)
        .collect();
    if collections.is_empty() {
        warn!("Can't fetch any data");
        return Ok(None);
    }

    let mut merged = Dataset::concat(collections, POINT_DIM)?;
    for key in HOUSEKEEPING_ATTRS {
        merged.attrs.remove(key);
    }
    if merged.contains("TIME") {
        merged.sort_by("TIME", POINT_DIM)?;
    } else {
        warn!("Merged collection has no TIME variable, keeping input order");
    }
    merged.renumber_points()?;
    Ok(Some(merged))
}

/// Options for [`merge_floats`].
#[derive(Default)]
pub struct MergeOptions<'a> {
    /// Runs the loads; sequential in input order when unset
    pub mapper: Option<&'a dyn ParallelMapper>,
    /// Load only this many randomly drawn floats
    pub sample_size: Option<usize>,
}

/// Load every requested float from the index and merge the results.
///
/// Every float must be in the index; the first unknown one fails with
/// `UnknownFloat` before any file is opened.
#[instrument(skip(index, loader, options), fields(floats = wmos.len()))]
pub fn merge_floats(
    index: &FloatIndex,
    wmos: &[u32],
    loader: &Loader,
    constraints: &str,
    options: MergeOptions<'_>,
) -> ArgoResult<Option<Dataset>> {
    let mut entries = index.select(wmos)?;
    if let Some(n) = options.sample_size {
        entries = sample_entries(&entries, n, &mut rand::thread_rng());
    }
    warn!(count = entries.len(), "Number of floats to fetch");

    let load = |entry: &crate::index::FloatEntry| {
        loader.load_and_flatten(&entry.path, LoadVariant::Box, constraints)
    };
    let results = match options.mapper {
        Some(mapper) => mapper.map_gather(&entries, &load)?,
        None => SequentialMapper.map_gather(&entries, &load)?,
    };

    merge_collections(results)
}
