//! Multi-profile file to point collection.
//!
//! Every loaded file goes through the same pipeline: open with calendar
//! decoding, rename the date variables, cast types, prune variables the
//! point layout cannot hold, reshape along `N_PROF x N_LEVELS` and stamp
//! provenance attributes.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use argo_common::variables::{LEVEL_DIM, POINT_COORDS, PROFILE_DIM};
use argo_common::{
    ArgoError, ArgoResult, ArrayFileReader, AttrValue, Dataset, DatasetKind, TypeCaster,
};
use argo_netcdf::{ArgoTypeCaster, NetCdfReader};
use chrono::Utc;
use tracing::{debug, instrument};

/// Argo data DOI stamped on every collection.
pub const ARGO_DOI: &str = "http://doi.org/10.17882/42182";

/// Which fetcher is loading the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadVariant {
    /// By-float access: keeps variables over other dimensions and records
    /// the source file
    Wmo,
    /// Index access: keeps only variables over `N_PROF` or `N_LEVELS` and
    /// records the DAC and WMO
    Box,
}

/// Opens and flattens Argo files through the pluggable reader and caster.
#[derive(Clone)]
pub struct Loader {
    reader: Arc<dyn ArrayFileReader>,
    caster: Arc<dyn TypeCaster>,
    root: PathBuf,
    dataset: DatasetKind,
}

impl Loader {
    /// Loader backed by libnetcdf and the Argo type caster.
    pub fn netcdf(root: impl Into<PathBuf>, dataset: DatasetKind) -> Self {
        Self::new(
            Arc::new(NetCdfReader::new()),
            Arc::new(ArgoTypeCaster),
            root,
            dataset,
        )
    }

    pub fn new(
        reader: Arc<dyn ArrayFileReader>,
        caster: Arc<dyn TypeCaster>,
        root: impl Into<PathBuf>,
        dataset: DatasetKind,
    ) -> Self {
        Self {
            reader,
            caster,
            root: root.into(),
            dataset,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dataset(&self) -> DatasetKind {
        self.dataset
    }

    /// Load one file as a point collection.
    ///
    /// `constraints` is the display name of the request, recorded as
    /// `Fetched_constraints`.
    #[instrument(skip(self, constraints), fields(path = %path.display()))]
    pub fn load_and_flatten(
        &self,
        path: &Path,
        variant: LoadVariant,
        constraints: &str,
    ) -> ArgoResult<Dataset> {
        if !path.exists() {
            return Err(ArgoError::FileNotFound(path.display().to_string()));
        }

        let mut ds = self.reader.open(path)?;

        ds.rename_var("JULD", "TIME")?;
        ds.rename_var("JULD_QC", "TIME_QC")?;
        if let Some(time) = ds.variable_mut("TIME") {
            time.attrs = BTreeMap::from([
                (
                    "long_name".to_string(),
                    AttrValue::from("Datetime (UTC) of the station"),
                ),
                ("standard_name".to_string(), AttrValue::from("time")),
            ]);
        }

        let mut ds = self.caster.cast(ds)?;

        ds.retain_data_vars(|_, var| !var.dims.is_empty());
        if variant == LoadVariant::Box {
            ds.retain_data_vars(|_, var| var.has_dim(PROFILE_DIM) || var.has_dim(LEVEL_DIM));
        }

        let mut points = ds.profile_to_point(PROFILE_DIM, LEVEL_DIM)?;
        for name in POINT_COORDS {
            points.set_coord(name);
        }

        points.attrs = self.provenance(path, variant, constraints);
        debug!(
            points = points.point_count(),
            variables = points.data_vars.len(),
            "Flattened profiles"
        );
        Ok(points)
    }

    fn provenance(
        &self,
        path: &Path,
        variant: LoadVariant,
        constraints: &str,
    ) -> BTreeMap<String, AttrValue> {
        let mut attrs = BTreeMap::new();
        let mut set = |key: &str, value: String| {
            attrs.insert(key.to_string(), AttrValue::Text(value));
        };
        set("DATA_ID", self.dataset.data_id().to_string());
        set("DOI", ARGO_DOI.to_string());
        set("Fetched_from", self.root.display().to_string());
        set("Fetched_by", fetched_by());
        set("Fetched_date", Utc::now().format("%Y/%m/%d").to_string());
        set("Fetched_constraints", constraints.to_string());
        match variant {
            LoadVariant::Wmo => set("Fetched_url", path.display().to_string()),
            LoadVariant::Box => {
                let (dac, wmo) = dac_and_wmo(path);
                set("DAC", dac);
                set("WMO", wmo);
            }
        }
        attrs
    }
}

/// Login name of the current user.
pub fn fetched_by() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}

/// `<dac>/<wmo>/<file>` components of a mirror path.
fn dac_and_wmo(path: &Path) -> (String, String) {
    let name = |p: Option<&Path>| {
        p.and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    };
    let wmo_dir = path.parent();
    (name(wmo_dir.and_then(Path::parent)), name(wmo_dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dac_and_wmo_from_path() {
        let (dac, wmo) = dac_and_wmo(Path::new("/gdac/coriolis/6902746/6902746_prof.nc"));
        assert_eq!(dac, "coriolis");
        assert_eq!(wmo, "6902746");
    }

    #[test]
    fn test_fetched_by_is_never_empty() {
        assert!(!fetched_by().is_empty());
    }
}
