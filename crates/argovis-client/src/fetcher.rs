//! Remote fetchers: by float and by region.

use std::sync::Arc;

use argo_common::{
    canonical_name, ArgoFetcher, Dataset, DatasetKind, FloatRequest, NameMode, PressureRange,
    ProfileId, Region, Shape,
};
use tracing::{debug, instrument};

use crate::client::{ArgovisClient, Profile};
use crate::error::RemoteResult;
use crate::http::{JsonGetter, ReqwestGetter};
use crate::table::{self, ProfileTable, MEASUREMENT_KEY};

/// Which Argovis endpoint a float request maps to.
#[derive(Debug, Clone, PartialEq)]
pub enum WmoQuery {
    /// All profiles of each float
    Platforms(Vec<u32>),
    /// Exactly one profile
    Profile(ProfileId),
    /// Several profiles by id
    Profiles(Vec<ProfileId>),
}

impl WmoQuery {
    /// No cycles: platform query per float. One float and one cycle: single
    /// profile. Anything else: every float crossed with every cycle.
    pub fn for_request(request: &FloatRequest) -> Self {
        let cycles = match request.cycles() {
            Some(cycles) if !cycles.is_empty() => cycles,
            _ => return WmoQuery::Platforms(request.wmos().to_vec()),
        };
        let ids: Vec<ProfileId> = request
            .wmos()
            .iter()
            .flat_map(|&wmo| cycles.iter().map(move |cycle| ProfileId::new(wmo, cycle)))
            .collect();
        match ids.as_slice() {
            [single] => WmoQuery::Profile(*single),
            _ => WmoQuery::Profiles(ids),
        }
    }
}

/// Fetches float profiles from Argovis.
pub struct RemoteWmoFetcher<G = ReqwestGetter> {
    client: Arc<ArgovisClient<G>>,
    request: FloatRequest,
    dataset: DatasetKind,
    pressure: Option<PressureRange>,
}

impl<G: JsonGetter> RemoteWmoFetcher<G> {
    pub fn new(client: Arc<ArgovisClient<G>>, request: FloatRequest, dataset: DatasetKind) -> Self {
        Self {
            client,
            request,
            dataset,
            pressure: None,
        }
    }

    /// Clip profiles to a pressure range; only honored by multi-profile queries.
    pub fn with_pressure(mut self, pressure: PressureRange) -> Self {
        self.pressure = Some(pressure);
        self
    }

    pub fn query(&self) -> WmoQuery {
        WmoQuery::for_request(&self.request)
    }

    #[instrument(skip(self), fields(request = %self.cname(NameMode::Display)))]
    pub async fn fetch_profiles(&self) -> RemoteResult<Vec<Profile>> {
        let profiles = match self.query() {
            WmoQuery::Platforms(wmos) => {
                let mut all = Vec::new();
                for wmo in wmos {
                    all.extend(self.client.get_platform_profiles(wmo).await?);
                }
                all
            }
            WmoQuery::Profile(id) => vec![self.client.get_profile(id.wmo, id.cycle).await?],
            WmoQuery::Profiles(ids) => self.client.get_profiles(&ids, self.pressure).await?,
        };
        debug!(count = profiles.len(), "Fetched profiles");
        Ok(profiles)
    }

    pub async fn to_table(&self) -> RemoteResult<ProfileTable> {
        Ok(table::to_table(&self.fetch_profiles().await?, MEASUREMENT_KEY))
    }

    pub async fn to_dataset(&self) -> RemoteResult<Dataset> {
        Ok(table::to_dataset(&self.fetch_profiles().await?)?)
    }
}

impl<G> ArgoFetcher for RemoteWmoFetcher<G> {
    fn definition(&self) -> &str {
        "Argovis Argo data fetcher for floats"
    }

    fn dataset(&self) -> DatasetKind {
        self.dataset
    }

    fn cname(&self, mode: NameMode) -> String {
        canonical_name(self.dataset, self.request.wmos(), self.request.cycles(), mode)
    }
}

/// Fetches profiles inside a space/time region from Argovis.
pub struct RemoteRegionFetcher<G = ReqwestGetter> {
    client: Arc<ArgovisClient<G>>,
    region: Region,
    dataset: DatasetKind,
}

impl<G: JsonGetter> RemoteRegionFetcher<G> {
    /// A BGC dataset restricts the selection to BGC profiles.
    pub fn new(client: Arc<ArgovisClient<G>>, mut region: Region, dataset: DatasetKind) -> Self {
        if dataset == DatasetKind::Bgc {
            region.bgc_only = true;
        }
        Self {
            client,
            region,
            dataset,
        }
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    #[instrument(skip(self), fields(request = %self.cname(NameMode::Display)))]
    pub async fn fetch_profiles(&self) -> RemoteResult<Vec<Profile>> {
        self.client.get_selection_profiles(&self.region).await
    }

    pub async fn to_table(&self) -> RemoteResult<ProfileTable> {
        Ok(table::to_table(&self.fetch_profiles().await?, MEASUREMENT_KEY))
    }

    pub async fn to_dataset(&self) -> RemoteResult<Dataset> {
        Ok(table::to_dataset(&self.fetch_profiles().await?)?)
    }
}

impl<G> ArgoFetcher for RemoteRegionFetcher<G> {
    fn definition(&self) -> &str {
        "Argovis Argo data fetcher for a space/time region"
    }

    fn dataset(&self) -> DatasetKind {
        self.dataset
    }

    /// `<kind>_<start>_<end>_<shape>`, plus `_PRES<lower>_<upper>` when
    /// clipped.
    fn cname(&self, mode: NameMode) -> String {
        let mut name = format!(
            "{}_{}_{}_{}",
            self.dataset,
            self.region.start.format("%Y%m%d"),
            self.region.end.format("%Y%m%d"),
            shape_token(&self.region.shape, mode)
        );
        if let Some(range) = &self.region.pressure {
            name.push_str(&format!("_PRES{}_{}", range.lower, range.upper));
        }
        name
    }
}

/// The polygon as it appears in a canonical name.
///
/// Cache keys spell vertices as `<lon>_<lat>` and separate rings with `__`,
/// keeping the name usable as a file stem.
fn shape_token(shape: &Shape, mode: NameMode) -> String {
    match mode {
        NameMode::Display => shape.to_query(),
        NameMode::CacheKey => shape
            .rings
            .iter()
            .map(|ring| {
                ring.iter()
                    .map(|[lon, lat]| format!("{}_{}", lon, lat))
                    .collect::<Vec<_>>()
                    .join("_")
            })
            .collect::<Vec<_>>()
            .join("__"),
    }
}
