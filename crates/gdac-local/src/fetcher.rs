//! Fetchers over a local GDAC mirror.

use std::path::Path;
use std::sync::Arc;

use argo_common::{
    canonical_name, ArgoFetcher, ArgoResult, ArrayFileReader, Dataset, DatasetKind, ErrorMode,
    FloatRequest, NameMode,
};
use argo_netcdf::ArgoTypeCaster;
use tracing::{debug, info, instrument, warn};

use crate::cache::DatasetCache;
use crate::config::LocalFtpOptions;
use crate::index::{FloatEntry, FloatIndex};
use crate::loader::{LoadVariant, Loader};
use crate::mapper::{ParallelMapper, SequentialMapper};
use crate::merge::{merge_collections, merge_floats, MergeOptions};
use crate::resolve::resolve_path;

const DEFINITION: &str = "Local ftp Argo data fetcher";

/// Return the cached collection for `key`, or build it and store it.
fn cached(
    cache: Option<&DatasetCache>,
    key: &str,
    build: impl FnOnce() -> ArgoResult<Option<Dataset>>,
) -> ArgoResult<Option<Dataset>> {
    let Some(cache) = cache else {
        return build();
    };
    if let Some(ds) = cache.get(key)? {
        info!(key, "Loaded collection from cache");
        return Ok(Some(ds));
    }
    let ds = build()?;
    if let Some(ds) = &ds {
        cache.put(key, ds)?;
    }
    Ok(ds)
}

/// Open the fetcher's own namespace of the configured cache.
fn open_cache(options: &LocalFtpOptions, namespace: &str) -> ArgoResult<Option<DatasetCache>> {
    options
        .cache_dir
        .as_ref()
        .map(|dir| DatasetCache::new(dir)?.namespace(namespace))
        .transpose()
}

fn default_loader(options: &LocalFtpOptions) -> Loader {
    Loader::netcdf(options.root(), options.dataset)
}

/// Fetch floats by WMO id, optionally narrowed to some cycles, straight
/// from their folders in the mirror.
pub struct LocalWmoFetcher {
    options: LocalFtpOptions,
    request: FloatRequest,
    loader: Loader,
    errors: ErrorMode,
    mapper: Option<Arc<dyn ParallelMapper>>,
    cache: Option<DatasetCache>,
}

impl LocalWmoFetcher {
    pub fn new(options: LocalFtpOptions, request: FloatRequest) -> ArgoResult<Self> {
        options.validate()?;
        let cache = open_cache(&options, "wmo")?;
        Ok(Self {
            loader: default_loader(&options),
            options,
            request,
            errors: ErrorMode::default(),
            mapper: None,
            cache,
        })
    }

    /// Open files through `reader` instead of libnetcdf.
    pub fn with_reader(mut self, reader: Arc<dyn ArrayFileReader>) -> Self {
        self.loader = Loader::new(
            reader,
            Arc::new(ArgoTypeCaster),
            self.options.root(),
            self.options.dataset,
        );
        self
    }

    pub fn with_loader(mut self, loader: Loader) -> Self {
        self.loader = loader;
        self
    }

    pub fn with_error_mode(mut self, errors: ErrorMode) -> Self {
        self.errors = errors;
        self
    }

    /// Load several files through `mapper`.
    pub fn with_mapper(mut self, mapper: Arc<dyn ParallelMapper>) -> Self {
        self.mapper = Some(mapper);
        self
    }

    pub fn request(&self) -> &FloatRequest {
        &self.request
    }

    pub fn root(&self) -> &Path {
        self.options.root()
    }

    /// One file per float, or per float and cycle when cycles are set.
    ///
    /// In ignore mode unresolvable entries are skipped.
    pub fn resolve_files(&self) -> ArgoResult<Vec<FloatEntry>> {
        let root = self.options.root();
        let mut files = Vec::new();
        for &wmo in self.request.wmos() {
            let cycles: Vec<Option<u32>> = match self.request.cycles() {
                Some(cycles) if !cycles.is_empty() => cycles.iter().map(Some).collect(),
                _ => vec![None],
            };
            for cycle in cycles {
                if let Some(path) = resolve_path(root, wmo, cycle, self.errors)? {
                    files.push(FloatEntry {
                        dac: dac_of(root, &path),
                        wmo,
                        path,
                    });
                }
            }
        }
        Ok(files)
    }

    /// Load the request as a point collection.
    ///
    /// Returns `None` with a warning when nothing could be resolved or
    /// every file was empty.
    #[instrument(skip(self), fields(request = %self.cname(NameMode::Display)))]
    pub fn to_dataset(&self) -> ArgoResult<Option<Dataset>> {
        let key = self.cname(NameMode::CacheKey);
        // Skipping missing files may leave a partial result, keep it out of
        // the cache.
        let cache = match self.errors {
            ErrorMode::Raise => self.cache.as_ref(),
            ErrorMode::Ignore => None,
        };
        cached(cache, &key, || self.load())
    }

    fn load(&self) -> ArgoResult<Option<Dataset>> {
        let files = self.resolve_files()?;
        let constraints = self.cname(NameMode::Display);

        match files.as_slice() {
            [] => {
                warn!("No file to load for this request");
                Ok(None)
            }
            [file] => {
                let ds = self
                    .loader
                    .load_and_flatten(&file.path, LoadVariant::Wmo, &constraints)?;
                Ok(Some(ds))
            }
            files => {
                debug!(count = files.len(), "Loading and merging files");
                let load = |entry: &FloatEntry| {
                    self.loader
                        .load_and_flatten(&entry.path, LoadVariant::Wmo, &constraints)
                };
                let collections = match &self.mapper {
                    Some(mapper) => mapper.map_gather(files, &load)?,
                    None => SequentialMapper.map_gather(files, &load)?,
                };
                let merged = merge_collections(collections)?;
                Ok(merged.map(|mut ds| {
                    ds.attrs.remove("Fetched_url");
                    ds
                }))
            }
        }
    }
}

impl ArgoFetcher for LocalWmoFetcher {
    fn definition(&self) -> &str {
        DEFINITION
    }

    fn dataset(&self) -> DatasetKind {
        self.options.dataset
    }

    fn cname(&self, mode: NameMode) -> String {
        canonical_name(
            self.options.dataset,
            self.request.wmos(),
            self.request.cycles(),
            mode,
        )
    }
}

/// Fetch floats through the mirror-wide index of multi-profile files.
pub struct LocalBoxFetcher {
    options: LocalFtpOptions,
    wmos: Vec<u32>,
    index: FloatIndex,
    loader: Loader,
    mapper: Option<Arc<dyn ParallelMapper>>,
    sample_size: Option<usize>,
    cache: Option<DatasetCache>,
}

impl LocalBoxFetcher {
    /// Scan the mirror and check every float is in it.
    ///
    /// Fails with `UnknownFloat` before any file is opened.
    pub fn new(options: LocalFtpOptions, wmos: impl Into<Vec<u32>>) -> ArgoResult<Self> {
        options.validate()?;
        let wmos = FloatRequest::new(wmos)?.wmos().to_vec();
        let index = FloatIndex::scan(options.root())?;
        index.select(&wmos)?;
        let cache = open_cache(&options, "box")?;
        Ok(Self {
            loader: default_loader(&options),
            options,
            wmos,
            index,
            mapper: None,
            sample_size: None,
            cache,
        })
    }

    pub fn with_reader(mut self, reader: Arc<dyn ArrayFileReader>) -> Self {
        self.loader = Loader::new(
            reader,
            Arc::new(ArgoTypeCaster),
            self.options.root(),
            self.options.dataset,
        );
        self
    }

    pub fn with_loader(mut self, loader: Loader) -> Self {
        self.loader = loader;
        self
    }

    pub fn with_mapper(mut self, mapper: Arc<dyn ParallelMapper>) -> Self {
        self.mapper = Some(mapper);
        self
    }

    /// Only load `n` randomly drawn floats.
    pub fn with_sample_size(mut self, n: usize) -> Self {
        self.sample_size = Some(n);
        self
    }

    pub fn index(&self) -> &FloatIndex {
        &self.index
    }

    pub fn wmos(&self) -> &[u32] {
        &self.wmos
    }

    #[instrument(skip(self), fields(floats = self.wmos.len()))]
    pub fn to_dataset(&self) -> ArgoResult<Option<Dataset>> {
        let key = self.cname(NameMode::CacheKey);
        // A sampled result is not the full request, keep it out of the cache.
        let cache = if self.sample_size.is_some() {
            None
        } else {
            self.cache.as_ref()
        };
        cached(cache, &key, || self.load())
    }

    fn load(&self) -> ArgoResult<Option<Dataset>> {
        let constraints = self.cname(NameMode::Display);
        if let ([wmo], None) = (self.wmos.as_slice(), self.sample_size) {
            let entries = self.index.select(&[*wmo])?;
            let ds = self
                .loader
                .load_and_flatten(&entries[0].path, LoadVariant::Box, &constraints)?;
            return Ok(Some(ds));
        }

        let options = MergeOptions {
            mapper: self.mapper.as_deref(),
            sample_size: self.sample_size,
        };
        merge_floats(&self.index, &self.wmos, &self.loader, &constraints, options)
    }
}

impl ArgoFetcher for LocalBoxFetcher {
    fn definition(&self) -> &str {
        DEFINITION
    }

    fn dataset(&self) -> DatasetKind {
        self.options.dataset
    }

    fn cname(&self, mode: NameMode) -> String {
        canonical_name(self.options.dataset, &self.wmos, None, mode)
    }
}

/// First component of `path` below `root`.
fn dac_of(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .ok()
        .and_then(|rel| rel.components().next())
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl std::fmt::Debug for LocalWmoFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalWmoFetcher")
            .field("root", &self.options.root)
            .field("request", &self.request)
            .field("errors", &self.errors)
            .finish()
    }
}

impl std::fmt::Debug for LocalBoxFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalBoxFetcher")
            .field("root", &self.options.root)
            .field("wmos", &self.wmos)
            .field("floats_in_index", &self.index.len())
            .finish()
    }
}
