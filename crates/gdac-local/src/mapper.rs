//! Map-and-gather over float entries.

use argo_common::{ArgoError, ArgoResult, Dataset};
use rayon::prelude::*;
use rayon::ThreadPool;

use crate::index::FloatEntry;

/// Loads one float.
pub type LoadFn<'a> = dyn Fn(&FloatEntry) -> ArgoResult<Dataset> + Sync + 'a;

/// Applies a load to every entry and gathers the results in input order,
/// failing with the first error.
pub trait ParallelMapper: Send + Sync {
    fn map_gather(&self, inputs: &[FloatEntry], load: &LoadFn<'_>) -> ArgoResult<Vec<Dataset>>;
}

/// One entry after another on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialMapper;

impl ParallelMapper for SequentialMapper {
    fn map_gather(&self, inputs: &[FloatEntry], load: &LoadFn<'_>) -> ArgoResult<Vec<Dataset>> {
        inputs.iter().map(load).collect()
    }
}

/// Rayon-backed mapper, on the global pool or a dedicated one.
#[derive(Default)]
pub struct RayonMapper {
    pool: Option<ThreadPool>,
}

impl RayonMapper {
    /// Use the global rayon pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a dedicated pool with `threads` workers.
    pub fn with_threads(threads: usize) -> ArgoResult<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("argo-load-{}", i))
            .build()
            .map_err(|e| ArgoError::invalid("threads", e.to_string()))?;
        Ok(Self { pool: Some(pool) })
    }
}

impl ParallelMapper for RayonMapper {
    fn map_gather(&self, inputs: &[FloatEntry], load: &LoadFn<'_>) -> ArgoResult<Vec<Dataset>> {
        let run = || -> Vec<ArgoResult<Dataset>> { inputs.par_iter().map(load).collect() };
        let results = match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        };
        results.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn entries(n: u32) -> Vec<FloatEntry> {
        (0..n)
            .map(|wmo| FloatEntry {
                dac: "aoml".to_string(),
                wmo,
                path: PathBuf::from(format!("/{}", wmo)),
            })
            .collect()
    }

    fn tagged(entry: &FloatEntry) -> ArgoResult<Dataset> {
        let mut ds = Dataset::new();
        ds.attrs.insert("WMO".into(), (entry.wmo as f64).into());
        Ok(ds)
    }

    #[test]
    fn test_rayon_keeps_input_order() {
        let mapper = RayonMapper::with_threads(4).unwrap();
        let out = mapper.map_gather(&entries(16), &tagged).unwrap();
        let wmos: Vec<f64> = out
            .iter()
            .filter_map(|ds| ds.attrs["WMO"].as_number())
            .collect();
        assert_eq!(wmos, (0..16).map(f64::from).collect::<Vec<_>>());
    }

    #[test]
    fn test_first_error_in_input_order_wins() {
        let failing = |entry: &FloatEntry| -> ArgoResult<Dataset> {
            if entry.wmo >= 2 {
                Err(ArgoError::FileNotFound(entry.wmo.to_string()))
            } else {
                Ok(Dataset::new())
            }
        };
        for mapper in [&RayonMapper::new() as &dyn ParallelMapper, &SequentialMapper] {
            match mapper.map_gather(&entries(6), &failing) {
                Err(ArgoError::FileNotFound(wmo)) => assert_eq!(wmo, "2"),
                other => panic!("unexpected {:?}", other.map(|v| v.len())),
            }
        }
    }
}
