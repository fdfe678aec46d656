//! On-disk cache of fetched collections, keyed by canonical cache name.
//!
//! Fetchers that build different collections under the same canonical name
//! each get their own namespace, a sub-directory of the cache root.

use std::fs;
use std::path::{Path, PathBuf};

use argo_common::{ArgoError, ArgoResult, Dataset};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Stores collections as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct DatasetCache {
    dir: PathBuf,
}

impl DatasetCache {
    /// Open the cache, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> ArgoResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| ArgoError::Cache(format!("cannot create {}: {}", dir.display(), e)))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Open the `<dir>/<name>` namespace of this cache.
    pub fn namespace(&self, name: &str) -> ArgoResult<Self> {
        Self::new(self.dir.join(name))
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.path_for(key).is_file()
    }

    pub fn get(&self, key: &str) -> ArgoResult<Option<Dataset>> {
        let path = self.path_for(key);
        if !path.is_file() {
            return Ok(None);
        }
        let bytes = fs::read(&path)?;
        let ds = serde_json::from_slice(&bytes)
            .map_err(|e| ArgoError::Cache(format!("corrupt entry {}: {}", path.display(), e)))?;
        debug!(key, "Cache hit");
        Ok(Some(ds))
    }

    /// Write through a temporary file so readers never see a partial entry.
    pub fn put(&self, key: &str, ds: &Dataset) -> ArgoResult<()> {
        let path = self.path_for(key);
        let partial = self.dir.join(format!("{}.json.partial", key));
        let bytes = serde_json::to_vec(ds)?;
        fs::write(&partial, bytes)?;
        fs::rename(&partial, &path)?;
        debug!(key, path = %path.display(), "Cached collection");
        Ok(())
    }

    /// Remove every cached entry, in all namespaces; returns how many were
    /// removed.
    pub fn clear(&self) -> ArgoResult<usize> {
        let mut removed = 0;
        for entry in WalkDir::new(&self.dir).min_depth(1) {
            let entry = entry.map_err(|e| ArgoError::Cache(e.to_string()))?;
            let is_entry = entry.file_type().is_file()
                && entry
                    .file_name()
                    .to_str()
                    .map_or(false, |n| n.ends_with(".json") || n.ends_with(".json.partial"));
            if !is_entry {
                continue;
            }
            match fs::remove_file(entry.path()) {
                Ok(()) => removed += 1,
                Err(e) => warn!(path = %entry.path().display(), error = %e, "Failed to remove cache entry"),
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argo_common::{Values, Variable};
    use tempfile::TempDir;

    fn sample() -> Dataset {
        let mut ds = Dataset::new();
        ds.add_dim("index", 2).unwrap();
        ds.insert_var(
            "TEMP",
            Variable::new(["index"], Values::Float(vec![12.5, f64::NAN])),
        )
        .unwrap();
        ds.attrs.insert("DATA_ID".into(), "ARGO".into());
        ds
    }

    #[test]
    fn test_put_get_clear() {
        let dir = TempDir::new().unwrap();
        let cache = DatasetCache::new(dir.path().join("nested/cache")).unwrap();
        assert!(cache.get("phy_WMO1").unwrap().is_none());

        cache.put("phy_WMO1", &sample()).unwrap();
        assert!(cache.contains("phy_WMO1"));
        let back = cache.get("phy_WMO1").unwrap().unwrap();
        assert_eq!(back.attrs["DATA_ID"], "ARGO".into());
        match &back.data_vars["TEMP"].values {
            Values::Float(v) => assert!(v[0] == 12.5 && v[1].is_nan()),
            other => panic!("unexpected {:?}", other),
        }

        assert_eq!(cache.clear().unwrap(), 1);
        assert!(!cache.contains("phy_WMO1"));
    }

    #[test]
    fn test_namespaces_keep_same_key_apart() {
        let dir = test_utils::temp_test_dir();
        let root = DatasetCache::new(dir.path()).unwrap();
        let wmo = root.namespace("wmo").unwrap();
        let boxed = root.namespace("box").unwrap();

        wmo.put("phy_WMO3900737", &sample()).unwrap();
        assert_eq!(wmo.path_for("phy_WMO3900737"), dir.path().join("wmo/phy_WMO3900737.json"));
        assert!(boxed.get("phy_WMO3900737").unwrap().is_none());
        assert!(!root.contains("phy_WMO3900737"));

        boxed.put("phy_WMO3900737", &sample()).unwrap();
        assert_eq!(root.clear().unwrap(), 2);
        assert!(!wmo.contains("phy_WMO3900737"));
    }

    #[test]
    fn test_corrupt_entry_is_a_cache_error() {
        let dir = TempDir::new().unwrap();
        let cache = DatasetCache::new(dir.path()).unwrap();
        fs::write(cache.path_for("bad"), b"{not json").unwrap();
        assert!(matches!(cache.get("bad"), Err(ArgoError::Cache(_))));
    }
}
