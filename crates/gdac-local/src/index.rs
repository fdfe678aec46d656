//! Inventory of the multi-profile files available in a mirror.

use std::path::{Path, PathBuf};

use argo_common::{ArgoError, ArgoResult};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// One `<root>/<dac>/<wmo>/<wmo>_prof.nc` file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FloatEntry {
    pub dac: String,
    pub wmo: u32,
    pub path: PathBuf,
}

/// Every float found under `*/*/*_prof.nc`, sorted by path.
#[derive(Debug, Clone)]
pub struct FloatIndex {
    root: PathBuf,
    entries: Vec<FloatEntry>,
}

impl FloatIndex {
    /// Walk the mirror; fails with `InvalidParameter` when nothing is found.
    pub fn scan(root: &Path) -> ArgoResult<Self> {
        let mut entries = Vec::new();
        for entry in WalkDir::new(root).min_depth(3).max_depth(3) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!(error = %e, "Skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(float) = parse_entry(root, entry.path()) {
                entries.push(float);
            }
        }
        entries.sort_by(|a, b| a.path.cmp(&b.path));

        if entries.is_empty() {
            return Err(ArgoError::invalid(
                "local_ftp",
                format!(
                    "{} doesn't contain any netcdf profile files (under */*/*_prof.nc)",
                    root.display()
                ),
            ));
        }
        info!(count = entries.len(), root = %root.display(), "Found files in local ftp");

        Ok(Self {
            root: root.to_path_buf(),
            entries,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn entries(&self) -> &[FloatEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, wmo: u32) -> bool {
        self.get(wmo).is_some()
    }

    /// First entry for `wmo` in path order.
    pub fn get(&self, wmo: u32) -> Option<&FloatEntry> {
        self.entries.iter().find(|e| e.wmo == wmo)
    }

    /// Entries for every requested float, in request order.
    ///
    /// Fails with `UnknownFloat` on the first float not in the index.
    pub fn select(&self, wmos: &[u32]) -> ArgoResult<Vec<FloatEntry>> {
        wmos.iter()
            .map(|&wmo| {
                self.get(wmo).cloned().ok_or_else(|| ArgoError::UnknownFloat {
                    wmo,
                    root: self.root.clone(),
                })
            })
            .collect()
    }
}

/// Draw `n` entries uniformly at random, without replacement.
pub fn sample_entries<R: Rng + ?Sized>(
    entries: &[FloatEntry],
    n: usize,
    rng: &mut R,
) -> Vec<FloatEntry> {
    if n > entries.len() {
        warn!(requested = n, available = entries.len(), "Sample larger than float list, using all");
    }
    entries.choose_multiple(rng, n).cloned().collect()
}

fn parse_entry(root: &Path, path: &Path) -> Option<FloatEntry> {
    let name = path.file_name()?.to_str()?;
    let wmo_text = name.strip_suffix("_prof.nc")?;
    let wmo: u32 = match wmo_text.parse() {
        Ok(wmo) => wmo,
        Err(_) => {
            debug!(file = %name, "Ignoring file with a non-numeric float id");
            return None;
        }
    };
    let relative = path.strip_prefix(root).ok()?;
    let dac = relative.components().next()?.as_os_str().to_str()?.to_string();
    Some(FloatEntry {
        dac,
        wmo,
        path: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn entry(dac: &str, wmo: u32) -> FloatEntry {
        FloatEntry {
            dac: dac.to_string(),
            wmo,
            path: PathBuf::from(format!("/r/{}/{}/{}_prof.nc", dac, wmo, wmo)),
        }
    }

    #[test]
    fn test_parse_entry() {
        let root = Path::new("/r");
        let parsed = parse_entry(root, Path::new("/r/aoml/3900737/3900737_prof.nc")).unwrap();
        assert_eq!(parsed.dac, "aoml");
        assert_eq!(parsed.wmo, 3900737);
        assert!(parse_entry(root, Path::new("/r/aoml/3900737/3900737_meta.nc")).is_none());
        assert!(parse_entry(root, Path::new("/r/aoml/x/abc_prof.nc")).is_none());
    }

    #[test]
    fn test_sample_is_without_replacement_and_capped() {
        let entries: Vec<_> = (0..5).map(|i| entry("aoml", i)).collect();
        let mut rng = StdRng::seed_from_u64(7);

        let mut drawn = sample_entries(&entries, 3, &mut rng);
        assert_eq!(drawn.len(), 3);
        drawn.sort();
        drawn.dedup();
        assert_eq!(drawn.len(), 3);

        assert_eq!(sample_entries(&entries, 10, &mut rng).len(), 5);
    }
}
