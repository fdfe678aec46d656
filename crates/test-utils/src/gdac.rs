//! Temporary GDAC mirror trees.
//!
//! Files are created empty: tests pair the tree with a
//! [`crate::MemoryReader`] that serves the actual contents.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A `<root>/<dac>/<wmo>/...` tree under a temporary directory.
///
/// The directory is removed when the tree is dropped.
pub struct GdacTree {
    dir: TempDir,
}

impl GdacTree {
    pub fn new() -> Self {
        Self {
            dir: crate::temp_test_dir_with_prefix("gdac_"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Create `<root>/<dac>/<wmo>/<wmo>_prof.nc`.
    pub fn add_prof(&self, dac: &str, wmo: u32) -> PathBuf {
        let dir = self.dir.path().join(dac).join(wmo.to_string());
        touch(&dir, &format!("{}_prof.nc", wmo))
    }

    /// Create `<root>/<dac>/<wmo>/profiles/<prefix><wmo>_<cycle><suffix>.nc`.
    ///
    /// The cycle is zero-padded to three digits like the GDAC does.
    pub fn add_profile(&self, dac: &str, wmo: u32, prefix: &str, cycle: u32, suffix: &str) -> PathBuf {
        let dir = self
            .dir
            .path()
            .join(dac)
            .join(wmo.to_string())
            .join("profiles");
        touch(&dir, &format!("{}{}_{:03}{}.nc", prefix, wmo, cycle, suffix))
    }
}

impl Default for GdacTree {
    fn default() -> Self {
        Self::new()
    }
}

fn touch(dir: &Path, name: &str) -> PathBuf {
    fs::create_dir_all(dir).expect("Failed to create fixture directory");
    let path = dir.join(name);
    fs::write(&path, b"").expect("Failed to create fixture file");
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_layout() {
        let tree = GdacTree::new();
        let prof = tree.add_prof("aoml", 3900737);
        let single = tree.add_profile("aoml", 3900737, "D", 12, "");
        assert!(prof.ends_with("aoml/3900737/3900737_prof.nc"));
        assert!(single.ends_with("aoml/3900737/profiles/D3900737_012.nc"));
        assert!(prof.exists() && single.exists());
    }
}
