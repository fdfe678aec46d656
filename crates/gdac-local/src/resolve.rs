//! Locating float files in the GDAC layout.
//!
//! Multi-profile files live at `<root>/<dac>/<wmo>/<wmo>_prof.nc` and
//! single-profile files at `<root>/<dac>/<wmo>/profiles/<R|D><wmo>_<cycle>[D].nc`.
//! The DAC folder is never known in advance, so it is globbed.

use std::path::{Path, PathBuf};

use argo_common::{ArgoError, ArgoResult, ErrorMode};
use glob::Pattern;
use tracing::{debug, warn};

/// Glob pattern for a float's multi-profile file, or for one cycle's
/// single-profile file.
///
/// Cycles below 1000 are padded to three digits, larger ones to four.
pub fn file_path_pattern(root: &Path, wmo: u32, cycle: Option<u32>) -> String {
    let root = Pattern::escape(&root.to_string_lossy());
    let root = root.trim_end_matches('/');
    match cycle {
        None => format!("{}/*/{}/{}_prof.nc", root, wmo, wmo),
        Some(cycle) if cycle < 1000 => {
            format!("{}/*/{}/profiles/*{}_{:03}*.nc", root, wmo, wmo, cycle)
        }
        Some(cycle) => format!("{}/*/{}/profiles/*{}_{:04}*.nc", root, wmo, wmo, cycle),
    }
}

/// Resolve a float (and optional cycle) to exactly one file.
///
/// No match fails with `FileNotFound` in raise mode and yields `None` in
/// ignore mode. Several matches log a warning and the first one after
/// sorting wins.
pub fn resolve_path(
    root: &Path,
    wmo: u32,
    cycle: Option<u32>,
    errors: ErrorMode,
) -> ArgoResult<Option<PathBuf>> {
    let pattern = file_path_pattern(root, wmo, cycle);
    let mut matches: Vec<PathBuf> = glob::glob(&pattern)
        .map_err(|e| ArgoError::invalid("pattern", format!("{}: {}", pattern, e)))?
        .filter_map(Result::ok)
        .collect();
    matches.sort();

    match matches.len() {
        0 => match errors {
            ErrorMode::Raise => Err(ArgoError::FileNotFound(pattern)),
            ErrorMode::Ignore => {
                debug!(pattern = %pattern, "No file matches, ignoring");
                Ok(None)
            }
        },
        1 => Ok(matches.pop()),
        count => {
            warn!(
                pattern = %pattern,
                count,
                "More than one file to load for a single float cycle, using the first one"
            );
            Ok(matches.into_iter().next())
        }
    }
}
