//! Canonical request names.
//!
//! The same string doubles as a human readable summary of a request and as
//! the key of the on-disk dataset cache, so the joiners below must not change.

use crate::ids::{CycleList, DatasetKind};

/// Which flavour of the canonical name to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameMode {
    /// Multi-float tokens joined with `;`
    Display,
    /// Multi-float tokens joined with `_`
    CacheKey,
}

impl NameMode {
    fn joiner(&self) -> &'static str {
        match self {
            NameMode::Display => ";",
            NameMode::CacheKey => "_",
        }
    }
}

/// Build the canonical name of a float request.
///
/// Cycle tokens come after all WMO tokens and are not scoped per float.
pub fn canonical_name(
    dataset: DatasetKind,
    wmos: &[u32],
    cycles: Option<&CycleList>,
    mode: NameMode,
) -> String {
    let mut tokens: Vec<String> = wmos.iter().map(|wmo| format!("WMO{}", wmo)).collect();
    if let Some(cycles) = cycles {
        tokens.extend(cycles.iter().map(|cyc| format!("CYC{:04}", cyc)));
    }

    let joiner = if wmos.len() > 1 { mode.joiner() } else { "_" };
    format!("{}_{}", dataset, tokens.join(joiner))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_float() {
        let name = canonical_name(DatasetKind::Phy, &[3900737], None, NameMode::Display);
        assert_eq!(name, "phy_WMO3900737");
    }

    #[test]
    fn test_single_float_with_cycles_ignores_mode() {
        let cycles = CycleList::from(vec![1, 12]);
        for mode in [NameMode::Display, NameMode::CacheKey] {
            let name = canonical_name(DatasetKind::Bgc, &[6902746], Some(&cycles), mode);
            assert_eq!(name, "bgc_WMO6902746_CYC0001_CYC0012");
        }
    }

    #[test]
    fn test_multi_float_joiners() {
        let wmos = [3900737, 4901653];
        assert_eq!(
            canonical_name(DatasetKind::Phy, &wmos, None, NameMode::CacheKey),
            "phy_WMO3900737_WMO4901653"
        );
        assert_eq!(
            canonical_name(DatasetKind::Phy, &wmos, None, NameMode::Display),
            "phy_WMO3900737;WMO4901653"
        );
    }

    #[test]
    fn test_multi_float_cycles_after_all_wmos() {
        let cycles = CycleList::from(7);
        let name = canonical_name(
            DatasetKind::Phy,
            &[3900737, 4901653],
            Some(&cycles),
            NameMode::Display,
        );
        assert_eq!(name, "phy_WMO3900737;WMO4901653;CYC0007");
    }
}
